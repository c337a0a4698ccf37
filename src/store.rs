//! Read-only access to stored surveys.
//!
//! The renderer only ever needs to look a survey up by id.  Two providers are
//! included: [`JsonSurveyStore`], which reads one JSON document per survey from
//! a directory, and [`MemorySurveyStore`] for tests and embedding.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::ReportError;
use crate::model::Survey;

/// Looks surveys up by their store id.
pub trait SurveyProvider {
    /// Returns the survey stored under `id`, or [`ReportError::NotFound`].
    fn get_survey(&self, id: &str) -> Result<Survey, ReportError>;
}

/// Surveys stored as `<root>/<id>.json` documents.
#[derive(Clone, Debug)]
pub struct JsonSurveyStore {
    root: PathBuf,
}

impl JsonSurveyStore {
    /// Opens the store rooted at `root`.  The directory is only read lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && !id.contains("..")
            && !id.contains(['/', '\\']);
        valid.then(|| self.root.join(format!("{id}.json")))
    }

    /// Ids of all stored surveys, sorted.
    pub fn ids(&self) -> Result<Vec<String>, ReportError> {
        let entries = fs::read_dir(&self.root).map_err(|source| ReportError::Store {
            path: self.root.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ReportError::Store {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Every stored survey that parses, paired with its id, in id order.
    ///
    /// Documents that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<(String, Survey)>, ReportError> {
        let mut surveys = Vec::new();
        for id in self.ids()? {
            match self.get_survey(&id) {
                Ok(survey) => surveys.push((id, survey)),
                Err(err) => warn!("skipping survey '{id}': {err}"),
            }
        }
        Ok(surveys)
    }
}

impl SurveyProvider for JsonSurveyStore {
    fn get_survey(&self, id: &str) -> Result<Survey, ReportError> {
        let not_found = || ReportError::NotFound { id: id.to_string() };
        let path = self.path_for(id).ok_or_else(not_found)?;

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(source) => return Err(ReportError::Store { path, source }),
        };
        debug!("loaded survey '{id}' from {}", path.display());

        let mut survey = Survey::from_json(&raw).map_err(|source| ReportError::Parse {
            id: id.to_string(),
            source,
        })?;
        if survey.id.is_none() {
            survey.id = Some(id.to_string());
        }
        Ok(survey)
    }
}

/// Surveys held in memory, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct MemorySurveyStore {
    surveys: BTreeMap<String, Survey>,
}

impl MemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `survey` under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, survey: Survey) {
        let id = id.into();
        let survey = if survey.id.is_none() {
            survey.with_id(id.clone())
        } else {
            survey
        };
        self.surveys.insert(id, survey);
    }

    /// Adds `survey` under `id` and returns the updated store.
    pub fn with_survey(mut self, id: impl Into<String>, survey: Survey) -> Self {
        self.insert(id, survey);
        self
    }

    pub fn len(&self) -> usize {
        self.surveys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surveys.is_empty()
    }
}

impl SurveyProvider for MemorySurveyStore {
    fn get_survey(&self, id: &str) -> Result<Survey, ReportError> {
        self.surveys
            .get(id)
            .cloned()
            .ok_or_else(|| ReportError::NotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyDetails;

    #[test]
    fn memory_store_fills_in_ids() {
        let store = MemorySurveyStore::new().with_survey("a1", Survey::default());
        assert_eq!(store.len(), 1);
        let survey = store.get_survey("a1").expect("stored survey");
        assert_eq!(survey.id.as_deref(), Some("a1"));
        assert!(store.get_survey("b2").unwrap_err().is_not_found());
    }

    #[test]
    fn memory_store_keeps_explicit_ids() {
        let mut store = MemorySurveyStore::new();
        store.insert(
            "key",
            Survey::new(PropertyDetails::new()).with_id("65f0c0ffee"),
        );
        assert_eq!(
            store.get_survey("key").expect("stored").id.as_deref(),
            Some("65f0c0ffee")
        );
    }

    #[test]
    fn json_store_rejects_path_like_ids() {
        let store = JsonSurveyStore::new("/nonexistent-survey-store");
        for id in ["", ".", "..", "../etc/passwd", "a/b", "a\\b"] {
            assert!(
                store.get_survey(id).unwrap_err().is_not_found(),
                "id {id:?} should be rejected"
            );
        }
    }
}
