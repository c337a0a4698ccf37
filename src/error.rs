//! Error type shared by the renderer, the survey stores and the report builder.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a report render or a survey lookup.
///
/// Photo failures are not represented here: they are recovered while
/// rendering and show up as placeholders in the document.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No survey exists under the requested id.
    #[error("survey '{id}' was not found")]
    NotFound { id: String },
    /// The survey store could not be read.
    #[error("failed to read survey store at {}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A stored survey is not valid JSON for the survey model.
    #[error("failed to parse survey '{id}'")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// A draw call referenced a page that does not exist.
    #[error("page index {page} is out of range for a document with {count} page(s)")]
    PageOutOfRange { page: usize, count: usize },
    /// The PDF backend failed while assembling the document.
    #[error("failed to produce PDF output")]
    Pdf(#[from] printpdf::Error),
    /// Writing the buffered document failed.
    #[error("failed to write report output")]
    Io(#[from] std::io::Error),
    /// Section bookmarks could not be applied.
    #[cfg(feature = "bookmarks")]
    #[error("failed to apply section bookmarks")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}

impl ReportError {
    /// Whether the error means the requested survey does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
