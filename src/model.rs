//! Data structures describing a property condition survey.
//!
//! The types in this module mirror the records kept by the survey document
//! store.  They deserialize from the store's JSON representation (camelCase
//! field names, display strings for statuses) and are treated as read-only
//! input by the renderer.  Sections, items and photo lists keep their
//! insertion order, which is also the order they appear in the report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Overall state of a survey.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurveyStatus {
    /// The inspection is still being recorded.
    #[default]
    Draft,
    /// The inspection has been signed off.
    Completed,
}

impl SurveyStatus {
    /// Returns the label printed on the report badge.
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Condition recorded for a single inspected item.
///
/// `Unset` is what the editor stores before the inspector picks a value.  It
/// renders exactly like [`ItemStatus::NotApplicable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// The item is in good condition.
    #[serde(rename = "Good")]
    Good,
    /// The item needs repair or attention.
    #[serde(rename = "Need Action")]
    NeedAction,
    /// The item does not apply to this property.
    #[serde(rename = "N/A")]
    NotApplicable,
    /// No status has been recorded yet.
    #[default]
    #[serde(rename = "")]
    Unset,
}

/// Identifying details of the inspected property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDetails {
    pub unit_number: String,
    pub building_name: String,
    pub address: String,
    pub property_type: String,
    pub inspector: String,
    #[serde(with = "date_format")]
    pub date: Option<NaiveDate>,
}

impl PropertyDetails {
    /// Creates empty property details.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the unit number and returns the updated details.
    pub fn with_unit_number(mut self, unit_number: impl Into<String>) -> Self {
        self.unit_number = unit_number.into();
        self
    }

    /// Sets the building name and returns the updated details.
    pub fn with_building_name(mut self, building_name: impl Into<String>) -> Self {
        self.building_name = building_name.into();
        self
    }

    /// Sets the street address and returns the updated details.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the property type and returns the updated details.
    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = property_type.into();
        self
    }

    /// Sets the inspector name and returns the updated details.
    pub fn with_inspector(mut self, inspector: impl Into<String>) -> Self {
        self.inspector = inspector.into();
        self
    }

    /// Sets the inspection date and returns the updated details.
    pub fn with_date(mut self, date: impl Into<Option<NaiveDate>>) -> Self {
        self.date = date.into();
        self
    }

    /// Formats the inspection date the way the report prints it, e.g. `07 March 2024`.
    pub fn formatted_date(&self) -> Option<String> {
        self.date.map(|date| date.format("%d %B %Y").to_string())
    }
}

/// A single inspected item within a room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub label: String,
    pub status: ItemStatus,
    pub photos: Vec<String>,
    pub comments: String,
}

impl Item {
    /// Creates an item with the given label and no recorded status.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Sets the status and returns the updated item.
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the free-text comments and returns the updated item.
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    /// Appends a photo URL and returns the updated item.
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photos.push(url.into());
        self
    }

    /// Extends the photo list and returns the updated item.
    pub fn with_photos<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.photos.extend(urls.into_iter().map(Into::into));
        self
    }
}

/// A room of the property together with its inspected items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    pub room_name: String,
    pub items: Vec<Item>,
}

impl Section {
    /// Creates an empty section for the given room.
    pub fn new(room_name: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            items: Vec::new(),
        }
    }

    /// Appends an item and returns the updated section.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Extends the section with additional items and returns the updated instance.
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        self.items.extend(items);
        self
    }
}

/// A complete property condition survey.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Survey {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub property_details: PropertyDetails,
    pub sections: Vec<Section>,
    pub global_photos: Vec<String>,
    pub status: SurveyStatus,
}

impl Survey {
    /// Creates an empty draft survey for the given property.
    pub fn new(property_details: PropertyDetails) -> Self {
        Self {
            property_details,
            ..Self::default()
        }
    }

    /// Parses a survey from the store's JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Sets the store identifier and returns the updated survey.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the survey status and returns the updated survey.
    pub fn with_status(mut self, status: SurveyStatus) -> Self {
        self.status = status;
        self
    }

    /// Appends a section and returns the updated survey.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Appends a survey-wide photo and returns the updated survey.
    pub fn with_global_photo(mut self, url: impl Into<String>) -> Self {
        self.global_photos.push(url.into());
        self
    }

    /// Returns every photo URL in document order: item photos section by
    /// section, followed by the survey-wide photos.
    ///
    /// The position of a URL in this sequence, plus one, is its caption number.
    pub fn photo_urls(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter())
            .flat_map(|item| item.photos.iter())
            .chain(self.global_photos.iter())
            .map(String::as_str)
    }

    /// Total number of photos referenced by the survey.
    pub fn photo_count(&self) -> usize {
        self.photo_urls().count()
    }

    /// Suggested download name: `survey-{unitNumber}.pdf`, falling back to the
    /// store id.
    pub fn report_filename(&self) -> String {
        let unit = self.property_details.unit_number.trim();
        let stem = if !unit.is_empty() {
            unit
        } else {
            self.id.as_deref().map(str::trim).unwrap_or_default()
        };

        if stem.is_empty() {
            return "survey-report.pdf".to_string();
        }

        let stem: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        format!("survey-{stem}.pdf")
    }
}

mod date_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Some(date));
        }

        DateTime::parse_from_rfc3339(raw)
            .map(|timestamp| Some(timestamp.date_naive()))
            .map_err(|err| serde::de::Error::custom(format!("invalid date '{raw}': {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_survey() -> Survey {
        Survey::new(PropertyDetails::new().with_unit_number("12B"))
            .with_section(
                Section::new("Kitchen")
                    .with_item(Item::new("Sink").with_photos(["a", "b"]))
                    .with_item(Item::new("Oven").with_photo("c")),
            )
            .with_section(Section::new("Hall").with_item(Item::new("Door").with_photo("d")))
            .with_global_photo("e")
    }

    #[test]
    fn photo_urls_follow_document_order() {
        let survey = sample_survey();
        let urls: Vec<_> = survey.photo_urls().collect();
        assert_eq!(urls, ["a", "b", "c", "d", "e"]);
        assert_eq!(survey.photo_count(), 5);
    }

    #[test]
    fn deserializes_store_json() {
        let json = r#"{
            "_id": "65f0c0ffee",
            "propertyDetails": {
                "unitNumber": "4A",
                "buildingName": "Harbour View",
                "date": "2024-03-07T09:30:00.000Z"
            },
            "sections": [
                { "roomName": "Kitchen", "items": [
                    { "label": "Sink", "status": "Need Action", "photos": ["u1"] },
                    { "label": "Tap", "status": "" },
                    { "label": "Hob" }
                ]}
            ],
            "status": "Completed"
        }"#;

        let survey: Survey = serde_json::from_str(json).expect("parse survey");
        assert_eq!(survey.id.as_deref(), Some("65f0c0ffee"));
        assert_eq!(survey.status, SurveyStatus::Completed);
        assert_eq!(
            survey.property_details.date,
            NaiveDate::from_ymd_opt(2024, 3, 7)
        );
        let items = &survey.sections[0].items;
        assert_eq!(items[0].status, ItemStatus::NeedAction);
        assert_eq!(items[1].status, ItemStatus::Unset);
        assert_eq!(items[2].status, ItemStatus::Unset);
        assert!(survey.global_photos.is_empty());
    }

    #[test]
    fn accepts_plain_dates_and_formats_them() {
        let details: PropertyDetails =
            serde_json::from_str(r#"{ "date": "2024-03-07" }"#).expect("parse details");
        assert_eq!(details.formatted_date().as_deref(), Some("07 March 2024"));

        let empty: PropertyDetails = serde_json::from_str(r#"{ "date": null }"#).expect("parse");
        assert_eq!(empty.formatted_date(), None);
    }

    #[test]
    fn filename_prefers_unit_number() {
        assert_eq!(sample_survey().report_filename(), "survey-12B.pdf");

        let by_id = Survey::default().with_id("abc123");
        assert_eq!(by_id.report_filename(), "survey-abc123.pdf");

        let spaced = Survey::new(PropertyDetails::new().with_unit_number("Unit 7/2"));
        assert_eq!(spaced.report_filename(), "survey-Unit-7-2.pdf");

        assert_eq!(Survey::default().report_filename(), "survey-report.pdf");
    }
}
