//! Paginated PDF reports for property condition surveys.
//!
//! A [`Survey`] is fetched from a [`SurveyProvider`], its photos are resolved
//! through an [`ImageFetcher`], and the [`ReportBuilder`] lays the fixed report
//! template out over as many A4 pages as it needs before serializing them
//! with `printpdf`.
//!
//! ```no_run
//! use survey_report::{JsonSurveyStore, ReportBuilder, ReportOptions};
//!
//! # fn main() -> Result<(), survey_report::ReportError> {
//! let store = JsonSurveyStore::new("surveys");
//! let report = ReportBuilder::new()
//!     .with_options(ReportOptions::from_env())
//!     .render_by_id(&store, "65f0c0ffee")?;
//! report.write_to(std::fs::File::create(&report.filename)?)?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod elements;
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod render;
pub mod store;
pub mod style;
pub mod surface;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{RenderedReport, ReportBuilder};
pub use config::ReportOptions;
pub use error::ReportError;
pub use fetch::{FetchError, HttpImageFetcher, ImageFetcher};
pub use model::{Item, ItemStatus, PropertyDetails, Section, Survey, SurveyStatus};
pub use store::{JsonSurveyStore, MemorySurveyStore, SurveyProvider};
