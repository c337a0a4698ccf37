//! Report construction entry points.

use std::io::{Cursor, Write};
use std::sync::Arc;

use log::debug;

use crate::config::ReportOptions;
use crate::error::ReportError;
use crate::fetch::{self, HttpImageFetcher, ImageFetcher};
use crate::model::Survey;
use crate::render::{self, RenderedLayout};
use crate::store::SurveyProvider;

/// MIME type of every rendered report.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A finished, fully buffered report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedReport {
    /// The complete PDF document.
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// 1-based starting page of each section, in section order.
    pub section_pages: Vec<usize>,
    /// Suggested download name, e.g. `survey-4A.pdf`.
    pub filename: String,
}

impl RenderedReport {
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    /// Value for a `Content-Disposition` header offering the report as a download.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Returns a reader over the buffered bytes.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }

    /// Writes the whole document to `writer`.
    pub fn write_to(&self, mut writer: impl Write) -> Result<(), ReportError> {
        writer.write_all(&self.bytes)?;
        writer.flush()?;
        Ok(())
    }
}

/// Builder that renders surveys into PDF reports.
///
/// Photos are fetched through an [`ImageFetcher`]; by default an
/// [`HttpImageFetcher`] configured from the [`ReportOptions`] is used.
#[derive(Clone, Default)]
pub struct ReportBuilder {
    options: ReportOptions,
    fetcher: Option<Arc<dyn ImageFetcher>>,
}

impl ReportBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rendering options and returns the updated builder.
    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses `fetcher` to retrieve photos instead of plain HTTP.
    pub fn with_fetcher(mut self, fetcher: impl ImageFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Uses an already shared fetcher to retrieve photos.
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    fn resolve_fetcher(&self) -> Arc<dyn ImageFetcher> {
        match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(HttpImageFetcher::new(
                self.options.fetch_timeout(),
                self.options.max_photo_bytes(),
            )),
        }
    }

    /// Fetches the photos of `survey` and lays out every page, without
    /// serializing the result.
    pub fn layout(&self, survey: &Survey) -> Result<RenderedLayout, ReportError> {
        let urls: Vec<&str> = survey.photo_urls().collect();
        let fetcher = self.resolve_fetcher();
        let photos = fetch::fetch_photos(fetcher.as_ref(), &urls, self.options.parallel_fetch());
        render::render_survey(survey, &photos)
    }

    /// Renders `survey` into a complete PDF report.
    pub fn render(&self, survey: &Survey) -> Result<RenderedReport, ReportError> {
        let RenderedLayout {
            surface,
            section_pages,
        } = self.layout(survey)?;
        let page_count = surface.page_count();
        let bytes = surface.finalize(self.options.title())?;

        debug!(
            "rendered report {} with {page_count} page(s), {} bytes",
            survey.report_filename(),
            bytes.len()
        );

        Ok(RenderedReport {
            bytes,
            page_count,
            section_pages,
            filename: survey.report_filename(),
        })
    }

    /// Looks up survey `id` through `provider` and renders it.
    ///
    /// An unknown id fails with [`ReportError::NotFound`] before any output is
    /// produced.
    pub fn render_by_id<P>(&self, provider: &P, id: &str) -> Result<RenderedReport, ReportError>
    where
        P: SurveyProvider + ?Sized,
    {
        let survey = provider.get_survey(id)?;
        self.render(&survey)
    }

    /// Renders `survey` and adds a PDF outline entry for every section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self, survey: &Survey) -> Result<RenderedReport, ReportError> {
        let mut report = self.render(survey)?;
        let titles: Vec<&str> = survey
            .sections
            .iter()
            .map(|section| section.room_name.as_str())
            .collect();
        report.bytes = crate::bookmarks::apply_section_bookmarks(
            &report.bytes,
            &titles,
            &report.section_pages,
        )?;
        Ok(report)
    }
}

impl std::fmt::Debug for ReportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportBuilder")
            .field("options", &self.options)
            .field("custom_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::model::{Item, PropertyDetails, Section};
    use crate::store::MemorySurveyStore;

    struct OfflineFetcher;

    impl ImageFetcher for OfflineFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    #[test]
    fn unknown_id_fails_before_rendering() {
        let store = MemorySurveyStore::new();
        let err = ReportBuilder::new()
            .with_fetcher(OfflineFetcher)
            .render_by_id(&store, "missing")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn report_carries_metadata() {
        let survey = Survey::new(PropertyDetails::new().with_unit_number("4A"))
            .with_section(Section::new("Kitchen").with_item(Item::new("Sink").with_photo("x")));
        let mut store = MemorySurveyStore::new();
        store.insert("s1", survey);

        let report = ReportBuilder::new()
            .with_fetcher(OfflineFetcher)
            .render_by_id(&store, "s1")
            .expect("render");

        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.page_count, 1);
        assert_eq!(report.section_pages, vec![1]);
        assert_eq!(report.filename, "survey-4A.pdf");
        assert_eq!(report.content_type(), "application/pdf");
        assert_eq!(
            report.content_disposition(),
            "attachment; filename=\"survey-4A.pdf\""
        );

        let mut sink = Vec::new();
        report.write_to(&mut sink).expect("write");
        assert_eq!(sink, report.bytes);
        assert_eq!(report.into_reader().into_inner(), sink);
    }
}
