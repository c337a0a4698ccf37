//! The document walk that turns a survey into laid-out pages.
//!
//! Rendering happens in two passes.  The first pass walks the survey in
//! document order, placing every block through the [`LayoutCursor`] and drawing
//! it on the page the cursor chose.  Once the walk is over the page count is
//! final, and the second pass stamps the footer on every page.

use image::RgbImage;
use log::debug;

use crate::elements::{PhotoCell, StatusPill};
use crate::error::ReportError;
use crate::fetch::FetchError;
use crate::fonts::{self, FontFace};
use crate::layout::{
    self, Block, LayoutCursor, Placement, CONTENT_WIDTH, COVER_BAND_HEIGHT, DETAILS_BOX_HEIGHT,
    DETAILS_ROW_HEIGHT, FOOTER_HEIGHT, FOOTER_TOP, ITEM_COMMENT_SIZE, ITEM_COMMENT_WIDTH,
    ITEM_LABEL_SIZE, ITEM_LABEL_WIDTH, ITEM_LINE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH,
    SECTION_BAR_HEIGHT,
};
use crate::model::{Item, PropertyDetails, Survey};
use crate::style::{
    self, NAVY, SKY, SLATE_100, SLATE_200, SLATE_400, SLATE_50, SLATE_500, SLATE_600, SLATE_700,
    SLATE_800,
};
use crate::surface::{PageSurface, Rect, TextBox};

/// Title of the extra section holding the survey-wide photos.
pub const GENERAL_PHOTOS_TITLE: &str = "GENERAL PHOTOS";

const EMPTY_VALUE: &str = "\u{2014}";
const STATUS_COLUMN_X: f64 = PAGE_MARGIN + 230.0;
const COMMENTS_COLUMN_X: f64 = PAGE_MARGIN + 310.0;
const PILL_X: f64 = PAGE_MARGIN + 228.0;
const PILL_WIDTH: f64 = 70.0;
const PILL_HEIGHT: f64 = 14.0;
const COMMENT_X: f64 = PAGE_MARGIN + 308.0;

/// Pages produced by a render, still open for drawing.
#[derive(Debug)]
pub struct RenderedLayout {
    pub surface: PageSurface,
    /// 1-based page on which each section header was placed, in section order.
    pub section_pages: Vec<usize>,
}

impl RenderedLayout {
    pub fn page_count(&self) -> usize {
        self.surface.page_count()
    }
}

/// Renders `survey` using the prefetched `photos`.
///
/// `photos` holds one outcome per URL of [`Survey::photo_urls`], in the same
/// order.  A failed or missing outcome is drawn as a placeholder.
pub fn render_survey(
    survey: &Survey,
    photos: &[Result<RgbImage, FetchError>],
) -> Result<RenderedLayout, ReportError> {
    let mut renderer = DocumentRenderer::new(photos);
    renderer.cover(survey)?;

    let mut section_pages = Vec::with_capacity(survey.sections.len());
    for section in &survey.sections {
        let header = renderer.section_header(&section.room_name)?;
        section_pages.push(header.page + 1);
        renderer.column_headers()?;

        for item in &section.items {
            renderer.item(item)?;
        }
        renderer.place(Block::section_end());
    }

    if !survey.global_photos.is_empty() {
        renderer.section_header(GENERAL_PHOTOS_TITLE)?;
        renderer.photo_grid(survey.global_photos.len())?;
    }

    let DocumentRenderer {
        mut surface,
        photo_index,
        placeholders,
        ..
    } = renderer;
    stamp_footers(&mut surface, &survey.property_details.building_name)?;

    debug!(
        "laid out {} section(s) and {photo_index} photo(s) on {} page(s), \
         {placeholders} placeholder(s)",
        survey.sections.len(),
        surface.page_count()
    );

    Ok(RenderedLayout {
        surface,
        section_pages,
    })
}

/// Text printed in the footer band of page `page` (1-based) of `page_count`.
pub fn footer_text(building_name: &str, page: usize, page_count: usize) -> String {
    format!(
        "Property Condition Survey  \u{2022}  \
         {building_name}  \u{2022}  Page {page} of {page_count}"
    )
}

fn stamp_footers(surface: &mut PageSurface, building_name: &str) -> Result<(), ReportError> {
    let page_count = surface.page_count();
    for page in 0..page_count {
        surface.draw_rect(
            page,
            Rect::new(0.0, FOOTER_TOP, PAGE_WIDTH, FOOTER_HEIGHT),
            Some(NAVY),
            None,
        )?;
        surface.draw_text(
            page,
            TextBox::new(
                footer_text(building_name, page + 1, page_count),
                PAGE_MARGIN,
                FOOTER_TOP + 6.0,
            )
            .with_size(7.0)
            .with_color(SLATE_500)
            .centered_in(CONTENT_WIDTH),
        )?;
    }
    Ok(())
}

struct DocumentRenderer<'a> {
    surface: PageSurface,
    cursor: LayoutCursor,
    photos: &'a [Result<RgbImage, FetchError>],
    photo_index: usize,
    placeholders: usize,
}

impl<'a> DocumentRenderer<'a> {
    fn new(photos: &'a [Result<RgbImage, FetchError>]) -> Self {
        let mut surface = PageSurface::new();
        surface.add_page();
        Self {
            surface,
            cursor: LayoutCursor::new(),
            photos,
            photo_index: 0,
            placeholders: 0,
        }
    }

    /// Places `block` and makes sure the page it landed on exists.
    fn place(&mut self, block: Block) -> Placement {
        let placement = self.cursor.place(block);
        while self.surface.page_count() <= placement.page {
            self.surface.add_page();
        }
        placement
    }

    fn text(&mut self, page: usize, text: TextBox) -> Result<(), ReportError> {
        self.surface.draw_text(page, text)
    }

    fn cover(&mut self, survey: &Survey) -> Result<(), ReportError> {
        let header = self.place(Block::cover_header());
        let page = header.page;

        self.surface.draw_rect(
            page,
            Rect::new(0.0, 0.0, PAGE_WIDTH, COVER_BAND_HEIGHT),
            Some(NAVY),
            None,
        )?;
        self.text(
            page,
            TextBox::new("PROPERTY CONDITION SURVEY", PAGE_MARGIN, 28.0)
                .with_face(FontFace::Bold)
                .with_size(22.0)
                .with_color(SKY),
        )?;
        self.text(
            page,
            TextBox::new("Professional Property Inspection Report", PAGE_MARGIN, 56.0)
                .with_size(10.0)
                .with_color(SLATE_400),
        )?;
        self.surface.draw_rect(
            page,
            Rect::new(0.0, COVER_BAND_HEIGHT, PAGE_WIDTH, 4.0),
            Some(SKY),
            None,
        )?;

        let details = self.place(Block::details_box());
        self.details_box(details, &survey.property_details)?;

        let badge = self.place(Block::status_badge());
        StatusPill::new(
            survey.status.label(),
            survey.status.badge_color(),
            Rect::new(PAGE_MARGIN, badge.y, 100.0, 22.0),
        )
        .with_radius(4.0)
        .with_text_size(9.0)
        .with_text_offset(7.0)
        .draw(&mut self.surface, badge.page)?;

        let legend = self.place(Block::legend());
        self.legend(legend)
    }

    fn details_box(
        &mut self,
        placement: Placement,
        details: &PropertyDetails,
    ) -> Result<(), ReportError> {
        let Placement { page, y, .. } = placement;
        self.surface.draw_rect(
            page,
            Rect::new(PAGE_MARGIN, y, CONTENT_WIDTH, DETAILS_BOX_HEIGHT),
            Some(SLATE_50),
            Some(SLATE_200),
        )?;
        self.text(
            page,
            TextBox::new("PROPERTY DETAILS", PAGE_MARGIN + 10.0, y + 10.0)
                .with_face(FontFace::Bold)
                .with_size(11.0)
                .with_color(NAVY),
        )?;

        let date = details.formatted_date();
        let left = [
            ("Unit / Property No.", details.unit_number.as_str()),
            ("Building / Complex", details.building_name.as_str()),
            ("Address", details.address.as_str()),
        ];
        let right = [
            ("Property Type", details.property_type.as_str()),
            ("Inspector", details.inspector.as_str()),
            ("Date", date.as_deref().unwrap_or_default()),
        ];

        let rows_top = y + 28.0;
        let half_width = CONTENT_WIDTH / 2.0 - 10.0;
        let columns = [
            (PAGE_MARGIN + 10.0, left),
            (PAGE_MARGIN + half_width + 20.0, right),
        ];
        for (x, rows) in columns {
            for (index, (label, value)) in rows.into_iter().enumerate() {
                let row_y = rows_top + index as f64 * DETAILS_ROW_HEIGHT;
                self.text(
                    page,
                    TextBox::new(label, x, row_y)
                        .with_size(8.0)
                        .with_color(SLATE_500),
                )?;
                self.text(
                    page,
                    TextBox::new(display_value(value), x, row_y + 9.0)
                        .with_face(FontFace::Bold)
                        .with_size(10.0)
                        .with_color(SLATE_800),
                )?;
            }
        }
        Ok(())
    }

    fn legend(&mut self, placement: Placement) -> Result<(), ReportError> {
        let Placement { page, y, .. } = placement;
        self.text(
            page,
            TextBox::new("LEGEND:", PAGE_MARGIN, y)
                .with_size(8.0)
                .with_color(SLATE_500),
        )?;

        let mut x = PAGE_MARGIN + 45.0;
        for entry in style::legend_entries() {
            self.surface
                .draw_rounded_rect(page, Rect::new(x, y - 1.0, 8.0, 8.0), 2.0, entry.color)?;
            self.text(
                page,
                TextBox::new(entry.label, x + 11.0, y)
                    .with_size(8.0)
                    .with_color(SLATE_700),
            )?;
            x += entry.label.chars().count() as f64 * 6.0 + 22.0;
        }
        Ok(())
    }

    fn section_header(&mut self, title: &str) -> Result<Placement, ReportError> {
        let placement = self.place(Block::section_header());
        let Placement { page, y, .. } = placement;
        self.surface.draw_rect(
            page,
            Rect::new(PAGE_MARGIN, y, CONTENT_WIDTH, SECTION_BAR_HEIGHT),
            Some(NAVY),
            None,
        )?;
        self.text(
            page,
            TextBox::new(title.to_uppercase(), PAGE_MARGIN + 10.0, y + 7.0)
                .with_face(FontFace::Bold)
                .with_size(12.0)
                .with_color(SKY),
        )?;
        Ok(placement)
    }

    fn column_headers(&mut self) -> Result<(), ReportError> {
        let Placement { page, y, .. } = self.place(Block::column_headers());
        for (label, x) in [
            ("ITEM", PAGE_MARGIN),
            ("STATUS", STATUS_COLUMN_X),
            ("COMMENTS", COMMENTS_COLUMN_X),
        ] {
            self.text(
                page,
                TextBox::new(label, x, y)
                    .with_size(8.0)
                    .with_color(SLATE_500),
            )?;
        }

        let rule = self.place(Block::header_rule());
        self.surface.draw_rect(
            rule.page,
            Rect::new(PAGE_MARGIN, rule.y, CONTENT_WIDTH, 1.0),
            Some(SLATE_200),
            None,
        )
    }

    fn item(&mut self, item: &Item) -> Result<(), ReportError> {
        let comments = display_value(&item.comments);
        let label_lines = fonts::wrap_text(
            &item.label,
            FontFace::Bold,
            ITEM_LABEL_SIZE,
            ITEM_LABEL_WIDTH,
        );
        let comment_lines = fonts::wrap_text(
            comments,
            FontFace::Regular,
            ITEM_COMMENT_SIZE,
            ITEM_COMMENT_WIDTH,
        );
        let lines = label_lines.len().max(comment_lines.len());

        let mut first_line = 0;
        for chunk in layout::item_row_chunks(lines) {
            let Placement { page, y, .. } = self.place(Block::item_row(chunk));
            let line_y = |offset: usize| y + offset as f64 * ITEM_LINE_HEIGHT;

            for (offset, line) in label_lines.iter().skip(first_line).take(chunk).enumerate() {
                self.text(
                    page,
                    TextBox::new(line.as_str(), PAGE_MARGIN, line_y(offset))
                        .with_face(FontFace::Bold)
                        .with_size(ITEM_LABEL_SIZE)
                        .with_color(SLATE_800),
                )?;
            }

            if first_line == 0 {
                let status = item.status.style();
                StatusPill::new(
                    status.label,
                    status.color,
                    Rect::new(PILL_X, y - 2.0, PILL_WIDTH, PILL_HEIGHT),
                )
                .draw(&mut self.surface, page)?;
            }

            for (offset, line) in comment_lines.iter().skip(first_line).take(chunk).enumerate() {
                self.text(
                    page,
                    TextBox::new(line.as_str(), COMMENT_X, line_y(offset))
                        .with_size(ITEM_COMMENT_SIZE)
                        .with_color(SLATE_600),
                )?;
            }
            first_line += chunk;
        }

        if !item.photos.is_empty() {
            self.photo_grid(item.photos.len())?;
        }

        let divider = self.place(Block::item_divider());
        self.surface.draw_rect(
            divider.page,
            Rect::new(PAGE_MARGIN, divider.y, CONTENT_WIDTH, 0.5),
            Some(SLATE_100),
            None,
        )
    }

    /// Draws the next `count` prefetched photos as a grid.
    fn photo_grid(&mut self, count: usize) -> Result<(), ReportError> {
        for row in layout::photo_grid_rows(count) {
            let Placement { page, y, .. } = self.place(Block::photo_row());
            for cell in row {
                let photo = self
                    .photos
                    .get(self.photo_index)
                    .and_then(|outcome| outcome.as_ref().ok());
                if photo.is_none() {
                    self.placeholders += 1;
                }
                self.photo_index += 1;
                PhotoCell::new(cell.x(), y, photo, self.photo_index)
                    .draw(&mut self.surface, page)?;
            }
        }
        self.place(Block::photo_grid_end());
        Ok(())
    }
}

fn display_value(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY_VALUE
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemStatus, Section, SurveyStatus};

    use crate::surface::DrawOp;

    fn ok_photos(count: usize) -> Vec<Result<RgbImage, FetchError>> {
        (0..count).map(|_| Ok(RgbImage::new(2, 2))).collect()
    }

    #[test]
    fn cover_page_shows_details_and_status() {
        let survey = Survey::new(
            PropertyDetails::new()
                .with_unit_number("4A")
                .with_building_name("Harbour View"),
        )
        .with_status(SurveyStatus::Completed);

        let layout = render_survey(&survey, &[]).expect("render");
        assert_eq!(layout.page_count(), 1);
        let texts: Vec<_> = layout.surface.pages()[0].texts().collect();
        assert!(texts.contains(&"PROPERTY CONDITION SURVEY"));
        assert!(texts.contains(&"4A"));
        assert!(texts.contains(&"COMPLETED"));
        // Address, property type, inspector and date are empty.
        assert_eq!(texts.iter().filter(|text| **text == EMPTY_VALUE).count(), 4);
        assert_eq!(
            texts.last().copied(),
            Some("Property Condition Survey  \u{2022}  Harbour View  \u{2022}  Page 1 of 1")
        );
    }

    #[test]
    fn empty_section_keeps_its_headers() {
        let survey = Survey::default().with_section(Section::new("Garage"));
        let layout = render_survey(&survey, &[]).expect("render");
        let texts: Vec<_> = layout.surface.pages()[0].texts().collect();
        for expected in ["GARAGE", "ITEM", "STATUS", "COMMENTS"] {
            assert!(texts.contains(&expected), "missing {expected}");
        }
        assert_eq!(layout.section_pages, vec![1]);
    }

    #[test]
    fn unset_status_renders_as_not_applicable() {
        let survey = Survey::default().with_section(
            Section::new("Hall")
                .with_item(Item::new("Door"))
                .with_item(Item::new("Window").with_status(ItemStatus::NeedAction)),
        );
        let layout = render_survey(&survey, &[]).expect("render");
        let texts: Vec<_> = layout.surface.pages()[0].texts().collect();
        let door = texts.iter().position(|text| *text == "Door").expect("door");
        assert_eq!(texts[door + 1], "N/A");
        let window = texts.iter().position(|text| *text == "Window").expect("window");
        assert_eq!(texts[window + 1], "Need Action");
    }

    #[test]
    fn global_photos_continue_the_numbering() {
        let sink = Item::new("Sink").with_photos(["a", "b"]);
        let survey = Survey::default()
            .with_section(Section::new("Kitchen").with_item(sink))
            .with_global_photo("c");
        let layout = render_survey(&survey, &ok_photos(3)).expect("render");
        let texts: Vec<_> = layout.surface.pages()[0].texts().collect();
        let general = texts
            .iter()
            .position(|text| *text == GENERAL_PHOTOS_TITLE)
            .expect("general photos header");
        assert_eq!(texts[general + 1], "Photo 3");
        assert!(texts[..general].contains(&"Photo 2"));
    }

    #[test]
    fn missing_outcomes_become_placeholders() {
        let sink = Item::new("Sink").with_photos(["a", "b"]);
        let survey = Survey::default().with_section(Section::new("Kitchen").with_item(sink));
        let layout = render_survey(&survey, &ok_photos(1)).expect("render");
        let page = &layout.surface.pages()[0];
        assert_eq!(page.images().count(), 1);
        assert_eq!(
            page.texts().filter(|text| *text == "Image unavailable").count(),
            1
        );
    }

    fn numbered_words(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("note{index}")).collect()
    }

    /// Comment lines in page order, with the page and top edge of each.
    fn comment_runs(layout: &RenderedLayout) -> Vec<(usize, f64, String)> {
        let mut runs = Vec::new();
        for (page, contents) in layout.surface.pages().iter().enumerate() {
            for op in contents.ops() {
                if let DrawOp::Text { text, x, y, .. } = op {
                    if *x == COMMENT_X {
                        runs.push((page, *y, text.clone()));
                    }
                }
            }
        }
        runs
    }

    fn assert_clear_of_footer(layout: &RenderedLayout) {
        for (page, contents) in layout.surface.pages().iter().enumerate() {
            for op in contents.ops() {
                if let DrawOp::Text { text, y, size, .. } = op {
                    if *y < FOOTER_TOP {
                        assert!(
                            y + size <= FOOTER_TOP,
                            "{text:?} on page {} runs into the footer",
                            page + 1
                        );
                    }
                    assert!(*y + size <= layout::PAGE_HEIGHT, "{text:?} is off the page");
                }
            }
        }
    }

    #[test]
    fn long_comment_near_the_break_line_moves_to_the_next_page() {
        let words = numbered_words(200);
        let mut section = Section::new("Kitchen");
        for index in 0..15 {
            section = section.with_item(Item::new(format!("Item {index}")));
        }
        section = section.with_item(Item::new("Walls").with_comments(words.join(" ")));
        let layout = render_survey(&Survey::default().with_section(section), &[]).expect("render");

        assert_eq!(layout.page_count(), 2);
        assert_clear_of_footer(&layout);
        let second: Vec<_> = layout.surface.pages()[1].texts().collect();
        assert_eq!(second.first().copied(), Some("Walls"));

        let runs = comment_runs(&layout);
        let walls: Vec<_> = runs.iter().filter(|(page, ..)| *page == 1).collect();
        assert_eq!(walls.first().map(|(_, y, _)| *y), Some(PAGE_MARGIN));
        let printed: Vec<&str> = walls
            .iter()
            .flat_map(|(.., text)| text.split_whitespace())
            .collect();
        assert_eq!(printed, words);
    }

    #[test]
    fn comments_longer_than_a_page_continue_on_following_pages() {
        let words = numbered_words(2000);
        let survey = Survey::default().with_section(
            Section::new("Loft").with_item(
                Item::new("Roof timbers")
                    .with_status(ItemStatus::NeedAction)
                    .with_comments(words.join(" ")),
            ),
        );
        let layout = render_survey(&survey, &[]).expect("render");

        assert!(layout.page_count() >= 3, "got {} page(s)", layout.page_count());
        assert_clear_of_footer(&layout);

        let printed: Vec<String> = comment_runs(&layout)
            .iter()
            .flat_map(|(.., text)| text.split_whitespace().map(str::to_string))
            .collect();
        assert_eq!(printed, words);

        let pills = layout
            .surface
            .pages()
            .iter()
            .flat_map(|page| page.texts())
            .filter(|text| *text == "Need Action")
            .count();
        assert_eq!(pills, 1);
    }
}
