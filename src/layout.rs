//! Pagination for the fixed report template.
//!
//! The report is a vertical stack of blocks.  A [`LayoutCursor`] tracks the
//! current page and the vertical offset on it; each [`Block`] is placed by
//! [`LayoutCursor::place`], which decides whether the block starts a new page
//! and advances the cursor past it.  All values are PDF points measured from
//! the top-left corner of an A4 page.
//!
//! Break thresholds differ per block type: section headers move to a new page
//! once the cursor passes 700, item rows once it passes 720, and photo rows
//! when the row plus its padding would reach past 760.  The footer band starts
//! at 820, and an item row that would run into it also moves to a new page.
//! Rows too tall for any page are split with [`item_row_chunks`].

use log::trace;

use crate::fonts::{self, FontFace};

pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const PAGE_MARGIN: f64 = 50.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - PAGE_MARGIN * 2.0;

pub const SECTION_BREAK_Y: f64 = 700.0;
pub const ITEM_BREAK_Y: f64 = 720.0;
pub const PHOTO_ROW_BREAK_Y: f64 = 760.0;

pub const FOOTER_TOP: f64 = 820.0;
pub const FOOTER_HEIGHT: f64 = 22.0;

/// Height of the dark title band at the top of the first page.
pub const COVER_BAND_HEIGHT: f64 = 110.0;
/// Where the cursor sits once the cover band and its accent line are drawn.
pub const COVER_CONTENT_TOP: f64 = 130.0;
/// Drawn height of the property details panel.
pub const DETAILS_BOX_HEIGHT: f64 = 120.0;
pub const DETAILS_ROW_HEIGHT: f64 = 22.0;
pub const DETAILS_ROWS: usize = 3;

pub const SECTION_LEAD: f64 = 10.0;
pub const SECTION_BAR_HEIGHT: f64 = 24.0;

pub const ITEM_LABEL_WIDTH: f64 = 220.0;
pub const ITEM_COMMENT_WIDTH: f64 = 175.0;
pub const ITEM_LABEL_SIZE: f64 = 9.0;
pub const ITEM_COMMENT_SIZE: f64 = 8.0;
pub const ITEM_ROW_HEIGHT: f64 = 18.0;
pub const ITEM_LINE_HEIGHT: f64 = 10.0;

pub const PHOTO_COLUMNS: usize = 3;
pub const THUMB_WIDTH: f64 = 115.0;
pub const THUMB_HEIGHT: f64 = 80.0;
pub const THUMB_GAP: f64 = 8.0;
pub const PHOTO_ROW_SPACING: f64 = 6.0;
/// Clearance a photo row needs below it beyond the thumbnail itself.
pub const PHOTO_ROW_RESERVE: f64 = 10.0;

/// The kinds of block the report is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    CoverHeader,
    DetailsBox,
    StatusBadge,
    Legend,
    SectionHeader,
    ColumnHeaders,
    HeaderRule,
    ItemRow,
    PhotoRow,
    PhotoGridEnd,
    ItemDivider,
    SectionEnd,
}

/// Condition under which a block is moved to a fresh page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBreak {
    /// Lowest cursor position, after `reserve` is added, that still fits.
    pub threshold: f64,
    /// Space below the cursor that has to fit above `threshold`.
    pub reserve: f64,
    /// Edge the bottom of the block may not cross, if any.
    pub bottom: Option<f64>,
}

/// One atomic unit of report content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// Spacing added to the cursor before the break check.
    pub lead: f64,
    /// Cursor advance once the block is placed.
    pub height: f64,
    pub page_break: Option<PageBreak>,
}

impl Block {
    fn fixed(kind: BlockKind, height: f64) -> Self {
        Self {
            kind,
            lead: 0.0,
            height,
            page_break: None,
        }
    }

    /// The title band on the first page.
    pub fn cover_header() -> Self {
        Self::fixed(BlockKind::CoverHeader, COVER_CONTENT_TOP - PAGE_MARGIN)
    }

    /// The property details panel.
    pub fn details_box() -> Self {
        // Title line (10 + 18), three rows and the trailing gap.
        let height = 28.0 + DETAILS_ROW_HEIGHT * DETAILS_ROWS as f64 + 20.0;
        Self::fixed(BlockKind::DetailsBox, height)
    }

    pub fn status_badge() -> Self {
        Self::fixed(BlockKind::StatusBadge, 35.0)
    }

    pub fn legend() -> Self {
        Self::fixed(BlockKind::Legend, 20.0)
    }

    /// A room title bar.
    pub fn section_header() -> Self {
        Self {
            kind: BlockKind::SectionHeader,
            lead: SECTION_LEAD,
            height: SECTION_BAR_HEIGHT + 6.0,
            page_break: Some(PageBreak {
                threshold: SECTION_BREAK_Y,
                reserve: 0.0,
                bottom: None,
            }),
        }
    }

    pub fn column_headers() -> Self {
        Self::fixed(BlockKind::ColumnHeaders, 14.0)
    }

    pub fn header_rule() -> Self {
        Self::fixed(BlockKind::HeaderRule, 6.0)
    }

    /// An item row whose label or comments wrap onto `lines` lines.
    pub fn item_row(lines: usize) -> Self {
        let extra = lines.saturating_sub(1) as f64 * ITEM_LINE_HEIGHT;
        Self {
            kind: BlockKind::ItemRow,
            lead: 0.0,
            height: ITEM_ROW_HEIGHT + extra,
            page_break: Some(PageBreak {
                threshold: ITEM_BREAK_Y,
                reserve: 0.0,
                bottom: Some(FOOTER_TOP),
            }),
        }
    }

    /// One row of up to [`PHOTO_COLUMNS`] thumbnails.
    pub fn photo_row() -> Self {
        Self {
            kind: BlockKind::PhotoRow,
            lead: 0.0,
            height: THUMB_HEIGHT + PHOTO_ROW_SPACING,
            page_break: Some(PageBreak {
                threshold: PHOTO_ROW_BREAK_Y,
                reserve: THUMB_HEIGHT + PHOTO_ROW_RESERVE,
                bottom: None,
            }),
        }
    }

    pub fn photo_grid_end() -> Self {
        Self::fixed(BlockKind::PhotoGridEnd, 4.0)
    }

    pub fn item_divider() -> Self {
        Self::fixed(BlockKind::ItemDivider, 6.0)
    }

    pub fn section_end() -> Self {
        Self::fixed(BlockKind::SectionEnd, 6.0)
    }
}

/// Number of lines an item row needs for its label and comments.
pub fn item_row_lines(label: &str, comments: &str) -> usize {
    let label_lines = fonts::wrap_text(label, FontFace::Bold, ITEM_LABEL_SIZE, ITEM_LABEL_WIDTH);
    let comment_lines = fonts::wrap_text(
        comments,
        FontFace::Regular,
        ITEM_COMMENT_SIZE,
        ITEM_COMMENT_WIDTH,
    );
    label_lines.len().max(comment_lines.len())
}

/// Most wrapped lines a single item row can hold above the footer of a fresh page.
pub fn item_lines_per_page() -> usize {
    ((FOOTER_TOP - PAGE_MARGIN - ITEM_ROW_HEIGHT) / ITEM_LINE_HEIGHT).floor() as usize + 1
}

/// Splits an item row of `lines` wrapped lines into rows that each fit on a page.
///
/// The first chunk carries the status pill; the others continue the label and
/// comments on the following pages.
pub fn item_row_chunks(lines: usize) -> Vec<usize> {
    let per_page = item_lines_per_page();
    let mut remaining = lines.max(1);
    let mut chunks = Vec::with_capacity(remaining / per_page + 1);
    while remaining > 0 {
        let chunk = remaining.min(per_page);
        chunks.push(chunk);
        remaining -= chunk;
    }
    chunks
}

/// Where a block landed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Zero-based page index.
    pub page: usize,
    /// Top edge of the block on that page.
    pub y: f64,
    /// Whether placing this block opened a new page.
    pub page_break: bool,
}

/// Current page and vertical offset of the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    page: usize,
    y: f64,
}

impl Default for LayoutCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCursor {
    /// Starts at the top margin of the first page.
    pub fn new() -> Self {
        Self {
            page: 0,
            y: PAGE_MARGIN,
        }
    }

    /// Zero-based index of the current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Vertical offset on the current page.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Places `block`, starting a new page first when its break rule demands it.
    pub fn place(&mut self, block: Block) -> Placement {
        self.y += block.lead;

        let mut page_break = false;
        if let Some(rule) = block.page_break {
            let past_threshold = self.y + rule.reserve > rule.threshold;
            // A block already at the top margin stays put, whatever its height.
            let overflows = rule.bottom.map_or(false, |bottom| {
                self.y > PAGE_MARGIN && self.y + block.height > bottom
            });
            if past_threshold || overflows {
                trace!(
                    "{:?} at y={} (height {}) does not fit; starting page {}",
                    block.kind,
                    self.y,
                    block.height,
                    self.page + 2
                );
                self.page += 1;
                self.y = PAGE_MARGIN;
                page_break = true;
            }
        }

        let placement = Placement {
            page: self.page,
            y: self.y,
            page_break,
        };
        self.y += block.height;
        placement
    }
}

/// Position of one photo inside a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

impl GridCell {
    /// Left edge of the thumbnail.
    pub fn x(&self) -> f64 {
        PAGE_MARGIN + self.column as f64 * (THUMB_WIDTH + THUMB_GAP)
    }
}

/// Splits `count` photos into grid rows, each holding up to [`PHOTO_COLUMNS`] cells.
pub fn photo_grid_rows(count: usize) -> Vec<Vec<GridCell>> {
    (0..count)
        .map(|index| GridCell {
            row: index / PHOTO_COLUMNS,
            column: index % PHOTO_COLUMNS,
        })
        .fold(Vec::new(), |mut rows: Vec<Vec<GridCell>>, cell| {
            if cell.column == 0 {
                rows.push(Vec::with_capacity(PHOTO_COLUMNS));
            }
            if let Some(row) = rows.last_mut() {
                row.push(cell);
            }
            rows
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_blocks_fill_the_first_page_top() {
        let mut cursor = LayoutCursor::new();
        let header = cursor.place(Block::cover_header());
        assert_eq!((header.page, header.y), (0, PAGE_MARGIN));
        assert_eq!(cursor.y(), COVER_CONTENT_TOP);

        cursor.place(Block::details_box());
        assert_eq!(cursor.y(), 244.0);
        assert_eq!(cursor.place(Block::status_badge()).y, 244.0);
        assert_eq!(cursor.place(Block::legend()).y, 279.0);
        assert_eq!(cursor.y(), 299.0);
    }

    #[test]
    fn section_header_applies_lead_before_checking() {
        let mut cursor = LayoutCursor { page: 0, y: 690.0 };
        let placement = cursor.place(Block::section_header());
        assert_eq!(placement.y, 700.0);
        assert!(!placement.page_break);

        let mut cursor = LayoutCursor { page: 0, y: 691.0 };
        let placement = cursor.place(Block::section_header());
        assert_eq!((placement.page, placement.y), (1, PAGE_MARGIN));
        assert!(placement.page_break);
        assert_eq!(cursor.y(), PAGE_MARGIN + 30.0);
    }

    #[test]
    fn item_rows_break_past_720() {
        let mut cursor = LayoutCursor { page: 2, y: 720.0 };
        assert_eq!(cursor.place(Block::item_row(1)).page, 2);
        assert_eq!(cursor.y(), 738.0);

        let placement = cursor.place(Block::item_row(3));
        assert_eq!((placement.page, placement.y), (3, PAGE_MARGIN));
        assert_eq!(cursor.y(), PAGE_MARGIN + 38.0);
    }

    #[test]
    fn tall_item_rows_never_reach_the_footer() {
        // 10 lines end at 808, just above the footer band.
        let mut cursor = LayoutCursor { page: 0, y: 700.0 };
        let placement = cursor.place(Block::item_row(10));
        assert_eq!((placement.page, placement.y), (0, 700.0));
        assert_eq!(cursor.y(), 808.0);

        // Below the 720 rule, but 12 lines would run into the footer.
        let mut cursor = LayoutCursor { page: 0, y: 719.0 };
        let placement = cursor.place(Block::item_row(12));
        assert_eq!((placement.page, placement.y), (1, PAGE_MARGIN));
        assert!(placement.page_break);
        assert_eq!(cursor.y(), PAGE_MARGIN + 128.0);
    }

    #[test]
    fn rows_taller_than_a_page_are_split() {
        let per_page = item_lines_per_page();
        assert_eq!(per_page, 76);
        let height = Block::item_row(per_page).height;
        assert!(PAGE_MARGIN + height <= FOOTER_TOP);
        assert!(PAGE_MARGIN + Block::item_row(per_page + 1).height > FOOTER_TOP);

        assert_eq!(item_row_chunks(0), vec![1]);
        assert_eq!(item_row_chunks(5), vec![5]);
        assert_eq!(item_row_chunks(200), vec![76, 76, 48]);

        let mut cursor = LayoutCursor { page: 0, y: 400.0 };
        let pages: Vec<usize> = item_row_chunks(200)
            .into_iter()
            .map(|lines| cursor.place(Block::item_row(lines)).page)
            .collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert!(cursor.y() <= FOOTER_TOP);
    }

    #[test]
    fn photo_rows_reserve_their_height() {
        let mut cursor = LayoutCursor { page: 0, y: 670.0 };
        assert!(!cursor.place(Block::photo_row()).page_break);

        let mut cursor = LayoutCursor { page: 0, y: 670.5 };
        let placement = cursor.place(Block::photo_row());
        assert!(placement.page_break);
        assert_eq!(cursor.y(), PAGE_MARGIN + 86.0);
    }

    #[test]
    fn grid_rows_hold_three_cells() {
        let rows = photo_grid_rows(4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1], vec![GridCell { row: 1, column: 0 }]);
        assert_eq!(rows[0][2].x(), PAGE_MARGIN + 2.0 * 123.0);
        assert!(photo_grid_rows(0).is_empty());
    }

    #[test]
    fn row_height_grows_with_wrapped_comments() {
        assert_eq!(item_row_lines("Sink", ""), 1);
        let long = "Hairline crack along the grout line beside the window, \
                    water staining on the sill and a loose tile near the tap";
        let lines = item_row_lines("Sink", long);
        assert!(lines > 1);
        assert_eq!(Block::item_row(lines).height, 18.0 + (lines - 1) as f64 * 10.0);
    }
}
