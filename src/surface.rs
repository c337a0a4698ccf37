//! A multi-page drawing surface that is serialized to PDF at the end.
//!
//! Pages hold plain [`DrawOp`] records in top-left page coordinates (points).
//! Every page stays addressable and mutable until [`PageSurface::finalize`],
//! which lets the renderer stamp footers once the final page count is known.

use std::io::BufWriter;

use image::{DynamicImage, RgbImage};
use log::debug;
use printpdf::{Color, Image, Line, Mm, PdfDocument, PdfLayerReference, Point, Pt};

use crate::error::ReportError;
use crate::fonts::{self, FontFace};
use crate::layout::{PAGE_HEIGHT, PAGE_WIDTH};
use crate::style::Rgb;

/// Bezier handle length for a quarter circle of radius 1.
const KAPPA: f64 = 0.552_284_749_8;
const STROKE_WIDTH: f64 = 0.5;

/// An axis-aligned rectangle in top-left page coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Horizontal alignment of a text run inside its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// A single line of text to be placed on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox {
    pub text: String,
    /// Left edge of the box.
    pub x: f64,
    /// Top of the text line.
    pub y: f64,
    /// Box width used for alignment; `None` means the text starts at `x`.
    pub width: Option<f64>,
    pub align: Align,
    pub face: FontFace,
    pub size: f64,
    pub color: Rgb,
}

impl TextBox {
    /// Creates a left-aligned regular text line at `(x, y)`.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width: None,
            align: Align::Left,
            face: FontFace::Regular,
            size: 10.0,
            color: Rgb::new(0, 0, 0),
        }
    }

    pub fn with_face(mut self, face: FontFace) -> Self {
        self.face = face;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Centers the text inside a box of the given width starting at `x`.
    pub fn centered_in(mut self, width: f64) -> Self {
        self.width = Some(width);
        self.align = Align::Center;
        self
    }

    fn resolved_x(&self) -> f64 {
        match (self.align, self.width) {
            (Align::Center, Some(width)) => {
                let text_width = self.face.text_width(&self.text, self.size);
                self.x + (width - text_width) / 2.0
            }
            _ => self.x,
        }
    }
}

/// A recorded drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Rect {
        rect: Rect,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    RoundedRect {
        rect: Rect,
        radius: f64,
        fill: Rgb,
    },
    Text {
        text: String,
        /// Left edge after alignment.
        x: f64,
        /// Top of the text line.
        y: f64,
        face: FontFace,
        size: f64,
        color: Rgb,
    },
    Image {
        rect: Rect,
        pixels: RgbImage,
    },
}

/// The draw operations of one page, in painting order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text runs on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Embedded images on the page, in drawing order.
    pub fn images(&self) -> impl Iterator<Item = &Rect> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { rect, .. } => Some(rect),
            _ => None,
        })
    }
}

/// Ordered, addressable collection of pages.
#[derive(Clone, Debug, Default)]
pub struct PageSurface {
    pages: Vec<Page>,
}

impl PageSurface {
    /// Creates a surface without pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a blank page and returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Number of pages created so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut Page, ReportError> {
        let count = self.pages.len();
        self.pages
            .get_mut(page)
            .ok_or(ReportError::PageOutOfRange { page, count })
    }

    fn push(&mut self, page: usize, op: DrawOp) -> Result<(), ReportError> {
        self.page_mut(page)?.ops.push(op);
        Ok(())
    }

    /// Draws a rectangle with an optional fill and an optional outline.
    pub fn draw_rect(
        &mut self,
        page: usize,
        rect: Rect,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    ) -> Result<(), ReportError> {
        self.push(page, DrawOp::Rect { rect, fill, stroke })
    }

    /// Draws a filled rectangle with rounded corners.
    pub fn draw_rounded_rect(
        &mut self,
        page: usize,
        rect: Rect,
        radius: f64,
        fill: Rgb,
    ) -> Result<(), ReportError> {
        let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        self.push(page, DrawOp::RoundedRect { rect, radius, fill })
    }

    /// Draws a single line of text.
    pub fn draw_text(&mut self, page: usize, text: TextBox) -> Result<(), ReportError> {
        let x = text.resolved_x();
        self.push(
            page,
            DrawOp::Text {
                x,
                y: text.y,
                face: text.face,
                size: text.size,
                color: text.color,
                text: text.text,
            },
        )
    }

    /// Draws an RGB image stretched to `rect`.
    pub fn draw_image(
        &mut self,
        page: usize,
        rect: Rect,
        pixels: RgbImage,
    ) -> Result<(), ReportError> {
        self.push(page, DrawOp::Image { rect, pixels })
    }

    /// Serializes all pages, in order, into a PDF document.
    pub fn finalize(self, title: &str) -> Result<Vec<u8>, ReportError> {
        let width = Mm::from(Pt(PAGE_WIDTH));
        let height = Mm::from(Pt(PAGE_HEIGHT));
        let (document, first_page, first_layer) = PdfDocument::new(title, width, height, "Content");
        let fonts = fonts::install_default_fonts(&document)?;

        let page_count = self.pages.len().max(1);
        let mut layers = Vec::with_capacity(page_count);
        layers.push(document.get_page(first_page).get_layer(first_layer));
        for _ in 1..page_count {
            let (page, layer) = document.add_page(width, height, "Content");
            layers.push(document.get_page(page).get_layer(layer));
        }

        for (page, layer) in self.pages.into_iter().zip(layers.iter()) {
            for op in page.ops {
                emit(layer, &fonts, op);
            }
        }

        let mut writer = BufWriter::new(Vec::new());
        document.save(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Io(err.into_error()))?;
        debug!("serialized {page_count} page(s) into {} bytes", bytes.len());
        Ok(bytes)
    }
}

fn color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

fn point(x: f64, y: f64) -> Point {
    Point {
        x: Pt(x),
        y: Pt(PAGE_HEIGHT - y),
    }
}

fn rect_outline(rect: &Rect) -> Vec<(Point, bool)> {
    vec![
        (point(rect.x, rect.y), false),
        (point(rect.x + rect.width, rect.y), false),
        (point(rect.x + rect.width, rect.y + rect.height), false),
        (point(rect.x, rect.y + rect.height), false),
    ]
}

/// Outline of a rounded rectangle; each corner is a cubic bezier whose two
/// handles are flagged on the preceding points.
fn rounded_outline(rect: &Rect, radius: f64) -> Vec<(Point, bool)> {
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = *rect;
    let r = radius;
    let k = radius * KAPPA;

    vec![
        (point(x + r, y), false),
        (point(x + w - r, y), true),
        (point(x + w - r + k, y), true),
        (point(x + w, y + r - k), false),
        (point(x + w, y + r), false),
        (point(x + w, y + h - r), true),
        (point(x + w, y + h - r + k), true),
        (point(x + w - r + k, y + h), false),
        (point(x + w - r, y + h), false),
        (point(x + r, y + h), true),
        (point(x + r - k, y + h), true),
        (point(x, y + h - r + k), false),
        (point(x, y + h - r), false),
        (point(x, y + r), true),
        (point(x, y + r - k), true),
        (point(x + r - k, y), false),
        (point(x + r, y), false),
    ]
}

fn shape(points: Vec<(Point, bool)>, fill: bool, stroke: bool) -> Line {
    Line {
        points,
        is_closed: true,
        has_fill: fill,
        has_stroke: stroke,
        is_clipping_path: false,
    }
}

fn emit(layer: &PdfLayerReference, fonts: &fonts::InstalledFonts, op: DrawOp) {
    match op {
        DrawOp::Rect { rect, fill, stroke } => {
            if let Some(fill) = fill {
                layer.set_fill_color(color(fill));
            }
            if let Some(stroke) = stroke {
                layer.set_outline_color(color(stroke));
                layer.set_outline_thickness(STROKE_WIDTH);
            }
            if fill.is_some() || stroke.is_some() {
                layer.add_shape(shape(rect_outline(&rect), fill.is_some(), stroke.is_some()));
            }
        }
        DrawOp::RoundedRect { rect, radius, fill } => {
            layer.set_fill_color(color(fill));
            layer.add_shape(shape(rounded_outline(&rect, radius), true, false));
        }
        DrawOp::Text {
            text,
            x,
            y,
            face,
            size,
            color: text_color,
        } => {
            if text.is_empty() {
                return;
            }
            let baseline = y + face.ascent(size);
            layer.set_fill_color(color(text_color));
            layer.use_text(
                text,
                size,
                Mm::from(Pt(x)),
                Mm::from(Pt(PAGE_HEIGHT - baseline)),
                fonts.get(face),
            );
        }
        DrawOp::Image { rect, pixels } => {
            let (px_width, px_height) = pixels.dimensions();
            if px_width == 0 || px_height == 0 {
                return;
            }
            let scale_x = rect.width / f64::from(px_width);
            let scale_y = rect.height / f64::from(px_height);
            // At 72 dpi one pixel maps to one point before scaling.
            Image::from_dynamic_image(&DynamicImage::ImageRgb8(pixels)).add_to_layer(
                layer.clone(),
                Some(Mm::from(Pt(rect.x))),
                Some(Mm::from(Pt(PAGE_HEIGHT - rect.y - rect.height))),
                None,
                Some(scale_x),
                Some(scale_y),
                Some(72.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{NAVY, WHITE};

    #[test]
    fn earlier_pages_stay_drawable() {
        let mut surface = PageSurface::new();
        let first = surface.add_page();
        let second = surface.add_page();
        assert_eq!((first, second), (0, 1));

        surface
            .draw_text(second, TextBox::new("late", 10.0, 10.0))
            .expect("draw on second page");
        surface
            .draw_text(first, TextBox::new("revisited", 10.0, 10.0))
            .expect("draw on first page");

        assert_eq!(surface.page_count(), 2);
        assert_eq!(surface.pages()[0].texts().collect::<Vec<_>>(), ["revisited"]);
        assert_eq!(surface.pages()[1].texts().collect::<Vec<_>>(), ["late"]);
    }

    #[test]
    fn drawing_past_the_last_page_fails() {
        let mut surface = PageSurface::new();
        surface.add_page();
        let err = surface
            .draw_rect(3, Rect::new(0.0, 0.0, 1.0, 1.0), Some(NAVY), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::PageOutOfRange { page: 3, count: 1 }
        ));
    }

    #[test]
    fn centered_text_is_offset_by_half_the_slack() {
        let mut surface = PageSurface::new();
        surface.add_page();
        let text = TextBox::new("N/A", 100.0, 20.0)
            .with_face(FontFace::Bold)
            .with_size(7.5)
            .with_color(WHITE)
            .centered_in(70.0);
        let expected = 100.0 + (70.0 - FontFace::Bold.text_width("N/A", 7.5)) / 2.0;
        surface.draw_text(0, text).expect("draw text");

        match &surface.pages()[0].ops()[0] {
            DrawOp::Text { x, .. } => assert!((x - expected).abs() < 1e-9),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn rounded_radius_is_clamped() {
        let mut surface = PageSurface::new();
        surface.add_page();
        surface
            .draw_rounded_rect(0, Rect::new(0.0, 0.0, 8.0, 4.0), 10.0, NAVY)
            .expect("draw pill");
        assert!(matches!(
            surface.pages()[0].ops()[0],
            DrawOp::RoundedRect { radius, .. } if radius == 2.0
        ));
    }

    #[test]
    fn finalize_writes_a_pdf_per_page() {
        let mut surface = PageSurface::new();
        for _ in 0..3 {
            let page = surface.add_page();
            surface
                .draw_rect(page, Rect::new(50.0, 50.0, 100.0, 20.0), Some(NAVY), None)
                .expect("draw rect");
        }
        surface
            .draw_image(1, Rect::new(50.0, 100.0, 115.0, 80.0), RgbImage::new(4, 3))
            .expect("draw image");

        let bytes = surface.finalize("Test").expect("finalize");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_surface_still_produces_a_document() {
        let bytes = PageSurface::new().finalize("Empty").expect("finalize");
        assert!(bytes.starts_with(b"%PDF"));
    }
}
