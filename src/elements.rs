//! Compound report elements drawn on top of the [`PageSurface`] primitives.
//!
//! This module holds the helpers for decoding photo data and turning it into
//! cover-fit thumbnails, plus the small composite pieces of the template that
//! are drawn in more than one place: status pills and captioned photo cells.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, RgbImage};

use crate::error::ReportError;
use crate::fonts::FontFace;
use crate::layout::{THUMB_HEIGHT, THUMB_WIDTH};
use crate::style::{Rgb, SLATE_100, SLATE_200, SLATE_400, SLATE_800, WHITE};
use crate::surface::{PageSurface, Rect, TextBox};

/// Pixels per point used when rasterizing thumbnails.
const THUMBNAIL_OVERSAMPLING: f64 = 3.0;
const CAPTION_HEIGHT: f64 = 11.0;
const CAPTION_SIZE: f64 = 6.5;
const PLACEHOLDER_TEXT: &str = "Image unavailable";
const PLACEHOLDER_SIZE: f64 = 7.0;

/// Loads an image from in-memory bytes using the [`image`] crate.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes.as_ref())
}

/// Scales and center-crops `image` so that it covers a `width` × `height`
/// point box without distortion.
///
/// The result is rasterized slightly above screen resolution so thumbnails
/// stay sharp when the report is zoomed.
pub fn cover_fit_thumbnail(image: &DynamicImage, width: f64, height: f64) -> RgbImage {
    let target_width = (width * THUMBNAIL_OVERSAMPLING).round().max(1.0) as u32;
    let target_height = (height * THUMBNAIL_OVERSAMPLING).round().max(1.0) as u32;

    let (px_width, px_height) = image.dimensions();
    if px_width == 0 || px_height == 0 {
        return RgbImage::new(target_width, target_height);
    }

    image
        .resize_to_fill(target_width, target_height, FilterType::Triangle)
        .to_rgb8()
}

/// Decodes photo bytes straight into a report thumbnail.
pub fn thumbnail_from_bytes(bytes: impl AsRef<[u8]>) -> Result<RgbImage, ImageError> {
    let image = decode_image_from_bytes(bytes)?;
    Ok(cover_fit_thumbnail(&image, THUMB_WIDTH, THUMB_HEIGHT))
}

/// A rounded, colored label with centered white text.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusPill {
    label: String,
    color: Rgb,
    rect: Rect,
    radius: f64,
    text_size: f64,
    text_offset: f64,
}

impl StatusPill {
    /// Creates a pill occupying `rect`.
    pub fn new(label: impl Into<String>, color: Rgb, rect: Rect) -> Self {
        Self {
            label: label.into(),
            color,
            rect,
            radius: 3.0,
            text_size: 7.5,
            text_offset: 4.0,
        }
    }

    /// Sets the corner radius and returns the updated pill.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the label size and returns the updated pill.
    pub fn with_text_size(mut self, size: f64) -> Self {
        self.text_size = size;
        self
    }

    /// Sets the distance from the top of the pill to the top of its label.
    pub fn with_text_offset(mut self, offset: f64) -> Self {
        self.text_offset = offset;
        self
    }

    pub fn draw(self, surface: &mut PageSurface, page: usize) -> Result<(), ReportError> {
        surface.draw_rounded_rect(page, self.rect, self.radius, self.color)?;
        surface.draw_text(
            page,
            TextBox::new(self.label, self.rect.x, self.rect.y + self.text_offset)
                .with_face(FontFace::Bold)
                .with_size(self.text_size)
                .with_color(WHITE)
                .centered_in(self.rect.width),
        )
    }
}

/// One cell of a photo grid: the thumbnail (or a placeholder) and its caption.
#[derive(Clone, Debug)]
pub struct PhotoCell<'a> {
    x: f64,
    y: f64,
    photo: Option<&'a RgbImage>,
    number: usize,
}

impl<'a> PhotoCell<'a> {
    /// Creates a cell at `(x, y)` showing `photo`, or a placeholder when it is `None`.
    pub fn new(x: f64, y: f64, photo: Option<&'a RgbImage>, number: usize) -> Self {
        Self {
            x,
            y,
            photo,
            number,
        }
    }

    /// The thumbnail box of this cell.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, THUMB_WIDTH, THUMB_HEIGHT)
    }

    pub fn draw(self, surface: &mut PageSurface, page: usize) -> Result<(), ReportError> {
        let rect = self.rect();
        match self.photo {
            Some(pixels) => {
                surface.draw_image(page, rect, pixels.clone())?;
                surface.draw_rect(page, rect, None, Some(SLATE_200))?;
            }
            None => {
                surface.draw_rect(page, rect, Some(SLATE_100), Some(SLATE_200))?;
                surface.draw_text(
                    page,
                    TextBox::new(PLACEHOLDER_TEXT, rect.x, rect.y + rect.height / 2.0 - 5.0)
                        .with_size(PLACEHOLDER_SIZE)
                        .with_color(SLATE_400)
                        .centered_in(rect.width),
                )?;
            }
        }

        let strip = Rect::new(
            rect.x,
            rect.y + rect.height - CAPTION_HEIGHT,
            rect.width,
            CAPTION_HEIGHT,
        );
        surface.draw_rect(page, strip, Some(SLATE_800), None)?;
        surface.draw_text(
            page,
            TextBox::new(format!("Photo {}", self.number), strip.x + 4.0, strip.y + 2.5)
                .with_size(CAPTION_SIZE)
                .with_color(WHITE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawOp;
    use image::{ImageOutputFormat, Rgb as Pixel};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Pixel([200, 40, 40]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn thumbnails_cover_the_cell() {
        let tall = thumbnail_from_bytes(png_bytes(20, 90)).expect("decode tall");
        let wide = thumbnail_from_bytes(png_bytes(400, 10)).expect("decode wide");
        assert_eq!(tall.dimensions(), (345, 240));
        assert_eq!(wide.dimensions(), (345, 240));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(thumbnail_from_bytes(b"not an image").is_err());
    }

    #[test]
    fn placeholder_cell_has_no_image() {
        let mut surface = PageSurface::new();
        surface.add_page();
        PhotoCell::new(50.0, 100.0, None, 7)
            .draw(&mut surface, 0)
            .expect("draw cell");

        let page = &surface.pages()[0];
        assert_eq!(page.images().count(), 0);
        assert_eq!(
            page.texts().collect::<Vec<_>>(),
            ["Image unavailable", "Photo 7"]
        );
        assert!(matches!(
            page.ops()[0],
            DrawOp::Rect { fill: Some(SLATE_100), .. }
        ));
    }

    #[test]
    fn photo_cell_embeds_the_thumbnail() {
        let pixels = RgbImage::new(3, 2);
        let mut surface = PageSurface::new();
        surface.add_page();
        PhotoCell::new(173.0, 60.0, Some(&pixels), 1)
            .draw(&mut surface, 0)
            .expect("draw cell");

        let page = &surface.pages()[0];
        assert_eq!(
            page.images().collect::<Vec<_>>(),
            [&Rect::new(173.0, 60.0, 115.0, 80.0)]
        );
        assert_eq!(page.texts().collect::<Vec<_>>(), ["Photo 1"]);
    }
}
