//! Font handling for the survey report.
//!
//! The report only uses the PDF base-14 Helvetica faces, so nothing has to be
//! embedded or loaded from disk.  Since the base fonts carry no metrics inside
//! the PDF, the advance widths from the Adobe AFM files are kept here to
//! measure, align and wrap text during layout.

use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};

/// Name of the font family used throughout the report.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Helvetica";

/// Ascender of Helvetica in font units (1/1000 em).
const ASCENDER: f64 = 718.0;

/// Width used for characters outside the printable ASCII range.
const FALLBACK_WIDTH: u16 = 556;

/// Advance widths for the characters `' '..='~'` in Helvetica.
const REGULAR_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Advance widths for the characters `' '..='~'` in Helvetica-Bold.
const BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// The font faces used by the report template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
        }
    }

    fn char_width(self, c: char) -> u16 {
        let table = match self {
            Self::Regular => &REGULAR_WIDTHS,
            Self::Bold => &BOLD_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - ' ' as usize],
            '\u{2014}' => 1000,
            '\u{2022}' => 350,
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width of `text` in points when set at `size`.
    pub fn text_width(self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        f64::from(units) * size / 1000.0
    }

    /// Distance from the top of a text line to its baseline at `size`.
    pub fn ascent(self, size: f64) -> f64 {
        ASCENDER * size / 1000.0
    }
}

/// Breaks `text` into lines no wider than `max_width` points.
///
/// Words are split on whitespace and explicit newlines are honored.  A single
/// word wider than the line is broken between characters.  Empty input yields
/// one empty line so callers always get at least one line to print.
pub fn wrap_text(text: &str, face: FontFace, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if face.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if face.text_width(word, size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if face.text_width(&current, size) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::replace(&mut current, c.to_string()));
                    }
                }
            }
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Font references registered on a printpdf document.
pub struct InstalledFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl InstalledFonts {
    /// Returns the document font for `face`.
    pub fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
        }
    }
}

/// Adds the report font faces to the given document and returns the references.
pub fn install_default_fonts(
    document: &PdfDocumentReference,
) -> Result<InstalledFonts, printpdf::Error> {
    Ok(InstalledFonts {
        regular: document.add_builtin_font(FontFace::Regular.builtin())?,
        bold: document.add_builtin_font(FontFace::Bold.builtin())?,
    })
}
