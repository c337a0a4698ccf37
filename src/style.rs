//! Fixed palette and status styling used by the report template.

use crate::model::{ItemStatus, SurveyStatus};

/// An sRGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Returns the channels scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

pub const NAVY: Rgb = Rgb::hex(0x0f172a);
pub const SKY: Rgb = Rgb::hex(0x38bdf8);
pub const WHITE: Rgb = Rgb::hex(0xffffff);
pub const SLATE_50: Rgb = Rgb::hex(0xf8fafc);
pub const SLATE_100: Rgb = Rgb::hex(0xf1f5f9);
pub const SLATE_200: Rgb = Rgb::hex(0xe2e8f0);
pub const SLATE_400: Rgb = Rgb::hex(0x94a3b8);
pub const SLATE_500: Rgb = Rgb::hex(0x64748b);
pub const SLATE_600: Rgb = Rgb::hex(0x475569);
pub const SLATE_700: Rgb = Rgb::hex(0x334155);
pub const SLATE_800: Rgb = Rgb::hex(0x1e293b);

pub const STATUS_GREEN: Rgb = Rgb::new(34, 197, 94);
pub const STATUS_AMBER: Rgb = Rgb::new(245, 158, 11);
pub const STATUS_SLATE: Rgb = Rgb::new(148, 163, 184);

/// How an item status is presented in the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub color: Rgb,
}

impl ItemStatus {
    /// Returns the pill label and color for this status.
    pub fn style(self) -> StatusStyle {
        match self {
            Self::Good => StatusStyle {
                label: "Good",
                color: STATUS_GREEN,
            },
            Self::NeedAction => StatusStyle {
                label: "Need Action",
                color: STATUS_AMBER,
            },
            Self::NotApplicable | Self::Unset => StatusStyle {
                label: "N/A",
                color: STATUS_SLATE,
            },
        }
    }
}

impl SurveyStatus {
    /// Returns the badge color for this survey status.
    pub fn badge_color(self) -> Rgb {
        match self {
            Self::Completed => STATUS_GREEN,
            Self::Draft => STATUS_AMBER,
        }
    }
}

/// Entries shown in the color legend, in display order.
pub fn legend_entries() -> [StatusStyle; 3] {
    [
        ItemStatus::Good.style(),
        ItemStatus::NeedAction.style(),
        ItemStatus::NotApplicable.style(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_matches_not_applicable() {
        assert_eq!(ItemStatus::Unset.style(), ItemStatus::NotApplicable.style());
        assert_eq!(ItemStatus::Unset.style().label, "N/A");
    }

    #[test]
    fn hex_literals_split_channels() {
        assert_eq!(NAVY, Rgb::new(15, 23, 42));
        assert_eq!(SKY.to_unit().2, 248.0 / 255.0);
    }
}
