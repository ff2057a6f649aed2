//! Canonical RGB color value and its derived representations
//!
//! Every literal found in CSS, however it was spelled, ends up as one
//! [`ColorValue`]. Equality is defined by the channel triple alone, so
//! `#fff`, `#ffffff` and `white` are the same value.

use crate::catalog::ColorCatalog;
use crate::error::{CssColorsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit-per-channel RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorValue {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl ColorValue {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse a hex literal with or without the leading `#`.
    ///
    /// Six or more leading hex digits are read as `rrggbb` and anything after
    /// them (an alpha pair, for instance) is ignored. Three to five digits
    /// are read as the `rgb` shorthand, each nibble duplicated.
    ///
    /// # Errors
    /// - `MalformedColor` when fewer than three hex digits lead the literal
    pub fn from_hex(literal: &str) -> Result<Self> {
        let digits = literal.strip_prefix('#').unwrap_or(literal);
        let run = digits
            .bytes()
            .take_while(u8::is_ascii_hexdigit)
            .map(hex_nibble)
            .collect::<Vec<u8>>();

        match run.as_slice() {
            [r1, r2, g1, g2, b1, b2, ..] => Ok(Self::new(
                (r1 << 4) | r2,
                (g1 << 4) | g2,
                (b1 << 4) | b2,
            )),
            [r, g, b, ..] => Ok(Self::new(r * 17, g * 17, b * 17)),
            _ => Err(CssColorsError::malformed_color(literal)),
        }
    }

    /// Case-insensitive lookup in the global [`ColorCatalog`]
    ///
    /// # Errors
    /// - `UnknownColorName` when the catalog has no such name
    pub fn from_name(name: &str) -> Result<Self> {
        ColorCatalog::global()
            .lookup(name)
            .ok_or_else(|| CssColorsError::unknown_color_name(name))
    }

    /// Lower-case `#rrggbb`
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// `rgb(r, g, b)`
    #[must_use]
    pub fn to_rgb_string(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    /// Canonical catalog name, if this triple has one
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        ColorCatalog::global().name_of(*self)
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.name().is_some()
    }

    #[must_use]
    pub fn to_hsl(&self) -> Hsl {
        let (max, min) = self.extremes();
        let value = f64::from(max) / 255.0;
        let xmin = f64::from(min) / 255.0;
        let chroma = value - xmin;
        let lightness = (value + xmin) / 2.0;

        // Zero chroma covers lightness 0 and 1, where the divisor vanishes.
        let saturation = if max == min {
            0.0
        } else {
            chroma / (1.0 - (2.0 * lightness - 1.0).abs())
        };

        Hsl {
            hue: self.hue(max, min),
            saturation,
            lightness,
        }
    }

    #[must_use]
    pub fn to_hsv(&self) -> Hsv {
        let (max, min) = self.extremes();
        let value = f64::from(max) / 255.0;
        let saturation = if max == 0 {
            0.0
        } else {
            (value - f64::from(min) / 255.0) / value
        };

        Hsv {
            hue: self.hue(max, min),
            saturation,
            value,
        }
    }

    /// Black or white, whichever reads better on top of this color.
    ///
    /// Uses the cheap weighting `2r + 7g + b` against the midpoint `5 * 255`.
    #[must_use]
    pub fn bw_contrast(&self) -> Self {
        let luminance =
            2 * u32::from(self.red) + 7 * u32::from(self.green) + u32::from(self.blue);
        if luminance < 5 * 255 {
            Self::WHITE
        } else {
            Self::BLACK
        }
    }

    fn extremes(&self) -> (u8, u8) {
        let max = self.red.max(self.green).max(self.blue);
        let min = self.red.min(self.green).min(self.blue);
        (max, min)
    }

    /// Six-sector hue in degrees. Ties for the maximum resolve red, green, blue.
    fn hue(&self, max: u8, min: u8) -> f64 {
        if max == min {
            return 0.0;
        }

        let r = f64::from(self.red) / 255.0;
        let g = f64::from(self.green) / 255.0;
        let b = f64::from(self.blue) / 255.0;
        let chroma = (f64::from(max) - f64::from(min)) / 255.0;

        let sector = if max == self.red {
            ((g - b) / chroma).rem_euclid(6.0)
        } else if max == self.green {
            (b - r) / chroma + 2.0
        } else {
            (r - g) / chroma + 4.0
        };

        sector * 60.0
    }
}

fn hex_nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl FromStr for ColorValue {
    type Err = CssColorsError;

    /// Accepts `#hex` literals and catalog names
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            Self::from_hex(s)
        } else {
            Self::from_name(s)
        }
    }
}

impl From<(u8, u8, u8)> for ColorValue {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}
