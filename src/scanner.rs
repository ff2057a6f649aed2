//! Recognizer for color literals in raw CSS text
//!
//! Only two literal forms are recognized, both right after the property
//! keyword `color:` (so `background-color:` and `border-color:` match too):
//!
//! - `#` followed by 3 to 6 hex digits
//! - a bare alphabetic word of 3 to 20 letters that names a catalog color
//!
//! Words that are not color names (`inherit`, `currentColor`, ...) are
//! skipped silently. Functional notations such as `rgb()` are not matched.

use crate::color::ColorValue;
use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;

/// `color:` then optional whitespace then either literal form. The two
/// alternatives start with disjoint character classes, so one property can
/// never produce two matches.
static COLOR_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"color:\s*(?:#(?P<hex>[0-9A-Fa-f]{3,6})|(?P<name>[A-Za-z]{3,20}))")
        .expect("color literal pattern is valid")
});

/// A scan over one CSS block
///
/// The scanner borrows the text and can be iterated any number of times;
/// each call to [`ColorScanner::iter`] restarts from the beginning.
#[derive(Debug, Clone, Copy)]
pub struct ColorScanner<'a> {
    css: &'a str,
}

impl<'a> ColorScanner<'a> {
    #[must_use]
    pub fn new(css: &'a str) -> Self {
        Self { css }
    }

    /// Colors in order of appearance; duplicates are yielded every time.
    #[must_use]
    pub fn iter(&self) -> ColorIter<'a> {
        ColorIter {
            captures: COLOR_LITERAL_RE.captures_iter(self.css),
        }
    }
}

impl<'a> IntoIterator for ColorScanner<'a> {
    type Item = ColorValue;
    type IntoIter = ColorIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &ColorScanner<'a> {
    type Item = ColorValue;
    type IntoIter = ColorIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator returned by [`ColorScanner::iter`]
#[derive(Debug)]
pub struct ColorIter<'a> {
    captures: CaptureMatches<'static, 'a>,
}

impl Iterator for ColorIter<'_> {
    type Item = ColorValue;

    fn next(&mut self) -> Option<ColorValue> {
        for caps in self.captures.by_ref() {
            if let Some(hex) = caps.name("hex") {
                match ColorValue::from_hex(hex.as_str()) {
                    Ok(color) => return Some(color),
                    Err(e) => tracing::trace!(error = %e, "Skipping hex literal"),
                }
            } else if let Some(name) = caps.name("name") {
                match ColorValue::from_name(name.as_str()) {
                    Ok(color) => return Some(color),
                    Err(e) => tracing::trace!(error = %e, "Skipping non-color keyword"),
                }
            }
        }
        None
    }
}

/// Convenience for `ColorScanner::new(css).iter()`
#[must_use]
pub fn scan(css: &str) -> ColorIter<'_> {
    ColorScanner::new(css).iter()
}
