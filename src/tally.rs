//! Occurrence counting and report orderings

use crate::collector::CssBlock;
use crate::color::ColorValue;
use crate::config::SortOrder;
use crate::scanner::ColorScanner;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A distinct color and how often it occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub color: ColorValue,
    pub count: usize,
}

/// Occurrence counts for one run, remembering first-appearance order
#[derive(Debug, Clone, Default)]
pub struct ColorTally {
    entries: Vec<TallyEntry>,
    index: HashMap<ColorValue, usize>,
}

impl ColorTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every color found in `blocks`
    #[must_use]
    pub fn from_blocks(blocks: &[CssBlock]) -> Self {
        let mut tally = Self::new();
        for block in blocks {
            tally.add_css(&block.text);
        }
        tally
    }

    pub fn record(&mut self, color: ColorValue) {
        match self.index.get(&color) {
            Some(&position) => {
                if let Some(entry) = self.entries.get_mut(position) {
                    entry.count += 1;
                }
            },
            None => {
                self.index.insert(color, self.entries.len());
                self.entries.push(TallyEntry { color, count: 1 });
            },
        }
    }

    /// Scan one CSS block and record what it yields
    pub fn add_css(&mut self, css: &str) {
        for color in ColorScanner::new(css) {
            self.record(color);
        }
    }

    #[must_use]
    pub fn count(&self, color: ColorValue) -> usize {
        self.index
            .get(&color)
            .and_then(|&position| self.entries.get(position))
            .map_or(0, |entry| entry.count)
    }

    /// Number of distinct colors
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    #[must_use]
    pub fn total_occurrences(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    /// Entries in first-appearance order
    #[must_use]
    pub fn entries(&self) -> &[TallyEntry] {
        &self.entries
    }

    /// Entries in the requested order. Every order is total: float keys are
    /// compared with `total_cmp` and fall back to the channel triple.
    #[must_use]
    pub fn sorted(&self, order: SortOrder) -> Vec<TallyEntry> {
        let mut entries = self.entries.clone();
        match order {
            SortOrder::Rgb => entries.sort_by_key(|entry| entry.color),
            SortOrder::Hsl => entries.sort_by(|a, b| compare_hsl(a.color, b.color)),
            SortOrder::Hsv => entries.sort_by(|a, b| compare_hsv(a.color, b.color)),
            // stable: equal counts keep first-appearance order
            SortOrder::Occurrence => entries.sort_by(|a, b| b.count.cmp(&a.count)),
        }
        entries
    }
}

impl Extend<ColorValue> for ColorTally {
    fn extend<I: IntoIterator<Item = ColorValue>>(&mut self, iter: I) {
        for color in iter {
            self.record(color);
        }
    }
}

impl FromIterator<ColorValue> for ColorTally {
    fn from_iter<I: IntoIterator<Item = ColorValue>>(iter: I) -> Self {
        let mut tally = Self::new();
        tally.extend(iter);
        tally
    }
}

fn compare_hsl(a: ColorValue, b: ColorValue) -> Ordering {
    let (x, y) = (a.to_hsl(), b.to_hsl());
    x.hue
        .total_cmp(&y.hue)
        .then(x.saturation.total_cmp(&y.saturation))
        .then(x.lightness.total_cmp(&y.lightness))
        .then(a.cmp(&b))
}

fn compare_hsv(a: ColorValue, b: ColorValue) -> Ordering {
    let (x, y) = (a.to_hsv(), b.to_hsv());
    x.hue
        .total_cmp(&y.hue)
        .then(x.saturation.total_cmp(&y.saturation))
        .then(x.value.total_cmp(&y.value))
        .then(a.cmp(&b))
}
