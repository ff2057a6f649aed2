//! Report rendering service
//!
//! Turns an ordered list of [`TallyEntry`] values into one of the
//! [`OutputFormat`]s. Nothing here touches the network or the tally itself.

use crate::color::ColorValue;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::tally::TallyEntry;
use serde::Serialize;
use std::fmt::Write as _;

/// Service for rendering color reports
pub struct ReportFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    colors: Vec<JsonColor>,
}

#[derive(Serialize)]
struct JsonColor {
    count: usize,
    hex: String,
    rgb: [u8; 3],
    name: Option<&'static str>,
    hsl: [f64; 3],
}

impl From<&TallyEntry> for JsonColor {
    fn from(entry: &TallyEntry) -> Self {
        let color = entry.color;
        let hsl = color.to_hsl();
        Self {
            count: entry.count,
            hex: color.to_hex_string(),
            rgb: [color.red, color.green, color.blue],
            name: color.name(),
            hsl: [hsl.hue, hsl.saturation, hsl.lightness],
        }
    }
}

impl ReportFormatter {
    /// Render `entries` (already in report order) for `source`
    ///
    /// # Errors
    /// - `Serialization` if the JSON encoder fails
    ///
    /// # Examples
    /// ```rust
    /// use csscolors::{ColorValue, OutputFormat, TallyEntry, ReportFormatter};
    ///
    /// let entries = [TallyEntry { color: ColorValue::new(255, 0, 0), count: 3 }];
    /// let text = ReportFormatter::render(&entries, "https://example.com/", OutputFormat::Text)?;
    /// assert_eq!(text, "3\trgb(255, 0, 0)\n");
    /// # Ok::<(), csscolors::CssColorsError>(())
    /// ```
    pub fn render(entries: &[TallyEntry], source: &str, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(Self::render_text(entries)),
            OutputFormat::Html => Ok(Self::render_html(entries, source)),
            OutputFormat::Json => Self::render_json(entries, source),
        }
    }

    /// One `count<TAB>rgb(r, g, b)` line per entry
    #[must_use]
    pub fn render_text(entries: &[TallyEntry]) -> String {
        let mut out = String::new();
        for entry in entries {
            let _ = writeln!(out, "{}\t{}", entry.count, entry.color.to_rgb_string());
        }
        out
    }

    /// Standalone HTML page with one swatch table titled by `source`
    #[must_use]
    pub fn render_html(entries: &[TallyEntry], source: &str) -> String {
        let title = escape_html(source);
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{title}</title>");
        out.push_str("</head>\n<body>\n<table>\n");
        out.push_str("<tr><th>Count</th><th>Color</th><th>RGB</th></tr>\n");

        for entry in entries {
            let color = entry.color;
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td style=\"background-color: {}; color: {}\">{}</td><td>{}</td></tr>",
                entry.count,
                color.to_hex_string(),
                color.bw_contrast().to_hex_string(),
                swatch_label(color),
                color.to_rgb_string(),
            );
        }

        out.push_str("</table>\n</body>\n</html>\n");
        out
    }

    /// JSON document `{ "source": ..., "colors": [...] }`
    pub fn render_json(entries: &[TallyEntry], source: &str) -> Result<String> {
        let report = JsonReport {
            source,
            colors: entries.iter().map(JsonColor::from).collect(),
        };
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        Ok(json)
    }
}

fn swatch_label(color: ColorValue) -> String {
    match color.name() {
        Some(name) => format!("{} [{}]", color.to_hex_string(), name),
        None => color.to_hex_string(),
    }
}

/// Escape the five HTML-significant characters
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
