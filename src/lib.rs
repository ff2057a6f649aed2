#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

//! # csscolors
//!
//! Discover every color referenced by the CSS of a web page.
//!
//! Given a URL, the page is fetched and every block of CSS reachable from it
//! is gathered: `style="..."` attributes, `<style>` elements and linked
//! stylesheets. Each `color:` declaration written as a hex literal or a
//! named color is normalized to one [`ColorValue`], occurrences are counted,
//! and the result is ordered and rendered as text, HTML or JSON.
//!
//! ## Features
//!
//! - **Normalization**: `#f00`, `#FF0000` and `red` all count as one color
//! - **Orderings**: by channel value, by HSL, by HSV or by frequency
//! - **Resilient fetching**: retries, timeouts and redirects; an unreachable
//!   stylesheet contributes nothing instead of failing the run
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use csscolors::{ColorExtractor, ExtractionConfig, SortOrder};
//! use url::Url;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ExtractionConfig::builder()
//!     .sort_order(SortOrder::Hsl)
//!     .build()?;
//! let extractor = ColorExtractor::new(config)?;
//!
//! let url = Url::parse("https://www.rust-lang.org/")?;
//! let extraction = extractor.extract(&url).await;
//! print!("{}", extractor.render(&extraction)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Working without the network
//!
//! The scanning and tallying stages are plain functions over strings:
//!
//! ```rust
//! use csscolors::{ColorTally, ColorValue, SortOrder};
//!
//! let mut tally = ColorTally::new();
//! tally.add_css("a { color: #f00 } b { color: red } c { color: navy }");
//!
//! let ordered = tally.sorted(SortOrder::Occurrence);
//! assert_eq!(ordered[0].color, ColorValue::new(255, 0, 0));
//! assert_eq!(ordered[0].count, 2);
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface and tracing subscriber setup
//! - `tracing-json`: JSON formatted diagnostics
//!
//! To use only as a library without CLI dependencies:
//!
//! ```toml
//! [dependencies]
//! csscolors = { version = "0.1", default-features = false }
//! ```

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod collector;
pub mod color;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod scanner;
pub mod services;
pub mod tally;
pub mod tracing_config;

// Public API exports
pub use catalog::{ColorCatalog, NAMED_COLORS};
pub use collector::{tag_events, CssBlock, CssSource, StyleCollector, TagEvent};
pub use color::{ColorValue, Hsl, Hsv};
pub use config::{ExtractionConfig, ExtractionConfigBuilder, OutputFormat, SortOrder};
pub use error::{CssColorsError, Result};
pub use extractor::{ColorExtractor, Extraction};
pub use fetch::{origin_referer, FetchedDocument, Fetcher, ReqwestTransport, Transport};
pub use scanner::{scan, ColorScanner};
pub use services::ReportFormatter;
pub use tally::{ColorTally, TallyEntry};
pub use tracing_config::{events, spans, TracingConfig, TracingFormat};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;

use url::Url;

/// Extract the colors of the page at `url` with `config`
///
/// Convenience wrapper that builds a [`ColorExtractor`] for a single page.
///
/// # Examples
/// ```rust,no_run
/// use csscolors::{extract_colors, ExtractionConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let extraction = extract_colors("https://example.com/", ExtractionConfig::default()).await?;
/// println!("{} distinct colors", extraction.tally.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_colors(url: &str, config: ExtractionConfig) -> Result<Extraction> {
    let url = Url::parse(url)?;
    let extractor = ColorExtractor::new(config)?;
    Ok(extractor.extract(&url).await)
}

/// Extract the colors of the page at `url` and render the report
///
/// # Examples
/// ```rust,no_run
/// use csscolors::{colors_report, ExtractionConfig, OutputFormat};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ExtractionConfig::builder()
///     .output_format(OutputFormat::Json)
///     .build()?;
/// println!("{}", colors_report("https://example.com/", config).await?);
/// # Ok(())
/// # }
/// ```
pub async fn colors_report(url: &str, config: ExtractionConfig) -> Result<String> {
    let url = Url::parse(url)?;
    let extractor = ColorExtractor::new(config)?;
    let extraction = extractor.extract(&url).await;
    extractor.render(&extraction)
}

/// Tally the colors of CSS text already in memory, in `order`
///
/// # Examples
/// ```rust
/// use csscolors::{tally_css, ColorValue, SortOrder};
///
/// let entries = tally_css(["p { color: white }", "q { color: #000 }"], SortOrder::Rgb);
/// assert_eq!(entries[0].color, ColorValue::BLACK);
/// assert_eq!(entries[1].color, ColorValue::WHITE);
/// ```
pub fn tally_css<'a, I>(blocks: I, order: SortOrder) -> Vec<TallyEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tally = ColorTally::new();
    for css in blocks {
        tally.add_css(css);
    }
    tally.sorted(order)
}
