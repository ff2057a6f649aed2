//! CSS Colors CLI Tool
//!
//! Command-line interface for listing the colors used by a web page's CSS.

use super::config::CliConfigBuilder;
use crate::extractor::ColorExtractor;
use crate::tracing_config::{init_cli_tracing, TracingFormat};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use tracing::{debug, info};
use url::Url;

/// List every color used by the CSS of a web page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "csscolors")]
pub struct Cli {
    /// Page to inspect
    #[arg(value_name = "URL", value_parser = Url::parse)]
    pub url: Url,

    /// Report ordering
    #[arg(short, long, value_enum, default_value_t = CliSortOrder::Occurrence)]
    pub sort_by: CliSortOrder,

    /// Render an HTML swatch table (same as --format html)
    #[arg(long)]
    pub html: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Text)]
    pub format: CliOutputFormat,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Attempts per URL, including the first
    #[arg(short, long, default_value_t = 2)]
    pub attempts: u32,

    /// User-Agent header [default: a desktop Firefox string]
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Tracing filter directives, overriding -v (e.g. "csscolors=debug")
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Diagnostics format on stderr
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliSortOrder {
    Rgb,
    Hsl,
    Hsv,
    Occurrence,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Text,
    Html,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored, human-readable
    Console,
    /// Plain, for CI logs
    Compact,
    /// One JSON object per event
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => Self::Console,
            CliLogFormat::Compact => Self::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => Self::Json,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(&cli).await
}

/// Run one extraction for already-parsed arguments
pub async fn run(cli: &Cli) -> Result<()> {
    init_tracing(cli).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    debug!(?config, "Configuration");

    let extractor = ColorExtractor::new(config).context("Failed to create extractor")?;
    let extraction = extractor.extract(&cli.url).await;
    info!(
        url = %cli.url,
        distinct = extraction.tally.len(),
        blocks = extraction.blocks,
        "Extraction finished"
    );

    let report = extractor
        .render(&extraction)
        .context("Failed to render report")?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(report.as_bytes())
        .context("Failed to write report")?;
    stdout.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn init_tracing(cli: &Cli) -> Result<()> {
    init_cli_tracing(
        cli.verbose,
        cli.log_format.into(),
        cli.log_filter.as_deref(),
    )
    .context("Failed to initialize tracing subscriber")?;

    debug!(verbosity = cli.verbose, format = ?cli.log_format, "Tracing initialized");
    Ok(())
}
