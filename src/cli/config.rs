//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputFormat, CliSortOrder};
use crate::config::{ExtractionConfig, OutputFormat, SortOrder};
use anyhow::{Context, Result};
use std::time::Duration;

/// Convert CLI arguments to an `ExtractionConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `ExtractionConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<ExtractionConfig> {
        let sort_order = match cli.sort_by {
            CliSortOrder::Rgb => SortOrder::Rgb,
            CliSortOrder::Hsl => SortOrder::Hsl,
            CliSortOrder::Hsv => SortOrder::Hsv,
            CliSortOrder::Occurrence => SortOrder::Occurrence,
        };

        // --html wins over --format
        let output_format = if cli.html {
            OutputFormat::Html
        } else {
            match cli.format {
                CliOutputFormat::Text => OutputFormat::Text,
                CliOutputFormat::Html => OutputFormat::Html,
                CliOutputFormat::Json => OutputFormat::Json,
            }
        };

        let mut builder = ExtractionConfig::builder()
            .sort_order(sort_order)
            .output_format(output_format)
            .timeout(Duration::from_secs(cli.timeout))
            .max_attempts(cli.attempts);
        if let Some(user_agent) = &cli.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        builder.build().context("Invalid configuration")
    }
}
