//! End-to-end color extraction for one page
//!
//! Fetch the page, collect its CSS blocks, tally the colors they contain.
//! A page that cannot be fetched is not an error: it produces an
//! [`Extraction`] with an empty tally.

use crate::collector::StyleCollector;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::fetch::{origin_referer, Fetcher, Transport};
use crate::services::ReportFormatter;
use crate::tally::{ColorTally, TallyEntry};
use crate::tracing_config::{events, spans};
use std::time::Instant;
use tracing::Instrument;
use url::Url;

/// Outcome of extracting one page
#[derive(Debug, Clone)]
pub struct Extraction {
    /// URL that was requested
    pub source_url: Url,
    /// Location after redirects, `None` if the page fetch failed
    pub final_url: Option<Url>,
    /// Number of CSS blocks that were scanned
    pub blocks: usize,
    pub tally: ColorTally,
}

impl Extraction {
    /// Base URL used for resolving stylesheet links
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.final_url.as_ref().unwrap_or(&self.source_url)
    }
}

/// Runs the fetch, collect, scan and tally pipeline
#[derive(Debug)]
pub struct ColorExtractor {
    fetcher: Fetcher,
    config: ExtractionConfig,
}

impl ColorExtractor {
    /// Create an extractor that talks HTTP through `reqwest`
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { fetcher, config })
    }

    /// Create an extractor on top of a custom transport
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn with_transport(config: ExtractionConfig, transport: Box<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::with_transport(transport, config.max_attempts);
        Ok(Self { fetcher, config })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract and tally every color referenced by the CSS of `url`
    pub async fn extract(&self, url: &Url) -> Extraction {
        let span = spans::page_extraction(url.as_str());
        self.extract_inner(url).instrument(span).await
    }

    async fn extract_inner(&self, url: &Url) -> Extraction {
        let start = Instant::now();
        let referer = origin_referer(url);
        let page = self.fetcher.fetch(url, Some(&referer)).await;

        let base_url = page.final_url.clone().unwrap_or_else(|| url.clone());
        let blocks = StyleCollector::collect(&self.fetcher, &page.body, &base_url).await;
        let tally = ColorTally::from_blocks(&blocks);

        events::colors_tallied(
            url.as_str(),
            tally.len(),
            tally.total_occurrences(),
            start.elapsed().as_millis(),
        );

        Extraction {
            source_url: url.clone(),
            final_url: page.final_url,
            blocks: blocks.len(),
            tally,
        }
    }

    /// Tally entries of `extraction` in the configured order
    #[must_use]
    pub fn ordered(&self, extraction: &Extraction) -> Vec<TallyEntry> {
        extraction.tally.sorted(self.config.sort_order)
    }

    /// Render `extraction` in the configured order and format
    ///
    /// # Errors
    /// - `Serialization` if JSON rendering fails
    pub fn render(&self, extraction: &Extraction) -> Result<String> {
        ReportFormatter::render(
            &self.ordered(extraction),
            extraction.source_url.as_str(),
            self.config.output_format,
        )
    }
}
