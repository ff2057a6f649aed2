//! Tracing configuration module for structured logging
//!
//! Library code only emits events through [`spans`] and [`events`]; the
//! binary installs a subscriber with [`TracingConfig::init`]. All output is
//! written to stderr so stdout carries only the report.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output without ANSI colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-3+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set output format
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom filter directives, e.g. `csscolors=debug,reqwest=info`
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",  // Default: failed fetches and worse
            1 => "info",  // -v: pipeline milestones
            2 => "debug", // -vv: every fetch and block
            _ => "trace", // -vvv+: skipped tokens
        }
    }

    /// Initialize tracing subscriber based on configuration
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };

        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .compact();

                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true);

                registry.with(fmt_layer).try_init()?;
            },
        }

        Ok(())
    }
}

/// Initialize tracing for the CLI: `format` output on stderr, filtered by
/// `env_filter` when given, otherwise by `verbosity`
#[cfg(feature = "cli")]
pub fn init_cli_tracing(
    verbosity: u8,
    format: TracingFormat,
    env_filter: Option<&str>,
) -> anyhow::Result<()> {
    let mut config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format);
    if let Some(filter) = env_filter {
        config = config.with_env_filter(filter);
    }
    config.init()
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span for the whole extraction of one page
    pub fn page_extraction(url: &str) -> Span {
        tracing::span!(Level::INFO, "page_extraction", url = %url)
    }

    /// Span for loading one linked stylesheet
    pub fn stylesheet_fetch(url: &str) -> Span {
        tracing::span!(Level::DEBUG, "stylesheet_fetch", url = %url)
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, info, warn};

    /// One attempt failed; more may follow
    pub fn fetch_attempt_failed(
        url: &str,
        attempt: u32,
        max_attempts: u32,
        error: &dyn std::error::Error,
    ) {
        debug!(
            url = %url,
            attempt = %attempt,
            max_attempts = %max_attempts,
            error = %error,
            "Fetch attempt failed"
        );
    }

    /// The fetcher gave up on `url`. This is the operator-visible diagnostic
    /// and is emitted exactly once per abandoned URL.
    pub fn fetch_failed(url: &str, attempts: u32, error: &dyn std::error::Error) {
        warn!(
            url = %url,
            attempts = %attempts,
            error = %error,
            "Giving up on {}", url
        );
    }

    /// CSS blocks gathered from one page
    pub fn blocks_collected(url: &str, inline: usize, external: usize) {
        info!(
            url = %url,
            inline = %inline,
            external = %external,
            "Collected CSS blocks"
        );
    }

    /// Colors tallied for one page
    pub fn colors_tallied(url: &str, distinct: usize, occurrences: usize, duration_ms: u128) {
        info!(
            url = %url,
            distinct = %distinct,
            occurrences = %occurrences,
            duration_ms = %duration_ms,
            "Tallied colors"
        );
    }
}
