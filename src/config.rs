//! Configuration types for color extraction

use crate::error::{CssColorsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Browser-like user agent; some sites reject unidentified clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/116.0";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One try plus one retry
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Ordering of report entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending by (red, green, blue)
    Rgb,
    /// Ascending by (hue, saturation, lightness)
    Hsl,
    /// Ascending by (hue, saturation, value)
    Hsv,
    /// Descending by count, ties in order of first appearance
    #[default]
    Occurrence,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb => write!(f, "rgb"),
            Self::Hsl => write!(f, "hsl"),
            Self::Hsv => write!(f, "hsv"),
            Self::Occurrence => write!(f, "occurrence"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = CssColorsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "hsl" => Ok(Self::Hsl),
            "hsv" => Ok(Self::Hsv),
            "occurrence" => Ok(Self::Occurrence),
            other => Err(CssColorsError::invalid_config(format!(
                "Unknown sort order '{}'. Expected one of: rgb, hsl, hsv, occurrence",
                other
            ))),
        }
    }
}

/// Report rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `count<TAB>rgb(r, g, b)` lines
    #[default]
    Text,
    /// Standalone HTML page with a swatch table
    Html,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Html => write!(f, "html"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CssColorsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(CssColorsError::invalid_config(format!(
                "Unknown output format '{}'. Expected one of: text, html, json",
                other
            ))),
        }
    }
}

/// Settings for one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Ordering of the report
    pub sort_order: SortOrder,

    /// Report rendering
    pub output_format: OutputFormat,

    /// Per-request timeout; an attempt that exceeds it counts as failed
    pub timeout: Duration,

    /// Attempts per URL, including the first (minimum 1)
    pub max_attempts: u32,

    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            output_format: OutputFormat::default(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use csscolors::{ExtractionConfig, OutputFormat, SortOrder};
    ///
    /// let config = ExtractionConfig::builder()
    ///     .sort_order(SortOrder::Hsl)
    ///     .output_format(OutputFormat::Html)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.max_attempts, 2);
    /// ```
    #[must_use]
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - `max_attempts` is zero
    /// - `timeout` is zero
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(CssColorsError::config_value_error(
                "max attempts",
                self.max_attempts,
                ">= 1",
                Some(DEFAULT_MAX_ATTEMPTS),
            ));
        }

        if self.timeout.is_zero() {
            return Err(CssColorsError::config_value_error(
                "timeout (ms)",
                self.timeout.as_millis(),
                "> 0",
                Some(DEFAULT_TIMEOUT.as_millis()),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(CssColorsError::invalid_config("User agent cannot be empty"));
        }

        Ok(())
    }
}

/// Builder for `ExtractionConfig`
#[derive(Debug, Default)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    #[must_use]
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.config.sort_order = order;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any rule checked by [`ExtractionConfig::validate`]
    pub fn build(self) -> Result<ExtractionConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
