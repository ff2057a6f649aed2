//! Error types for color extraction operations

use thiserror::Error;

/// Result type alias for color extraction operations
pub type Result<T> = std::result::Result<T, CssColorsError>;

/// Error types for color extraction operations
#[derive(Error, Debug)]
pub enum CssColorsError {
    /// A hex literal that does not carry at least three hex digits
    #[error("Malformed color: {0}")]
    MalformedColor(String),

    /// A bare word that is not in the color catalog
    #[error("Unknown color name: {0}")]
    UnknownColorName(String),

    /// Network, timeout or decode failure while fetching a document
    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL that could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Report serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CssColorsError {
    /// Create a new malformed color error
    pub fn malformed_color<S: Into<String>>(literal: S) -> Self {
        Self::MalformedColor(literal.into())
    }

    /// Create a new unknown color name error
    pub fn unknown_color_name<S: Into<String>>(name: S) -> Self {
        Self::UnknownColorName(name.into())
    }

    /// Create a fetch error for `url` from any displayable cause
    pub fn fetch_failure<U: std::fmt::Display, E: std::fmt::Display>(url: U, error: E) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Whether this error is one the pipeline recovers from locally
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownColorName(_) | Self::Fetch { .. } | Self::MalformedColor(_)
        )
    }
}
