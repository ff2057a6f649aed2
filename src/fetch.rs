//! HTTP retrieval of pages and stylesheets
//!
//! [`Fetcher`] wraps a [`Transport`] with the retry policy: a bounded
//! number of immediate attempts, each limited by the transport's timeout.
//! A URL that cannot be fetched is not an error for the caller; it yields
//! an empty [`FetchedDocument`] and one warning on the diagnostics channel.

use crate::config::ExtractionConfig;
use crate::error::{CssColorsError, Result};
use crate::tracing_config::events;
use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::{redirect, Client};
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Body and post-redirect location of a fetched document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedDocument {
    pub body: String,
    /// `None` when the fetch failed
    pub final_url: Option<Url>,
}

impl FetchedDocument {
    #[must_use]
    pub fn new(body: String, final_url: Url) -> Self {
        Self {
            body,
            final_url: Some(final_url),
        }
    }

    /// The result of a fetch that was given up on
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// One GET attempt against the network
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single GET, following redirects.
    ///
    /// # Errors
    /// - `Fetch` on transport errors, timeouts, non-success statuses and
    ///   body decode failures
    async fn get(&self, url: &Url, referer: Option<&str>) -> Result<FetchedDocument>;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport honoring the timeout and user agent in `config`
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| {
                CssColorsError::invalid_config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, referer: Option<&str>) -> Result<FetchedDocument> {
        let mut request = self.client.get(url.clone());
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        // The response owns the connection; it is released when it drops on
        // every path out of this block.
        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| CssColorsError::fetch_failure(url, e))?;

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| CssColorsError::fetch_failure(url, e))?;

        Ok(FetchedDocument::new(body, final_url))
    }
}

/// Retrying front end used for every document the pipeline loads
pub struct Fetcher {
    transport: Box<dyn Transport>,
    max_attempts: u32,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Create a fetcher on top of the `reqwest` transport
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Box::new(transport), config.max_attempts))
    }

    /// `max_attempts` must be at least 1, as enforced by
    /// [`ExtractionConfig::validate`]
    #[must_use]
    pub fn with_transport(transport: Box<dyn Transport>, max_attempts: u32) -> Self {
        debug_assert!(max_attempts >= 1, "max_attempts must be at least 1");
        Self {
            transport,
            max_attempts,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetch `url`, sending `referer` as the `Referer` header.
    ///
    /// Never fails: after the last failed attempt the failure is logged once
    /// at warn level and an empty document is returned. Errors that are not
    /// recoverable end the retries early.
    pub async fn fetch(&self, url: &Url, referer: Option<&str>) -> FetchedDocument {
        let mut last_error = None;
        let mut attempts = 0;

        for attempt in 1..=self.max_attempts {
            attempts = attempt;
            match self.transport.get(url, referer).await {
                Ok(document) => {
                    tracing::debug!(
                        url = %url,
                        final_url = ?document.final_url.as_ref().map(Url::as_str),
                        bytes = document.body.len(),
                        attempt,
                        "Fetched document"
                    );
                    return document;
                },
                Err(e) => {
                    events::fetch_attempt_failed(url.as_str(), attempt, self.max_attempts, &e);
                    let retry = e.is_recoverable();
                    last_error = Some(e);
                    if !retry {
                        break;
                    }
                },
            }
        }

        if let Some(e) = last_error {
            events::fetch_failed(url.as_str(), attempts, &e);
        }
        FetchedDocument::empty()
    }
}

/// Origin of `url` (scheme, host and port) as sent in the `Referer` of the
/// top-level page request
#[must_use]
pub fn origin_referer(url: &Url) -> String {
    let origin = url.origin();
    if origin.is_tuple() {
        format!("{}/", origin.ascii_serialization())
    } else {
        url.as_str().to_string()
    }
}
