//! Storage-service connection settings
//!
//! The base URL is supplied by the embedding program; listing requests go to
//! `<base>/<host>` and bare download paths resolve to `<base>/<host>/<key>`.

use reqwest::Client;
use std::time::Duration;

use super::{FetcherError, FetcherResult};

/// HTTP connect timeout - time to establish the TCP/TLS connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP request timeout - whole request including body.
/// Log objects can be tens of MB, so this is far looser than the connect timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for the log storage service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    base_url: String,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Overall request timeout
    pub request_timeout: Duration,
}

impl StorageConfig {
    /// Validate `base_url` (absolute http/https) and apply default timeouts
    ///
    /// A trailing `/` is removed so paths can be joined with a single separator.
    pub fn new(base_url: &str) -> FetcherResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = url::Url::parse(trimmed)
            .map_err(|e| FetcherError::InvalidUrl(format!("storage base '{trimmed}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetcherError::InvalidUrl(format!(
                "storage base '{trimmed}' must use http or https"
            )));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an HTTP client honoring the configured timeouts
    pub fn build_client(&self) -> FetcherResult<Client> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| FetcherError::ClientError(e.to_string()))
    }
}
