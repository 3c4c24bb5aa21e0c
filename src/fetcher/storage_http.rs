//! Authenticated HTTP access to the log storage service
//!
//! Every request carries the bearer credential. Non-2xx responses are turned
//! into errors here; there is no retry at this layer, callers decide whether
//! to re-run.

use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::metrics::record_http_request;
use super::credential::LogCredential;
use super::storage_config::StorageConfig;
use super::{FetcherError, FetcherResult};

/// HTTP client bound to one storage base URL and credential
pub struct StorageHttpClient {
    client: Arc<Client>,
    base_url: String,
    credential: Option<LogCredential>,
}

impl StorageHttpClient {
    /// Create a client from an existing `reqwest::Client`
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (Arc for cheap cloning)
    /// * `config` - Storage base URL and timeouts
    /// * `credential` - Bearer credential; `None` makes every request fail as unauthorized
    pub fn new(
        client: Arc<Client>,
        config: &StorageConfig,
        credential: Option<LogCredential>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url().to_string(),
            credential,
        }
    }

    /// Build a dedicated `reqwest::Client` from the config's timeouts
    pub fn from_config(
        config: &StorageConfig,
        credential: Option<LogCredential>,
    ) -> FetcherResult<Self> {
        let client = Arc::new(config.build_client()?);
        Ok(Self::new(client, config, credential))
    }

    /// Storage base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The usable credential, or [`FetcherError::Unauthorized`]
    pub fn credential(&self) -> FetcherResult<&LogCredential> {
        self.credential
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or(FetcherError::Unauthorized)
    }

    /// Resolve a bare `<host>/<key>` path against the storage base
    ///
    /// Strings that already carry a scheme (`http…` or anything containing
    /// `://`) are returned unchanged.
    pub fn canonicalize(&self, raw: &str) -> String {
        if raw.starts_with("http") || raw.contains("://") {
            raw.to_string()
        } else {
            format!("{}/{}", self.base_url, raw.trim_start_matches('/'))
        }
    }

    /// Issue an authenticated GET and require a 2xx status
    ///
    /// # Errors
    /// * [`FetcherError::Unauthorized`] when no credential is configured
    /// * [`FetcherError::NetworkError`] on transport failure
    /// * [`FetcherError::HttpError`] on any non-2xx status
    pub async fn get(&self, url: &str, params: &[(&str, String)]) -> FetcherResult<Response> {
        let credential = self.credential()?;

        debug!(url = %url, params = params.len(), "GET");
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .query(params)
            .bearer_auth(credential.token())
            .send()
            .await
            .map_err(|e| {
                record_http_request(None, started.elapsed());
                FetcherError::NetworkError(format!("GET {url}: {e}"))
            })?;

        let status = response.status();
        record_http_request(Some(status.as_u16()), started.elapsed());

        if !status.is_success() {
            return Err(FetcherError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// GET and read the whole body as text
    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> FetcherResult<String> {
        self.get(url, params)
            .await?
            .text()
            .await
            .map_err(|e| FetcherError::BodyError(format!("GET {url}: {e}")))
    }
}
