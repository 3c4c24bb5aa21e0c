//! Time-range listing of log objects
//!
//! The storage service answers `GET <base>/<host>?marker=..&end_marker=..`
//! with a newline-separated list of object keys, silently truncated at
//! 10,000 lines and without any continuation token. Whenever a response
//! reaches that ceiling the time range is split in half and each half is
//! listed on its own, recursively, until every response fits.
//!
//! Correctness relies on encoded key prefixes sorting like real time (see
//! [`crate::keys`]): adjacent sub-ranges `[start, mid)` and `[mid, end)`
//! together cover exactly the keys of `[start, end)`.

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info};

use super::storage_http::StorageHttpClient;
use super::{FetcherError, FetcherResult};
use crate::keys::{encode, LogType};

/// Maximum number of lines the service returns for one listing request.
/// A response with at least this many lines is treated as truncated.
pub const TRUNCATION_CEILING: usize = 10_000;

/// Source of raw listing responses
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Return the raw newline-separated keys stored under `host` in `[marker, end_marker)`
    async fn list_keys(&self, host: &str, marker: &str, end_marker: &str) -> FetcherResult<String>;

    /// Fail fast when the source cannot authenticate
    fn check_authorized(&self) -> FetcherResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ListingSource for StorageHttpClient {
    async fn list_keys(&self, host: &str, marker: &str, end_marker: &str) -> FetcherResult<String> {
        let url = format!("{}/{}", self.base_url(), host);
        let params = [
            ("marker", marker.to_string()),
            ("end_marker", end_marker.to_string()),
        ];
        self.get_text(&url, &params).await
    }

    fn check_authorized(&self) -> FetcherResult<()> {
        self.credential().map(|_| ())
    }
}

#[async_trait]
impl<T: ListingSource + ?Sized> ListingSource for Arc<T> {
    async fn list_keys(&self, host: &str, marker: &str, end_marker: &str) -> FetcherResult<String> {
        (**self).list_keys(host, marker, end_marker).await
    }

    fn check_authorized(&self) -> FetcherResult<()> {
        (**self).check_authorized()
    }
}

/// Half-open instant range `[start, end)` of one listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRange {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl fmt::Display for ListRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Listing errors
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// No usable credential
    #[error("unauthorized: no log-access credential configured")]
    Unauthorized,

    /// Host identifier is not a single path segment
    #[error("invalid host: '{0}'")]
    InvalidHost(String),

    /// A request for one sub-range failed; all partial results were discarded
    #[error("listing {range} failed: {source}")]
    Request {
        /// Sub-range whose request failed
        range: ListRange,
        /// Underlying fetch error
        #[source]
        source: FetcherError,
    },

    /// A truncated range is too short to split any further
    #[error("listing {range} is still truncated at one-second granularity")]
    RangeTooDense {
        /// The unsplittable sub-range
        range: ListRange,
    },
}

type ListFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<String>, ListingError>> + Send + 'a>>;

/// Resolves `(host, type, [start, end))` into `<host>/<ObjectKey>` paths
pub struct LogLister<S> {
    source: S,
}

impl<S: ListingSource> LogLister<S> {
    /// Create a lister over a listing source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// List every object of `log_type` under `host` created in `[start, end)`
    ///
    /// `start` and `end` are swapped when given in reverse order. Results are
    /// ordered by sub-range; a duplicate at a bisection boundary is possible in
    /// principle and is tolerated downstream by the URL-keyed ledger.
    pub async fn list(
        &self,
        host: &str,
        log_type: &LogType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, ListingError> {
        let host = host.trim().trim_matches('/');
        if host.is_empty() || host.contains('/') {
            return Err(ListingError::InvalidHost(host.to_string()));
        }
        self.source
            .check_authorized()
            .map_err(|_| ListingError::Unauthorized)?;

        let (start, end) = if end < start { (end, start) } else { (start, end) };

        let urls = self.list_range(host, log_type, start, end).await?;
        info!(
            host = %host,
            log_type = %log_type,
            range = %ListRange { start, end },
            objects = urls.len(),
            "Listing complete"
        );
        Ok(urls)
    }

    fn list_range<'a>(
        &'a self,
        host: &'a str,
        log_type: &'a LogType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ListFuture<'a> {
        Box::pin(async move {
            let range = ListRange { start, end };
            let marker = encode(log_type, start);
            let end_marker = encode(log_type, end);

            debug!(host = %host, marker = %marker, end_marker = %end_marker, "Listing range");
            metrics::counter!("cdn_logs_listing_requests_total").increment(1);

            let body = self
                .source
                .list_keys(host, &marker, &end_marker)
                .await
                .map_err(|source| match source {
                    FetcherError::Unauthorized => ListingError::Unauthorized,
                    source => ListingError::Request { range, source },
                })?;

            let line_count = body.lines().count();
            if line_count < TRUNCATION_CEILING {
                return Ok(body
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|key| format!("{host}/{key}"))
                    .collect());
            }

            if whole_seconds_between(start, end) <= 1 {
                return Err(ListingError::RangeTooDense { range });
            }

            let mid = start + (end - start) / 2;
            debug!(
                range = %range,
                lines = line_count,
                mid = %mid.to_rfc3339(),
                "Listing truncated, bisecting"
            );
            metrics::counter!("cdn_logs_listing_bisections_total").increment(1);

            let mut urls = self.list_range(host, log_type, start, mid).await?;
            urls.extend(self.list_range(host, log_type, mid, end).await?);
            Ok(urls)
        })
    }
}

/// Distinct encoded seconds covered by `[start, end)`
fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let floor = |t: DateTime<Utc>| t.with_nanosecond(0).unwrap_or(t);
    (floor(end) - floor(start)).num_seconds()
}
