//! Storage-service access: authenticated HTTP and log listing

pub mod credential;
pub mod listing;
pub mod storage_config;
pub mod storage_http;

pub use credential::LogCredential;
pub use listing::{ListRange, ListingError, ListingSource, LogLister, TRUNCATION_CEILING};
pub use storage_config::StorageConfig;
pub use storage_http::StorageHttpClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// No usable log-access credential
    #[error("unauthorized: no log-access credential configured")]
    Unauthorized,

    /// URL could not be built or parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure
    #[error("network error: {0}")]
    NetworkError(String),

    /// Non-2xx response
    #[error("HTTP {status} from {url}")]
    HttpError {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body could not be read
    #[error("body error: {0}")]
    BodyError(String),

    /// HTTP client could not be constructed
    #[error("client configuration error: {0}")]
    ClientError(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;
