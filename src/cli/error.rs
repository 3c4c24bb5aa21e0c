//! CLI error types and conversions

use crate::downloader::DownloadError;
use crate::fetcher::{FetcherError, ListingError};
use crate::keys::KeyError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Key or log type error
    #[error("key error: {0}")]
    KeyError(#[from] KeyError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Listing error
    #[error("listing error: {0}")]
    ListingError(#[from] ListingError),

    /// Download error
    #[error("download error: {0}")]
    DownloadError(#[from] DownloadError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
