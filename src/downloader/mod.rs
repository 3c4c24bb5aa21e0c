//! Resumable download of listed log objects
//!
//! # Overview
//!
//! [`LogDownloader::download_many`] takes the URLs produced by listing (or
//! any absolute URLs) and mirrors each object beneath a destination
//! directory. Progress is persisted in the directory's ledger (`.state`) so
//! a re-run with the same URL list only fetches what is still missing.
//!
//! # Quick Start
//!
//! ```no_run
//! use cdn_log_downloader::downloader::LogDownloader;
//! use cdn_log_downloader::fetcher::{LogCredential, StorageConfig, StorageHttpClient};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorageConfig::new("https://logs.example.com/v1")?;
//! let client = StorageHttpClient::from_config(&config, Some(LogCredential::new("token")))?;
//! let downloader = LogDownloader::new(Arc::new(client));
//!
//! let report = downloader
//!     .download_many(Path::new("./logs"), &["f6g4s8v3/cds/2024/01/01/cds_20240101-000000-abc.log.gz"])
//!     .await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`executor`] - Per-URL state machine and batch loop
//! - [`progress`] - Observer hook and batch report
//! - [`config`] - Permission bits for created files and directories
//!
//! # Error Handling
//!
//! Processing stops at the first URL that does not complete. The failing
//! attempt's state code is in the ledger and in [`DownloadError::Failed`].
//! There is no retry inside a call; re-running resumes.

pub mod config;
pub mod executor;
pub mod progress;

pub use executor::LogDownloader;
pub use progress::{DownloadReport, NoopObserver, ProgressObserver};

use crate::resume::{DownloadState, LedgerError};

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// No usable credential; nothing was read or written
    #[error("unauthorized: no log-access credential configured")]
    Unauthorized,

    /// One URL ended in a failure state
    #[error("download of {url} failed with state {state}: {reason}")]
    Failed {
        /// Canonical URL as recorded in the ledger
        url: String,
        /// Failure state written to the ledger
        state: DownloadState,
        /// Underlying error
        reason: String,
    },

    /// Ledger could not be locked or persisted
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl DownloadError {
    /// Ledger state associated with this error, when a URL was attempted
    pub fn state(&self) -> Option<DownloadState> {
        match self {
            Self::Failed { state, .. } => Some(*state),
            _ => None,
        }
    }
}
