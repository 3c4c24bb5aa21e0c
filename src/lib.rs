//! # CDN Log Downloader Library
//!
//! Retrieves CDN access-log files from an object-storage service that
//! publishes them under time-encoded keys.
//!
//! ## Features
//!
//! - **Time-Range Listing**: Resolve `(host, log type, [start, end))` into
//!   object paths, transparently splitting ranges whose listing hits the
//!   service's 10,000-line truncation ceiling
//! - **Resumable Downloads**: Every URL's state is persisted in a per-directory
//!   ledger (`.state`), so re-running a batch only fetches what is missing
//! - **Bounded Memory**: The ledger keeps an LRU set of records limited by an
//!   approximate byte footprint
//! - **Observability**: Structured `tracing` events and optional Prometheus metrics
//!
//! ## Quick Start
//!
//! ```no_run
//! use cdn_log_downloader::{LogCredential, LogDownloader, LogLister, LogType, StorageConfig, StorageHttpClient};
//! use chrono::{TimeZone, Utc};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorageConfig::new("https://logs.example.com/v1")?;
//! let client = Arc::new(StorageHttpClient::from_config(
//!     &config,
//!     Some(LogCredential::new("token")),
//! )?);
//!
//! // List one day of "cds" logs for a host
//! let lister = LogLister::new(client.clone());
//! let urls = lister
//!     .list(
//!         "f6g4s8v3",
//!         &LogType::parse("cds")?,
//!         Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
//!     )
//!     .await?;
//!
//! // Download everything, resuming any earlier run into the same directory
//! let report = LogDownloader::new(client)
//!     .download_many(Path::new("./logs"), &urls)
//!     .await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`keys`] - Object key encoding of (log type, instant)
//! - [`fetcher`] - Storage configuration, authenticated HTTP and listing
//! - [`downloader`] - Sequential, resumable download engine
//! - [`resume`] - Download ledger, state codes and directory locking
//! - [`output`] - URL to local path mapping
//! - [`metrics`] - Prometheus exporter and metric helpers
//! - [`cli`] - Command-line front end

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Download orchestration
pub mod downloader;

/// Storage access and listing
pub mod fetcher;

/// Object key codec
pub mod keys;

/// Observability metrics
pub mod metrics;

/// Local output layout
pub mod output;

/// Resume capability for download batches
pub mod resume;

pub use downloader::{DownloadError, DownloadReport, LogDownloader, ProgressObserver};
pub use fetcher::{
    FetcherError, ListingError, LogCredential, LogLister, StorageConfig, StorageHttpClient,
};
pub use keys::{decode, encode, KeyError, LogType};
pub use resume::{DownloadRecord, DownloadState, Ledger, LedgerError};
