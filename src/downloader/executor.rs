//! Resumable multi-object download engine
//!
//! URLs are processed strictly in order. Each attempt is recorded in the
//! destination directory's ledger before the next URL is touched, so an
//! interrupted or failed run can be restarted with the same URL list and
//! will skip everything already on disk.

use chrono::Utc;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Response;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs::{DirBuilder, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};
use url::Url;

use crate::downloader::config::{DIR_MODE, FILE_MODE};
use crate::downloader::progress::{DownloadReport, NoopObserver, ProgressObserver};
use crate::downloader::DownloadError;
use crate::fetcher::StorageHttpClient;
use crate::metrics::DownloadMetrics;
use crate::output::DestinationPath;
use crate::resume::{
    DownloadRecord, DownloadState, Ledger, LedgerLock, DEFAULT_LEDGER_FOOTPRINT,
};

/// Terminal failure of one attempt, before it is written to the ledger
struct AttemptFailure {
    state: DownloadState,
    reason: String,
}

impl AttemptFailure {
    fn new(state: DownloadState, reason: impl ToString) -> Self {
        Self {
            state,
            reason: reason.to_string(),
        }
    }
}

/// What happened to one URL
enum UrlOutcome {
    Skipped,
    Completed { bytes: u64 },
}

/// Downloads log objects into a destination directory with resume support
pub struct LogDownloader {
    client: Arc<StorageHttpClient>,
    ledger_footprint: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl LogDownloader {
    /// Create a downloader using `client` for every request
    pub fn new(client: Arc<StorageHttpClient>) -> Self {
        Self {
            client,
            ledger_footprint: DEFAULT_LEDGER_FOOTPRINT,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Bound the in-memory ledger to roughly `bytes`
    pub fn with_ledger_footprint(mut self, bytes: usize) -> Self {
        self.ledger_footprint = bytes;
        self
    }

    /// Report per-object progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Fetch every URL into `dest_dir`, skipping those already complete
    ///
    /// Each entry is either an absolute URL or a bare `<host>/<key>` path as
    /// returned by listing. The destination directory is locked for the whole
    /// call and processing stops at the first failure; the failed attempt is
    /// already recorded when the error is returned.
    ///
    /// # Errors
    /// * [`DownloadError::Unauthorized`] when no credential is configured. The
    ///   ledger is not touched.
    /// * [`DownloadError::Ledger`] when the directory is locked by another
    ///   process or the ledger cannot be persisted
    /// * [`DownloadError::Failed`] for the first URL that did not complete
    pub async fn download_many<U: AsRef<str>>(
        &self,
        dest_dir: &Path,
        urls: &[U],
    ) -> Result<DownloadReport, DownloadError> {
        if self.client.credential().is_err() {
            return Err(DownloadError::Unauthorized);
        }

        let started = Instant::now();
        let mut lock = LedgerLock::open(dest_dir)?;
        let _guard = lock.try_exclusive()?;
        let mut ledger = Ledger::open(dest_dir).with_max_footprint(self.ledger_footprint);

        info!(
            dest_dir = %dest_dir.display(),
            urls = urls.len(),
            known = ledger.len(),
            "Starting download batch"
        );
        self.observer.on_batch_started(urls.len());

        let mut report = DownloadReport::default();
        for raw in urls {
            match self.download_one(dest_dir, &mut ledger, raw.as_ref()).await? {
                UrlOutcome::Skipped => report.skipped += 1,
                UrlOutcome::Completed { bytes } => {
                    report.completed += 1;
                    report.bytes_written += bytes;
                }
            }
        }
        report.elapsed = started.elapsed();

        info!(
            dest_dir = %dest_dir.display(),
            completed = report.completed,
            skipped = report.skipped,
            bytes = report.bytes_written,
            "Download batch finished"
        );
        Ok(report)
    }

    async fn download_one(
        &self,
        dest_dir: &Path,
        ledger: &mut Ledger,
        raw: &str,
    ) -> Result<UrlOutcome, DownloadError> {
        let url = self.client.canonicalize(raw.trim());

        let mut record = ledger.get(&url);
        if record.state.is_complete() {
            debug!(url = %url, "Already complete, skipping");
            self.observer.on_skipped(&url);
            return Ok(UrlOutcome::Skipped);
        }

        record.begin(Utc::now());
        self.observer.on_started(&url);
        let metrics = DownloadMetrics::start(url.as_str());

        let result = self.fetch_to_disk(dest_dir, &url, &mut record).await;
        let state = match &result {
            Ok(_) => DownloadState::Completed,
            Err(failure) => failure.state,
        };
        record.finish(state, Utc::now());
        ledger.put(&url, record);
        let flushed = ledger.flush();

        match result {
            Ok(bytes) => {
                metrics.record_success(bytes);
                self.observer.on_finished(&url, state, bytes);
                flushed?;
                Ok(UrlOutcome::Completed { bytes })
            }
            Err(failure) => {
                metrics.record_failure(state, &failure.reason);
                self.observer.on_finished(&url, state, 0);
                if let Err(e) = flushed {
                    error!(url = %url, error = %e, "Failed to persist ledger after failed download");
                }
                Err(DownloadError::Failed {
                    url,
                    state,
                    reason: failure.reason,
                })
            }
        }
    }

    /// Run one attempt: resolve, fetch, create directories, write, close
    ///
    /// Returns the number of bytes written. `record.size` is updated as soon
    /// as response headers arrive.
    async fn fetch_to_disk(
        &self,
        dest_dir: &Path,
        url: &str,
        record: &mut DownloadRecord,
    ) -> Result<u64, AttemptFailure> {
        let parsed = Url::parse(url)
            .map_err(|e| AttemptFailure::new(DownloadState::UrlParseFailed, e))?;
        let dest = DestinationPath::for_url(dest_dir, &parsed)
            .map_err(|e| AttemptFailure::new(DownloadState::UrlParseFailed, e))?;

        let mut response = self
            .client
            .get(parsed.as_str(), &[])
            .await
            .map_err(|e| AttemptFailure::new(DownloadState::FetchFailed, e))?;

        record.size = content_length(&response);

        create_dirs(dest.dir())
            .await
            .map_err(|e| AttemptFailure::new(DownloadState::MkdirFailed, e))?;

        let file_path = dest.file_path();
        let mut file = open_truncate(&file_path)
            .await
            .map_err(|e| AttemptFailure::new(DownloadState::OpenFailed, e))?;

        let mut bytes: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AttemptFailure::new(DownloadState::WriteFailed, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| AttemptFailure::new(DownloadState::WriteFailed, e))?;
            bytes += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| AttemptFailure::new(DownloadState::CloseFailed, e))?;
        file.sync_all()
            .await
            .map_err(|e| AttemptFailure::new(DownloadState::CloseFailed, e))?;
        drop(file);

        debug!(url = %url, path = %file_path.display(), bytes = bytes, "Wrote log object");
        Ok(bytes)
    }
}

/// Raw `Content-Length` header, empty when absent or not visible ASCII
fn content_length(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn create_dirs(dir: &Path) -> std::io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(dir).await
}

async fn open_truncate(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);
    options.open(path).await
}
