//! Progress reporting for multi-object downloads.
//!
//! The engine reports each object to a [`ProgressObserver`] as it starts,
//! skips or finishes, and returns a [`DownloadReport`] summarizing the call.

use std::fmt;
use std::time::Duration;

use crate::resume::DownloadState;

/// Receives per-object progress events from the download engine.
///
/// Every method has an empty default so observers implement only what they need.
pub trait ProgressObserver: Send + Sync {
    /// Called once before the engine walks the URL list.
    fn on_batch_started(&self, _total: usize) {}

    /// A URL was already complete in the ledger and was not fetched.
    fn on_skipped(&self, _url: &str) {}

    /// A fetch attempt for `url` is starting.
    fn on_started(&self, _url: &str) {}

    /// The attempt for `url` ended in `state` after writing `bytes` bytes.
    fn on_finished(&self, _url: &str, _state: DownloadState, _bytes: u64) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Summary of one successful `download_many` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Objects fetched and written during this call.
    pub completed: usize,
    /// Objects skipped because the ledger already marked them complete.
    pub skipped: usize,
    /// Bytes written to disk during this call.
    pub bytes_written: u64,
    /// Wall time of the call.
    pub elapsed: Duration,
}

impl DownloadReport {
    /// Total URLs processed.
    pub fn total(&self) -> usize {
        self.completed + self.skipped
    }

    /// Average write rate in bytes per second, 0 when nothing was written.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_written as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} already complete, {} written in {:.1}s",
            self.completed,
            self.skipped,
            format_bytes(self.bytes_written),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Format a byte count with a binary unit suffix.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
