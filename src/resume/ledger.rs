//! Persistent URL → download record ledger
//!
//! One ledger exists per destination directory, stored as a JSON snapshot in
//! `<dest>/.state`. The in-memory map is an LRU bounded by an approximate byte
//! footprint; an evicted URL is simply attempted again on the next run.
//!
//! Snapshots are written to a temporary file in the same directory, synced,
//! and renamed over the previous one, so a reader sees either the old or the
//! new snapshot in full.

use super::record::DownloadRecord;
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fixed ledger file name inside a destination directory
pub const LEDGER_FILE_NAME: &str = ".state";

/// Current snapshot schema version
const SCHEMA_VERSION: &str = "1";

/// Default upper bound on the in-memory ledger footprint (32 MiB)
pub const DEFAULT_LEDGER_FOOTPRINT: usize = 32 * 1024 * 1024;

/// Per-entry bookkeeping overhead assumed by the footprint estimate
const ENTRY_OVERHEAD: usize = 64;

/// Durable mapping from download URL to its latest record
pub struct Ledger {
    path: PathBuf,
    entries: LruCache<String, DownloadRecord>,
    footprint: usize,
    max_footprint: usize,
}

impl Ledger {
    /// Create an empty ledger that will persist to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: LruCache::unbounded(),
            footprint: 0,
            max_footprint: DEFAULT_LEDGER_FOOTPRINT,
        }
    }

    /// Load the ledger for a destination directory (`<dest_dir>/.state`)
    pub fn open(dest_dir: &Path) -> Self {
        Self::load(dest_dir.join(LEDGER_FILE_NAME))
    }

    /// Load a ledger snapshot
    ///
    /// A missing file yields an empty ledger. An unreadable or undecodable
    /// file is also treated as empty: re-downloading is preferred over
    /// reporting success that cannot be verified.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut ledger = Self::empty(&path);

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ledger snapshot yet, starting empty");
                return ledger;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read ledger, starting empty");
                return ledger;
            }
        };

        let snapshot: Snapshot = match serde_json::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to decode ledger, starting empty");
                return ledger;
            }
        };

        if snapshot.schema_version != SCHEMA_VERSION {
            warn!(
                path = %path.display(),
                found_version = %snapshot.schema_version,
                expected_version = SCHEMA_VERSION,
                "Ledger schema version mismatch, starting empty"
            );
            return ledger;
        }

        // Snapshot order is least- to most-recently used
        for entry in snapshot.entries {
            let (url, record) = entry.into_parts();
            ledger.put(&url, record);
        }

        info!(
            path = %path.display(),
            entries = ledger.len(),
            "Ledger loaded"
        );
        ledger
    }

    /// Cap the approximate in-memory footprint, evicting immediately if needed
    pub fn with_max_footprint(mut self, bytes: usize) -> Self {
        self.max_footprint = bytes;
        self.evict();
        self
    }

    /// Record for `url`, or a fresh unseen record
    pub fn get(&self, url: &str) -> DownloadRecord {
        self.entries.peek(url).cloned().unwrap_or_default()
    }

    /// Store the record for `url` (persist with [`Ledger::flush`])
    pub fn put(&mut self, url: &str, record: DownloadRecord) {
        let added = entry_size(url, &record);
        if let Some(previous) = self.entries.put(url.to_string(), record) {
            self.footprint = self.footprint.saturating_sub(entry_size(url, &previous));
        }
        self.footprint += added;
        self.evict();
    }

    /// Write the full in-memory state to the snapshot file
    ///
    /// On failure the in-memory state is untouched and the flush may be retried.
    pub fn flush(&self) -> Result<(), LedgerError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| LedgerError::IoError(e.to_string()))?;

        let snapshot = SnapshotRef {
            schema_version: SCHEMA_VERSION,
            entries: self
                .entries
                .iter()
                .rev()
                .map(|(url, record)| EntryRef { url, record })
                .collect(),
        };
        let json = serde_json::to_vec(&snapshot)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| LedgerError::IoError(format!("failed to create temp file: {e}")))?;
        temp_file
            .write_all(&json)
            .map_err(|e| LedgerError::IoError(format!("failed to write temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| LedgerError::IoError(format!("failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| LedgerError::IoError(format!("failed to sync temp file: {e}")))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| LedgerError::IoError(format!("failed to persist ledger: {e}")))?;

        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }

        debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            bytes = json.len(),
            "Ledger flushed"
        );
        Ok(())
    }

    /// Iterate over `(url, record)` pairs, most recently used first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DownloadRecord)> {
        self.entries.iter().map(|(url, record)| (url.as_str(), record))
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate in-memory footprint in bytes
    pub fn footprint(&self) -> usize {
        self.footprint
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn evict(&mut self) {
        while self.footprint > self.max_footprint && self.entries.len() > 1 {
            let Some((url, record)) = self.entries.pop_lru() else {
                break;
            };
            self.footprint = self.footprint.saturating_sub(entry_size(&url, &record));
            debug!(url = %url, state = %record.state, "Evicted ledger entry");
            metrics::counter!("cdn_logs_ledger_evictions_total").increment(1);
        }
    }
}

fn entry_size(url: &str, record: &DownloadRecord) -> usize {
    url.len() + record.approximate_size() + ENTRY_OVERHEAD
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    schema_version: &'a str,
    entries: Vec<EntryRef<'a>>,
}

#[derive(Serialize)]
struct EntryRef<'a> {
    url: &'a str,
    #[serde(flatten)]
    record: &'a DownloadRecord,
}

#[derive(Deserialize)]
struct Snapshot {
    schema_version: String,
    entries: Vec<SnapshotEntry>,
}

#[derive(Deserialize)]
struct SnapshotEntry {
    url: String,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    state: super::record::DownloadState,
    #[serde(default)]
    size: String,
}

impl SnapshotEntry {
    fn into_parts(self) -> (String, DownloadRecord) {
        (
            self.url,
            DownloadRecord {
                started_at: self.started_at,
                ended_at: self.ended_at,
                state: self.state,
                size: self.size,
            },
        )
    }
}

/// Errors related to ledger persistence
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Another process holds the ledger lock
    #[error("ledger is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    /// Lock error
    #[error("lock error: {0}")]
    LockError(String),
}
