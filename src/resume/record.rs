//! Per-URL download records and their state codes
//!
//! The numeric state codes are persisted in the ledger file and may be read
//! by other tools, so their values are fixed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Download state of a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum DownloadState {
    /// Never attempted
    #[default]
    Unseen,
    /// Fetched and written successfully; never re-fetched
    Completed,
    /// The URL could not be parsed
    UrlParseFailed,
    /// Transport error or non-2xx response
    FetchFailed,
    /// Destination file could not be opened
    OpenFailed,
    /// Destination file could not be written
    WriteFailed,
    /// Destination file could not be closed
    CloseFailed,
    /// Destination directory could not be created
    MkdirFailed,
}

impl DownloadState {
    /// Wire code stored in the ledger
    pub fn code(self) -> u16 {
        match self {
            DownloadState::Unseen => 0,
            DownloadState::Completed => 1,
            DownloadState::UrlParseFailed => 10,
            DownloadState::FetchFailed => 11,
            DownloadState::OpenFailed => 12,
            DownloadState::WriteFailed => 13,
            DownloadState::CloseFailed => 14,
            DownloadState::MkdirFailed => 20,
        }
    }

    /// Whether this state ends all further work for the URL
    pub fn is_complete(self) -> bool {
        self == DownloadState::Completed
    }

    /// Whether the URL was attempted and failed
    pub fn is_failure(self) -> bool {
        !matches!(self, DownloadState::Unseen | DownloadState::Completed)
    }
}

impl From<DownloadState> for u16 {
    fn from(state: DownloadState) -> Self {
        state.code()
    }
}

impl TryFrom<u16> for DownloadState {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DownloadState::Unseen),
            1 => Ok(DownloadState::Completed),
            10 => Ok(DownloadState::UrlParseFailed),
            11 => Ok(DownloadState::FetchFailed),
            12 => Ok(DownloadState::OpenFailed),
            13 => Ok(DownloadState::WriteFailed),
            14 => Ok(DownloadState::CloseFailed),
            20 => Ok(DownloadState::MkdirFailed),
            other => Err(format!("unknown download state code: {other}")),
        }
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownloadState::Unseen => "unseen",
            DownloadState::Completed => "completed",
            DownloadState::UrlParseFailed => "url-parse-failed",
            DownloadState::FetchFailed => "fetch-failed",
            DownloadState::OpenFailed => "open-failed",
            DownloadState::WriteFailed => "write-failed",
            DownloadState::CloseFailed => "close-failed",
            DownloadState::MkdirFailed => "mkdir-failed",
        };
        write!(f, "{s}({})", self.code())
    }
}

/// Ledger entry for one download URL
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Last time a fetch was attempted
    pub started_at: Option<DateTime<Utc>>,
    /// Last terminal transition
    pub ended_at: Option<DateTime<Utc>>,
    /// Current state
    pub state: DownloadState,
    /// `Content-Length` header from the last response, verbatim
    #[serde(default)]
    pub size: String,
}

impl DownloadRecord {
    /// Mark the start of an attempt
    pub fn begin(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
    }

    /// Record a terminal transition
    pub fn finish(&mut self, state: DownloadState, now: DateTime<Utc>) {
        self.state = state;
        self.ended_at = Some(now);
    }

    /// Rough in-memory footprint, used for ledger eviction accounting
    pub(crate) fn approximate_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.size.capacity()
    }
}
