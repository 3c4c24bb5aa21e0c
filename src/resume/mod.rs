//! Resume capability for bulk log downloads
//!
//! Provides the per-directory download ledger with atomic snapshot writes and
//! advisory file locking.

pub mod ledger;
pub mod lock;
pub mod record;

pub use ledger::{Ledger, LedgerError, DEFAULT_LEDGER_FOOTPRINT, LEDGER_FILE_NAME};
pub use lock::LedgerLock;
pub use record::{DownloadRecord, DownloadState};
