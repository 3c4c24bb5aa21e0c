//! Download configuration constants

pub use crate::resume::{DEFAULT_LEDGER_FOOTPRINT, LEDGER_FILE_NAME};

/// Permission bits for directories created beneath the destination (unix only)
pub const DIR_MODE: u32 = 0o755;

/// Permission bits for downloaded log files (unix only).
/// Log objects keep the same bits as their directories.
pub const FILE_MODE: u32 = 0o755;
