//! Advisory locking for a destination directory's ledger
//!
//! Two downloaders pointed at the same directory would race on `.state`.
//! The lock lives in a sibling `.state.lock` file so the snapshot itself can
//! be replaced by rename while the lock is held.

use super::ledger::{LedgerError, LEDGER_FILE_NAME};
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lock file guarding one destination directory
pub struct LedgerLock {
    lock: RwLock<File>,
    path: PathBuf,
}

impl LedgerLock {
    /// Open (creating if needed) the lock file for `dest_dir`
    ///
    /// The destination directory is created when missing.
    pub fn open(dest_dir: &Path) -> Result<Self, LedgerError> {
        std::fs::create_dir_all(dest_dir).map_err(|e| {
            LedgerError::IoError(format!(
                "failed to create destination directory {}: {e}",
                dest_dir.display()
            ))
        })?;

        let path = dest_dir.join(LEDGER_FILE_NAME).with_extension("lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LedgerError::LockError(format!("failed to open lock file: {e}")))?;

        Ok(Self {
            lock: RwLock::new(file),
            path,
        })
    }

    /// Take the exclusive lock without blocking
    ///
    /// Fails with [`LedgerError::Locked`] when another process holds it.
    pub fn try_exclusive(&mut self) -> Result<RwLockWriteGuard<'_, File>, LedgerError> {
        debug!(path = %self.path.display(), "Acquiring ledger lock");
        match self.lock.try_write() {
            Ok(guard) => Ok(guard),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                Err(LedgerError::Locked(self.path.clone()))
            }
            Err(e) => Err(LedgerError::LockError(format!(
                "failed to acquire lock {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
