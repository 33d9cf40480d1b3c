//! Per-destination locking so two fetches never write the same file at once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex, PoisonError};

/// Set of destination paths with a download in flight.
#[derive(Debug, Default)]
pub struct DestinationLocks {
    busy: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl DestinationLocks {
    /// Blocks until no other guard holds `path`, then holds it.
    pub fn acquire(&self, path: &Path) -> DestinationGuard<'_> {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        while busy.contains(path) {
            tracing::debug!("waiting for in-flight download of {}", path.display());
            busy = self
                .released
                .wait(busy)
                .unwrap_or_else(PoisonError::into_inner);
        }
        busy.insert(path.to_path_buf());
        DestinationGuard {
            locks: self,
            path: path.to_path_buf(),
        }
    }

    pub fn is_held(&self, path: &Path) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// Releases the destination path when dropped.
#[derive(Debug)]
pub struct DestinationGuard<'a> {
    locks: &'a DestinationLocks,
    path: PathBuf,
}

impl Drop for DestinationGuard<'_> {
    fn drop(&mut self) {
        self.locks
            .busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
        self.locks.released.notify_all();
    }
}
