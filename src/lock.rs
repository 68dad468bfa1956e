use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;
use log::warn;

use crate::Result;

/// Name of the advisory lock file inside the store directory.
pub(crate) const LOCK_FILE: &str = ".lock";

/// Exclusive advisory lock on `<root>/.lock`, released on drop.
///
/// The lock file is opened anew for every acquisition, so the lock
/// excludes other threads of this process as well as other processes.
pub(crate) struct WriteLock {
    file: File,
}

impl WriteLock {
    /// Blocks until the lock for `dir` is held.
    pub(crate) fn acquire(dir: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release store lock: {}", e);
        }
    }
}
