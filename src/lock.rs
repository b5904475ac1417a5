//! File-based locking so at most one pipeline run executes at a time.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::config::Paths;

/// Guard holding an exclusive advisory lock; released on drop.
pub struct LockGuard {
    _file: File,
}

impl LockGuard {
    /// Acquire the run lock, failing fast if another run holds it.
    pub fn acquire(paths: &Paths) -> Result<Self> {
        let lock_path = paths.lock_file();
        let file = open_lock_file(&lock_path)
            .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another firewalld-ext run is already in progress (lock: {})",
                lock_path.display()
            )
        })?;

        Ok(Self { _file: file })
    }
}

fn open_lock_file(path: &Path) -> std::io::Result<File> {
    // create+read+write without truncate avoids a race between creation
    // and lock acquisition.
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}
