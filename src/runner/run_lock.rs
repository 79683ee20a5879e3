//! Filesystem lock serializing pipeline runs on one project
//!
//! Every run holds an exclusive flock on `<root>/.pycompilecheck/run.lock`
//! while it reads the snapshot, annotates files and persists. A CLI run and a
//! watcher-triggered run on the same project therefore never interleave.

use crate::error::RunError;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Guard that holds the exclusive run lock
///
/// Released when dropped. If the process dies the OS releases the flock.
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to take the lock without blocking
    ///
    /// Returns:
    /// - `Ok(Some(guard))` if the lock was acquired
    /// - `Ok(None)` if another holder has it
    /// - `Err(RunError::LockFailed)` on IO errors
    pub fn try_acquire(lock_path: &Path) -> Result<Option<Self>, RunError> {
        let failed = |what: &str, e: std::io::Error| {
            RunError::LockFailed(format!("{} {}: {}", what, lock_path.display(), e))
        };

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| failed("cannot create directory for", e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)
            .map_err(|e| failed("cannot open", e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!("Acquired run lock {:?}", lock_path);
                Ok(Some(Self {
                    _file: file,
                    path: lock_path.to_path_buf(),
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                tracing::debug!("Run lock {:?} is held by another run", lock_path);
                Ok(None)
            }
            Err(e) => Err(failed("cannot lock", e)),
        }
    }

    /// Poll for the lock until it is free or `timeout` expires
    pub fn acquire_blocking(lock_path: &Path, timeout: Duration) -> Result<Option<Self>, RunError> {
        let start = Instant::now();
        let mut announced = false;

        loop {
            if let Some(guard) = Self::try_acquire(lock_path)? {
                if announced {
                    tracing::info!("Acquired run lock after {:?}", start.elapsed());
                }
                return Ok(Some(guard));
            }

            if start.elapsed() >= timeout {
                tracing::warn!(
                    "Timeout waiting for run lock {:?} after {:?}",
                    lock_path,
                    timeout
                );
                return Ok(None);
            }

            if !announced {
                tracing::info!("Another run is in progress, waiting for {:?}", lock_path);
                announced = true;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // The lock file is left in place for reuse
        tracing::debug!("Releasing run lock {:?}", self.path);
    }
}
