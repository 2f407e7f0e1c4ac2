//! Run lock: at most one run reads and writes the store at a time.

use crate::errors::{io_error, lock_held, Result};
use chrono::Utc;
use salewatch_core_types::RunId;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Exclusive lock file, removed when dropped.
///
/// The file records the holder's run id, process id and acquisition time so a
/// stale lock left by a crashed run can be identified, then cleared with
/// [`RunLock::force_release`].
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Create the lock file, failing if it already exists.
    ///
    /// # Errors
    ///
    /// - `WatchErrorKind::LockHeld`: another run holds the lock
    /// - `WatchErrorKind::Io`: the lock file could not be created
    pub fn acquire(path: impl Into<PathBuf>, run_id: &RunId) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| io_error("create_lock_dir", e))?;
            }
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(lock_held(&path)),
            Err(e) => return Err(io_error("acquire_run_lock", e)),
        };

        let holder = format!(
            "run_id={}\npid={}\nacquired_at={}\n",
            run_id,
            std::process::id(),
            Utc::now().to_rfc3339()
        );
        if let Err(e) = file.write_all(holder.as_bytes()) {
            let _ = fs::remove_file(&path);
            return Err(io_error("write_run_lock", e));
        }

        tracing::debug!(path = %path.display(), run_id = %run_id, "acquired run lock");
        Ok(Self { path })
    }

    /// Remove a lock file left behind by a run that is no longer alive.
    ///
    /// Returns the previous holder's description, or `None` when no lock file
    /// was present. The caller is responsible for knowing no run is active.
    ///
    /// # Errors
    ///
    /// - `WatchErrorKind::Io`: the lock file could not be read or removed
    pub fn force_release(path: &Path) -> Result<Option<String>> {
        let holder = match fs::read_to_string(path) {
            Ok(holder) => holder,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("force_release_run_lock", e)),
        };
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error("force_release_run_lock", e)),
        }

        let holder = holder.trim().replace('\n', ", ");
        tracing::warn!(path = %path.display(), holder = %holder, "forcibly released run lock");
        Ok(Some(holder))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release run lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salewatch_core::WatchErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails_until_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.lock");
        let run_id = RunId::new();

        let lock = RunLock::acquire(&path, &run_id).unwrap();
        let err = RunLock::acquire(&path, &run_id).unwrap_err();
        assert_eq!(err.kind(), WatchErrorKind::LockHeld);

        drop(lock);
        assert!(!path.exists());
        assert!(RunLock::acquire(&path, &run_id).is_ok());
    }

    #[test]
    fn test_lock_file_names_holder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("run.lock");
        let run_id = RunId::new();

        let _lock = RunLock::acquire(&path, &run_id).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(run_id.as_str()));
    }

    #[test]
    fn test_force_release_clears_abandoned_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.lock");
        let crashed = RunId::new();
        // A crashed run never drops its lock
        std::mem::forget(RunLock::acquire(&path, &crashed).unwrap());

        let holder = RunLock::force_release(&path).unwrap().unwrap();

        assert!(holder.contains(crashed.as_str()));
        assert!(!path.exists());
        assert!(RunLock::acquire(&path, &RunId::new()).is_ok());
    }

    #[test]
    fn test_force_release_without_lock_is_noop() {
        let dir = TempDir::new().unwrap();
        let released = RunLock::force_release(&dir.path().join("run.lock")).unwrap();
        assert_eq!(released, None);
    }
}
