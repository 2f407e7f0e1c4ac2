//! Offline reconciliation of two snapshot files.

use salewatch_core::errors::{Result, WatchError, WatchErrorKind};
use salewatch_core::{reconcile, ChangeSet};
use salewatch_store::SnapshotStore;
use std::path::Path;

fn read_snapshot_file(path: &Path) -> Result<salewatch_core::Snapshot> {
    SnapshotStore::new(path).try_load()?.ok_or_else(|| {
        WatchError::new(WatchErrorKind::NotFound)
            .with_op("diff_snapshot_files")
            .with_message(format!("{} does not exist", path.display()))
    })
}

/// Reconcile two snapshot files written in either persisted format.
///
/// Neither file is modified, even when corrupt.
///
/// # Errors
///
/// - `WatchErrorKind::NotFound`: a file does not exist
/// - `WatchErrorKind::StoreCorrupt`: a file cannot be parsed
/// - `WatchErrorKind::Io`: a file cannot be read
pub fn diff_snapshot_files(previous: &Path, current: &Path) -> Result<ChangeSet> {
    let previous = read_snapshot_file(previous)?;
    let current = read_snapshot_file(current)?;
    Ok(reconcile(&previous, &current))
}
