//! Error handling for salewatch-store
//!
//! Wraps salewatch-core WatchError with store-specific helpers

use salewatch_core::errors::{WatchError, WatchErrorKind};
use std::path::Path;

/// Result type alias using WatchError
pub type Result<T> = std::result::Result<T, WatchError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> WatchError {
    WatchError::new(WatchErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> WatchError {
    WatchError::new(WatchErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a corrupt-store error
pub fn corrupt_store(path: &Path, reason: impl Into<String>) -> WatchError {
    WatchError::new(WatchErrorKind::StoreCorrupt)
        .with_op("load_snapshot")
        .with_message(format!("{}: {}", path.display(), reason.into()))
}

/// Create a lock-held error
pub fn lock_held(path: &Path) -> WatchError {
    WatchError::new(WatchErrorKind::LockHeld)
        .with_op("acquire_run_lock")
        .with_message(format!(
            "another run holds {}; remove it if no run is active",
            path.display()
        ))
}
