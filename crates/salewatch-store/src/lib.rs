//! salewatch store - durable snapshot persistence
//!
//! Provides:
//! - `SnapshotStore`: load/save of the previous-run snapshot with atomic
//!   replace, digest verification and quarantine of corrupt files
//! - `RunLock`: exclusive lock file guarding one run at a time
//! - `JsonFileSource`: a `SnapshotSource` reading records from a JSON feed

pub mod atomic;
pub mod digest;
pub mod errors;
pub mod feed;
pub mod lock;
pub mod snapshot_store;

// Re-export key types
pub use errors::Result;
pub use feed::JsonFileSource;
pub use lock::RunLock;
pub use snapshot_store::{SnapshotStore, StoredSnapshot, FORMAT_VERSION};
