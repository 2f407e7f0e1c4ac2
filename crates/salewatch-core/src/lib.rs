//! salewatch core - pure reconciliation kernel
//!
//! This crate provides the data model and the pure logic of salewatch:
//! - Record / Snapshot / ChangeSet models with exact decimal money
//! - The snapshot reconciler (previous vs current → classified changes)
//! - Stale-source policy for computing the snapshot to persist
//! - The `SnapshotSource` extraction seam and source collection
//! - Run context with a structured event sink
//! - Text rendering of change sets
//!
//! Nothing in this crate touches the filesystem; persistence lives in
//! `salewatch-store`.

pub mod context;
pub mod errors;
pub mod extract;
pub mod logging_facility;
pub mod model;
pub mod reconcile;
pub mod report;

pub use salewatch_core_types as core_types;

// Re-export commonly used types
pub use context::{EventSink, MemoryEventSink, RunContext, RunEvent, TracingEventSink};
pub use errors::{Result, SaleWatchError, WatchError, WatchErrorKind};
pub use extract::{collect_current, CollectOutcome, SnapshotSource, StaticSource};
pub use model::{ChangeEntry, ChangeSet, Money, Record, Snapshot};
pub use reconcile::{next_snapshot, reconcile, reconcile_source, StalePolicy};
pub use report::{render_text_summary, ChangeSummary};
