//! Domain models: money, records, snapshots and change sets.

pub mod change;
pub mod money;
pub mod record;
pub mod snapshot;

pub use change::{ChangeEntry, ChangeKind, ChangeSet};
pub use money::Money;
pub use record::Record;
pub use snapshot::{dedup_records, Snapshot};
