//! Extraction seam.
//!
//! Anything that can produce records for a named source implements
//! [`SnapshotSource`]. The reconciler never sees how records were produced:
//! [`collect_current`] resolves every source (success or recorded failure)
//! into a fully materialized current [`Snapshot`] before reconciliation runs.

pub mod normalize;

pub use normalize::{
    absolutize_identity, compose_source_name, stamp_store, DiscountFilter, NormalizedSource,
};

use crate::context::{RunContext, RunEvent};
use crate::errors::{Result, SaleWatchError, WatchError, WatchErrorKind};
use crate::model::{Record, Snapshot};

/// Producer of one source's records for the current run.
pub trait SnapshotSource {
    /// Source name; the key under which records are stored and diffed
    fn name(&self) -> &str;

    /// Produce this run's records
    fn produce(&self, ctx: &RunContext) -> Result<Vec<Record>>;

    /// Records dropped by source-level filtering during the last `produce`
    fn filtered_out(&self) -> usize {
        0
    }
}

/// In-memory source, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    outcome: std::result::Result<Vec<Record>, WatchError>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(records),
        }
    }

    /// A source whose extraction failed this run
    pub fn failing(name: impl Into<String>, error: WatchError) -> Self {
        Self {
            name: name.into(),
            outcome: Err(error),
        }
    }
}

impl SnapshotSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce(&self, _ctx: &RunContext) -> Result<Vec<Record>> {
        self.outcome.clone()
    }
}

/// A source that produced no data this run.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub error: WatchError,
}

/// Result of collecting every source for one run.
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    /// Successfully produced sources only
    pub snapshot: Snapshot,
    pub failures: Vec<SourceFailure>,
}

fn validate_records(source: &str, records: &[Record]) -> Result<()> {
    for record in records {
        record.validate(source).map_err(WatchError::from)?;
    }
    Ok(())
}

/// Run every source and assemble the current snapshot.
///
/// A failing source is recorded and left out of the snapshot so that the
/// reconciler skips it instead of reporting its records as removed. A source
/// that yields a record without identity fails as a whole for the same
/// reason. Duplicate source names keep the first successful producer.
pub fn collect_current<'a, I>(sources: I, ctx: &RunContext) -> CollectOutcome
where
    I: IntoIterator<Item = &'a dyn SnapshotSource>,
{
    let mut outcome = CollectOutcome::default();

    for source in sources {
        let name = source.name().to_string();

        let produced = if name.trim().is_empty() {
            Err(WatchError::from(SaleWatchError::EmptySourceName))
        } else if outcome.snapshot.contains_source(&name) {
            Err(WatchError::from(SaleWatchError::DuplicateSource {
                source_name: name.clone(),
            }))
        } else {
            source
                .produce(ctx)
                .and_then(|records| validate_records(&name, &records).map(|_| records))
        };

        match produced {
            Ok(records) => {
                ctx.emit(RunEvent::SourceCollected {
                    source: name.clone(),
                    record_count: records.len(),
                    filtered_out: source.filtered_out(),
                });
                outcome.snapshot.insert_source(name, records);
            }
            Err(err) => {
                let error = if err.kind() == WatchErrorKind::SourceFailed {
                    err
                } else {
                    WatchError::new(WatchErrorKind::SourceFailed)
                        .with_op("collect_current")
                        .with_source_name(name.clone())
                        .with_run_id(ctx.run_id().clone())
                        .with_message("source produced no usable data")
                        .with_source(err)
                };
                ctx.emit(RunEvent::SourceFailed {
                    source: name.clone(),
                    error: error.clone(),
                });
                outcome.failures.push(SourceFailure {
                    source: name,
                    error,
                });
            }
        }
    }

    outcome
}
