//! One watch run, end to end.
//!
//! ## Pipeline (in order):
//! 1. Acquire the run lock (`LockHeld` is a hard stop, nothing read or written);
//!    with `force_unlock`, an existing lock file is removed first
//! 2. Load the previous snapshot (missing or corrupt → empty)
//! 3. Collect every source into the current snapshot
//! 4. Reconcile previous against current
//! 5. Compute the snapshot to persist under the stale-source policy
//! 6. Save, unless `dry_run`
//!
//! A failed save does not discard the run: the change set is still returned
//! and the failure is carried in [`RunOutcome::persist_error`].

use crate::config::WatchConfig;
use salewatch_core::errors::{Result, WatchError};
use salewatch_core::extract::SourceFailure;
use salewatch_core::{
    collect_current, next_snapshot, reconcile, ChangeSet, RunContext, RunEvent, Snapshot,
    SnapshotSource, StalePolicy,
};
use salewatch_core::{log_op_end, log_op_error, log_op_start};
use salewatch_core_types::RunId;
use salewatch_store::{RunLock, SnapshotStore};
use std::path::PathBuf;
use std::time::Instant;

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub stale_policy: StalePolicy,
    /// If true, reconcile and report but don't save
    pub dry_run: bool,
    /// Lock file to hold for the duration of the run; `None` runs unlocked
    pub lock_path: Option<PathBuf>,
    /// Remove a lock left by a crashed run before acquiring
    pub force_unlock: bool,
}

/// Per-invocation switches for [`run_from_config`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub dry_run: bool,
    pub force_unlock: bool,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub change_set: ChangeSet,
    /// Snapshot that was (or, on dry run / save failure, would have been) saved
    pub next_snapshot: Snapshot,
    pub failures: Vec<SourceFailure>,
    /// Sources absent from this run, with their previous record counts
    pub stale_sources: Vec<(String, usize)>,
    pub persisted: bool,
    pub persist_error: Option<WatchError>,
}

impl RunOutcome {
    /// True when every source produced data and the snapshot was saved
    /// (or saving was skipped on purpose).
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.persist_error.is_none()
    }
}

/// Run the pipeline over explicit sources and store.
///
/// # Errors
///
/// - `WatchErrorKind::LockHeld`: another run holds the lock
/// - `WatchErrorKind::Io`: the lock file could not be created
///
/// Source, load and save failures are not errors; see [`RunOutcome`].
pub fn execute_run(
    store: &SnapshotStore,
    sources: &[&dyn SnapshotSource],
    options: &RunOptions,
    ctx: &RunContext,
) -> Result<RunOutcome> {
    log_op_start!(
        "execute_run",
        run_id = ctx.run_id().as_str(),
        source_count = sources.len()
    );
    let start = Instant::now();

    let outcome = execute_run_impl(store, sources, options, ctx).map_err(|e| {
        log_op_error!(
            "execute_run",
            e,
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = ctx.run_id().as_str()
        );
        e
    })?;

    log_op_end!(
        "execute_run",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = ctx.run_id().as_str(),
        change_count = outcome.change_set.entry_count(),
        persisted = outcome.persisted
    );

    Ok(outcome)
}

fn execute_run_impl(
    store: &SnapshotStore,
    sources: &[&dyn SnapshotSource],
    options: &RunOptions,
    ctx: &RunContext,
) -> Result<RunOutcome> {
    let _lock = match &options.lock_path {
        Some(path) => {
            if options.force_unlock {
                RunLock::force_release(path)?;
            }
            Some(RunLock::acquire(path.clone(), ctx.run_id())?)
        }
        None => None,
    };

    let previous = store.load(ctx);
    let collected = collect_current(sources.iter().copied(), ctx);

    let change_set = reconcile(&previous, &collected.snapshot);
    ctx.emit(RunEvent::Reconciled {
        changed_sources: change_set.source_count(),
        change_count: change_set.entry_count(),
    });

    let next = next_snapshot(&previous, &collected.snapshot, options.stale_policy);
    for (source, record_count) in &next.stale_sources {
        let event = match options.stale_policy {
            StalePolicy::CarryForward => RunEvent::StaleSourceCarried {
                source: source.clone(),
                record_count: *record_count,
            },
            StalePolicy::Drop => RunEvent::StaleSourceDropped {
                source: source.clone(),
                record_count: *record_count,
            },
        };
        ctx.emit(event);
    }

    let (persisted, persist_error) = if options.dry_run {
        tracing::info!(run_id = ctx.run_id().as_str(), "dry run; snapshot not saved");
        (false, None)
    } else {
        match store.save(&next.snapshot, ctx) {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e)),
        }
    };

    Ok(RunOutcome {
        run_id: ctx.run_id().clone(),
        change_set,
        next_snapshot: next.snapshot,
        failures: collected.failures,
        stale_sources: next.stale_sources,
        persisted,
        persist_error,
    })
}

/// Run every source configured in `config`.
///
/// # Errors
///
/// Same as [`execute_run`].
pub fn run_from_config(config: &WatchConfig, flags: RunFlags, ctx: &RunContext) -> Result<RunOutcome> {
    let owned = config.build_sources();
    let sources: Vec<&dyn SnapshotSource> = owned.iter().map(|s| s.as_ref()).collect();
    let options = RunOptions {
        stale_policy: config.stale_policy,
        dry_run: flags.dry_run,
        lock_path: Some(config.effective_lock_path()),
        force_unlock: flags.force_unlock,
    };
    execute_run(&config.store(), &sources, &options, ctx)
}
