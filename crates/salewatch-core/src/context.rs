//! Run context and structured event sink.
//!
//! Every component receives a [`RunContext`] instead of reaching for global
//! logger state. The context carries the run's [`RunId`] and an
//! [`EventSink`] that receives typed [`RunEvent`]s. The production sink
//! forwards to `tracing`; [`MemoryEventSink`] records events for assertions
//! and for embedders that want to inspect a run after the fact.

use crate::core_types::schema;
use crate::errors::WatchError;
use salewatch_core_types::RunId;
use std::sync::{Arc, Mutex};

/// A notable occurrence during a run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    SourceCollected {
        source: String,
        record_count: usize,
        filtered_out: usize,
    },
    SourceFailed {
        source: String,
        error: WatchError,
    },
    StaleSourceCarried {
        source: String,
        record_count: usize,
    },
    StaleSourceDropped {
        source: String,
        record_count: usize,
    },
    StoreMissing {
        path: String,
    },
    StoreLoaded {
        path: String,
        source_count: usize,
        record_count: usize,
    },
    StoreCorrupt {
        path: String,
        error: WatchError,
        quarantined_to: Option<String>,
    },
    /// The file exists but could not be read; it is left in place
    StoreUnreadable {
        path: String,
        error: WatchError,
    },
    StoreSaved {
        path: String,
        source_count: usize,
        record_count: usize,
    },
    StoreWriteFailed {
        path: String,
        error: WatchError,
    },
    Reconciled {
        changed_sources: usize,
        change_count: usize,
    },
}

/// How loudly an event should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    Debug,
    Info,
    Warn,
    Error,
}

impl RunEvent {
    /// Canonical event name (see `salewatch_core_types::schema`)
    pub fn name(&self) -> &'static str {
        match self {
            RunEvent::SourceCollected { .. } => schema::EVENT_SOURCE_COLLECTED,
            RunEvent::SourceFailed { .. } => schema::EVENT_SOURCE_FAILED,
            RunEvent::StaleSourceCarried { .. } => schema::EVENT_STALE_SOURCE_CARRIED,
            RunEvent::StaleSourceDropped { .. } => schema::EVENT_STALE_SOURCE_DROPPED,
            RunEvent::StoreMissing { .. } => schema::EVENT_STORE_MISSING,
            RunEvent::StoreLoaded { .. } => schema::EVENT_STORE_LOADED,
            RunEvent::StoreCorrupt { .. } => schema::EVENT_STORE_CORRUPT,
            RunEvent::StoreUnreadable { .. } => schema::EVENT_STORE_UNREADABLE,
            RunEvent::StoreSaved { .. } => schema::EVENT_STORE_SAVED,
            RunEvent::StoreWriteFailed { .. } => schema::EVENT_STORE_WRITE_FAILED,
            RunEvent::Reconciled { .. } => schema::EVENT_RECONCILED,
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            RunEvent::StoreMissing { .. } => EventSeverity::Debug,
            RunEvent::SourceCollected { .. }
            | RunEvent::StoreLoaded { .. }
            | RunEvent::StoreSaved { .. }
            | RunEvent::StaleSourceCarried { .. }
            | RunEvent::Reconciled { .. } => EventSeverity::Info,
            RunEvent::SourceFailed { .. }
            | RunEvent::StaleSourceDropped { .. }
            | RunEvent::StoreCorrupt { .. }
            | RunEvent::StoreUnreadable { .. } => EventSeverity::Warn,
            RunEvent::StoreWriteFailed { .. } => EventSeverity::Error,
        }
    }
}

/// Receiver of run events.
pub trait EventSink: Send + Sync {
    fn emit(&self, run_id: &RunId, event: &RunEvent);
}

/// Emit a tracing event at the level matching an [`EventSeverity`].
macro_rules! event_at {
    ($severity:expr, $($fields:tt)+) => {
        match $severity {
            EventSeverity::Debug => tracing::debug!($($fields)+),
            EventSeverity::Info => tracing::info!($($fields)+),
            EventSeverity::Warn => tracing::warn!($($fields)+),
            EventSeverity::Error => tracing::error!($($fields)+),
        }
    };
}

/// Forwards events to `tracing` with canonical field names, at the level
/// given by [`RunEvent::severity`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, run_id: &RunId, event: &RunEvent) {
        let run_id = run_id.as_str();
        let name = event.name();
        let severity = event.severity();
        match event {
            RunEvent::SourceCollected {
                source,
                record_count,
                filtered_out,
            } => event_at!(
                severity,
                run_id,
                event = name,
                source = %source,
                record_count,
                filtered_out,
                "collected source"
            ),
            RunEvent::SourceFailed { source, error } => event_at!(
                severity,
                run_id,
                event = name,
                source = %source,
                err.code = error.code(),
                error = %error,
                "source produced no data this run; skipping its reconciliation"
            ),
            RunEvent::StaleSourceCarried {
                source,
                record_count,
            } => event_at!(
                severity,
                run_id,
                event = name,
                source = %source,
                record_count,
                "carrying forward records for source missing from this run"
            ),
            RunEvent::StaleSourceDropped {
                source,
                record_count,
            } => event_at!(
                severity,
                run_id,
                event = name,
                source = %source,
                record_count,
                "dropping records for source missing from this run"
            ),
            RunEvent::StoreMissing { path } => event_at!(
                severity,
                run_id,
                event = name,
                path = %path,
                "no snapshot yet; starting empty"
            ),
            RunEvent::StoreLoaded {
                path,
                source_count,
                record_count,
            } => event_at!(
                severity,
                run_id,
                event = name,
                path = %path,
                source_count,
                record_count,
                "loaded previous snapshot"
            ),
            RunEvent::StoreCorrupt {
                path,
                error,
                quarantined_to,
            } => event_at!(
                severity,
                run_id,
                event = name,
                path = %path,
                err.code = error.code(),
                error = %error,
                quarantined_to = quarantined_to.as_deref().unwrap_or(""),
                "previous snapshot corrupt; continuing with an empty snapshot"
            ),
            RunEvent::StoreUnreadable { path, error } => event_at!(
                severity,
                run_id,
                event = name,
                path = %path,
                err.code = error.code(),
                error = %error,
                "previous snapshot could not be read; continuing with an empty snapshot"
            ),
            RunEvent::StoreSaved {
                path,
                source_count,
                record_count,
            } => event_at!(
                severity,
                run_id,
                event = name,
                path = %path,
                source_count,
                record_count,
                "saved snapshot"
            ),
            RunEvent::StoreWriteFailed { path, error } => event_at!(
                severity,
                run_id,
                event = name,
                path = %path,
                err.code = error.code(),
                error = %error,
                "snapshot NOT saved; the next run will report every current item as new"
            ),
            RunEvent::Reconciled {
                changed_sources,
                change_count,
            } => event_at!(
                severity,
                run_id,
                event = name,
                changed_sources,
                change_count,
                "reconciled snapshots"
            ),
        }
    }
}

/// Records events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Event names in emission order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, _run_id: &RunId, event: &RunEvent) {
        self.events
            .lock()
            .map(|mut events| events.push(event.clone()))
            .ok();
    }
}

/// Explicit per-run context passed to every component.
#[derive(Clone)]
pub struct RunContext {
    run_id: RunId,
    sink: Arc<dyn EventSink>,
}

impl RunContext {
    /// Create a context with a fresh RunId
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            run_id: RunId::new(),
            sink,
        }
    }

    /// Context that reports through `tracing`
    pub fn with_tracing() -> Self {
        Self::new(Arc::new(TracingEventSink))
    }

    /// Replace the generated RunId
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn emit(&self, event: RunEvent) {
        self.sink.emit(&self.run_id, &event);
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}
