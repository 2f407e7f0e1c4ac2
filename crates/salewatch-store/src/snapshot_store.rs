//! Durable storage of the previous run's snapshot.
//!
//! The file holds one envelope (format version, save time, run id, sources
//! digest, sources). Files written by the legacy scraper scripts, a bare
//! `{source: [records]}` map, are read transparently and rewritten in the
//! envelope format on the next save.

use crate::atomic::atomic_write;
use crate::digest::compute_sources_digest;
use crate::errors::{corrupt_store, io_error, serialization_error, Result};
use chrono::{DateTime, Utc};
use salewatch_core_types::RunId;
use salewatch_core::{RunContext, RunEvent, Snapshot, WatchErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Current persisted format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    run_id: &'a RunId,
    sources_digest: String,
    sources: &'a Snapshot,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    format_version: u32,
    saved_at: DateTime<Utc>,
    run_id: RunId,
    sources_digest: String,
    sources: Snapshot,
}

/// A loaded snapshot with the metadata it was saved with.
///
/// Metadata is `None` for files in the legacy format.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub snapshot: Snapshot,
    pub saved_at: Option<DateTime<Utc>>,
    pub run_id: Option<RunId>,
}

impl StoredSnapshot {
    pub fn is_legacy(&self) -> bool {
        self.saved_at.is_none()
    }
}

/// File-backed snapshot store.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a corrupt file is moved when `run_id` finds it.
    ///
    /// The run id suffix keeps every quarantined file; run ids sort by time.
    pub fn quarantine_path(&self, run_id: &RunId) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".corrupt-{}", run_id));
        self.path.with_file_name(name)
    }

    /// Strict load including save metadata.
    ///
    /// `Ok(None)` when no snapshot has been saved yet.
    ///
    /// # Errors
    ///
    /// - `WatchErrorKind::Io`: the file exists but cannot be read
    /// - `WatchErrorKind::StoreCorrupt`: unparsable content, unsupported
    ///   format version, or a sources digest mismatch
    pub fn try_load_stored(&self) -> Result<Option<StoredSnapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read_snapshot", e)),
        };

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| corrupt_store(&self.path, format!("not valid JSON: {}", e)))?;

        let is_envelope = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("format_version"));

        if !is_envelope {
            let snapshot: Snapshot = serde_json::from_value(value)
                .map_err(|e| corrupt_store(&self.path, format!("unreadable snapshot: {}", e)))?;
            return Ok(Some(StoredSnapshot {
                snapshot,
                saved_at: None,
                run_id: None,
            }));
        }

        let envelope: EnvelopeIn = serde_json::from_value(value)
            .map_err(|e| corrupt_store(&self.path, format!("unreadable envelope: {}", e)))?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(corrupt_store(
                &self.path,
                format!("unsupported format_version {}", envelope.format_version),
            ));
        }

        let digest = compute_sources_digest(&envelope.sources)?;
        if digest != envelope.sources_digest {
            return Err(corrupt_store(
                &self.path,
                format!(
                    "sources digest mismatch: recorded {}, computed {}",
                    envelope.sources_digest, digest
                ),
            ));
        }

        Ok(Some(StoredSnapshot {
            snapshot: envelope.sources,
            saved_at: Some(envelope.saved_at),
            run_id: Some(envelope.run_id),
        }))
    }

    /// Strict load of the snapshot alone.
    ///
    /// # Errors
    ///
    /// Same as [`SnapshotStore::try_load_stored`].
    pub fn try_load(&self) -> Result<Option<Snapshot>> {
        Ok(self.try_load_stored()?.map(|stored| stored.snapshot))
    }

    /// Load the previous snapshot for a run, never failing.
    ///
    /// A missing file yields an empty snapshot. A corrupt file is reported as
    /// `StoreCorrupt`, moved aside to this run's quarantine path, and yields
    /// an empty snapshot. A file that cannot be read at all (permissions, I/O
    /// failure) is reported as `StoreUnreadable` and left where it is.
    pub fn load(&self, ctx: &RunContext) -> Snapshot {
        let path = self.path.display().to_string();

        match self.try_load() {
            Ok(Some(snapshot)) => {
                ctx.emit(RunEvent::StoreLoaded {
                    path,
                    source_count: snapshot.len(),
                    record_count: snapshot.record_count(),
                });
                snapshot
            }
            Ok(None) => {
                ctx.emit(RunEvent::StoreMissing { path });
                Snapshot::new()
            }
            Err(error) if error.kind() == WatchErrorKind::StoreCorrupt => {
                let quarantined_to = self.quarantine(ctx.run_id());
                ctx.emit(RunEvent::StoreCorrupt {
                    path,
                    error: error.with_run_id(ctx.run_id().clone()),
                    quarantined_to,
                });
                Snapshot::new()
            }
            Err(error) => {
                ctx.emit(RunEvent::StoreUnreadable {
                    path,
                    error: error.with_run_id(ctx.run_id().clone()),
                });
                Snapshot::new()
            }
        }
    }

    fn quarantine(&self, run_id: &RunId) -> Option<String> {
        let target = self.quarantine_path(run_id);
        match fs::rename(&self.path, &target) {
            Ok(()) => Some(target.display().to_string()),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not move corrupt snapshot aside"
                );
                None
            }
        }
    }

    /// Atomically replace the stored snapshot.
    ///
    /// Emits `StoreSaved` on success and `StoreWriteFailed` on failure.
    ///
    /// # Errors
    ///
    /// - `WatchErrorKind::Serialization`: the snapshot could not be encoded
    /// - `WatchErrorKind::Io`: the temp write, sync or rename failed
    pub fn save(&self, snapshot: &Snapshot, ctx: &RunContext) -> Result<()> {
        let path = self.path.display().to_string();

        match self.write(snapshot, ctx.run_id()) {
            Ok(size_bytes) => {
                tracing::debug!(path = %path, size_bytes, "wrote snapshot");
                ctx.emit(RunEvent::StoreSaved {
                    path,
                    source_count: snapshot.len(),
                    record_count: snapshot.record_count(),
                });
                Ok(())
            }
            Err(error) => {
                let error = error.with_run_id(ctx.run_id().clone());
                ctx.emit(RunEvent::StoreWriteFailed {
                    path,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    fn write(&self, snapshot: &Snapshot, run_id: &RunId) -> Result<usize> {
        let envelope = EnvelopeOut {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            run_id,
            sources_digest: compute_sources_digest(snapshot)?,
            sources: snapshot,
        };
        let json = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| serialization_error("save_snapshot", e))?;
        atomic_write(&self.path, &json)?;
        Ok(json.len())
    }
}
