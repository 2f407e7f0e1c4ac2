//! Snapshot reconciliation.
//!
//! [`reconcile`] compares the previous snapshot with the current extraction
//! and classifies every difference per source. [`next_snapshot`] decides what
//! gets persisted for sources that did not report this run.
//!
//! ## Guarantees
//!
//! - **Pure**: inputs are borrowed immutably; no I/O, no events.
//! - **Idempotent**: `reconcile(s, s)` is empty for every snapshot `s`.
//! - **Missing-source safety**: a source absent from `current` never yields
//!   `Removed` entries.
//! - **Stable order**: new/price-changed entries follow current order, then
//!   removals follow previous order.

pub mod engine;
pub mod policy;

pub use engine::{reconcile, reconcile_source};
pub use policy::{next_snapshot, NextSnapshot, StalePolicy};
