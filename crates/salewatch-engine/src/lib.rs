//! salewatch engine - orchestration layer
//!
//! Loads the watch configuration and runs the pipeline that coordinates
//! extraction, reconciliation and persistence.

pub mod commands;
pub mod config;

pub use commands::diff::diff_snapshot_files;
pub use commands::run::{execute_run, run_from_config, RunFlags, RunOptions, RunOutcome};
pub use config::{SourceSpec, WatchConfig, DEFAULT_CONFIG_FILE};
