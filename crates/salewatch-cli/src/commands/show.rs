//! Show command

use super::OutputFormat;
use clap::Args;
use salewatch_core::logging_facility::{self, Profile};
use salewatch_engine::{WatchConfig, DEFAULT_CONFIG_FILE};
use salewatch_store::SnapshotStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Snapshot file to inspect
    #[arg(long, conflicts_with = "config")]
    pub store: Option<PathBuf>,

    /// Config whose store_path to inspect (default: salewatch.toml)
    #[arg(long, conflicts_with = "store")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ShowReport {
    path: String,
    exists: bool,
    format: &'static str,
    saved_at: Option<String>,
    run_id: Option<String>,
    sources: BTreeMap<String, usize>,
    record_count: usize,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (store, profile) = match args.store {
        Some(path) => (SnapshotStore::new(path), Profile::default()),
        None => {
            let config_path = args
                .config
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            let config = WatchConfig::load(&config_path)?;
            (config.store(), config.log_profile)
        }
    };
    logging_facility::init(profile);

    let stored = store.try_load_stored()?;
    let report = match &stored {
        Some(stored) => ShowReport {
            path: store.path().display().to_string(),
            exists: true,
            format: if stored.is_legacy() { "legacy" } else { "envelope" },
            saved_at: stored.saved_at.map(|t| t.to_rfc3339()),
            run_id: stored.run_id.as_ref().map(|r| r.to_string()),
            sources: stored
                .snapshot
                .iter()
                .map(|(name, records)| (name.to_string(), records.len()))
                .collect(),
            record_count: stored.snapshot.record_count(),
        },
        None => ShowReport {
            path: store.path().display().to_string(),
            exists: false,
            format: "none",
            saved_at: None,
            run_id: None,
            sources: BTreeMap::new(),
            record_count: 0,
        },
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &ShowReport) {
    println!("Snapshot: {}", report.path);
    if !report.exists {
        println!("No snapshot saved yet.");
        return;
    }
    println!("Format: {}", report.format);
    if let Some(saved_at) = &report.saved_at {
        println!("Saved at: {}", saved_at);
    }
    if let Some(run_id) = &report.run_id {
        println!("Run: {}", run_id);
    }
    for (source, count) in &report.sources {
        println!("  {}: {} record(s)", source, count);
    }
    println!(
        "{} record(s) across {} source(s)",
        report.record_count,
        report.sources.len()
    );
}
