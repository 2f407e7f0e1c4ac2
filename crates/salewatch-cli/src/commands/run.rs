//! Run command

use super::OutputFormat;
use clap::Args;
use salewatch_core::logging_facility;
use salewatch_core::{render_text_summary, ChangeSet, ChangeSummary, RunContext};
use salewatch_engine::{run_from_config, RunFlags, RunOutcome, WatchConfig, DEFAULT_CONFIG_FILE};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Reconcile and report without saving the snapshot
    #[arg(long)]
    pub dry_run: bool,

    /// Remove a lock file left behind by a crashed run before starting
    #[arg(long)]
    pub force_unlock: bool,
}

#[derive(Serialize)]
struct FailureReport<'a> {
    source: &'a str,
    code: &'static str,
    error: String,
}

#[derive(Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    summary: ChangeSummary,
    changes: &'a ChangeSet,
    failed_sources: Vec<FailureReport<'a>>,
    stale_sources: Vec<&'a str>,
    persisted: bool,
}

pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = WatchConfig::load(&args.config)?;
    logging_facility::init(config.log_profile);

    let ctx = RunContext::with_tracing();
    let flags = RunFlags {
        dry_run: args.dry_run,
        force_unlock: args.force_unlock,
    };
    let outcome = run_from_config(&config, flags, &ctx)?;

    match args.format {
        OutputFormat::Text => print_text(&outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    // Report first, then fail loudly
    match outcome.persist_error {
        Some(err) => Err(format!("snapshot was not saved: {}", err).into()),
        None => Ok(()),
    }
}

fn print_text(outcome: &RunOutcome) {
    print!("{}", render_text_summary(&outcome.change_set));
    for failure in &outcome.failures {
        println!("Skipped {}: {}", failure.source, failure.error);
    }
    for (source, record_count) in &outcome.stale_sources {
        println!("Stale {}: {} previous record(s)", source, record_count);
    }
}

fn print_json(outcome: &RunOutcome) -> Result<(), Box<dyn std::error::Error>> {
    let report = RunReport {
        run_id: outcome.run_id.as_str(),
        summary: ChangeSummary::of(&outcome.change_set),
        changes: &outcome.change_set,
        failed_sources: outcome
            .failures
            .iter()
            .map(|f| FailureReport {
                source: &f.source,
                code: f.error.code(),
                error: f.error.to_string(),
            })
            .collect(),
        stale_sources: outcome
            .stale_sources
            .iter()
            .map(|(source, _)| source.as_str())
            .collect(),
        persisted: outcome.persisted,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
