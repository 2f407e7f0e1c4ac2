//! Diff command

use super::OutputFormat;
use clap::Args;
use salewatch_core::logging_facility::{self, Profile};
use salewatch_core::render_text_summary;
use salewatch_engine::diff_snapshot_files;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Earlier snapshot file
    pub previous: PathBuf,

    /// Later snapshot file
    pub current: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging_facility::init(Profile::Development);

    let changes = diff_snapshot_files(&args.previous, &args.current)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text_summary(&changes)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
    }
    Ok(())
}
