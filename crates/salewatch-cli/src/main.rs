//! salewatch CLI
//!
//! Command-line interface for salewatch

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "salewatch")]
#[command(about = "salewatch - Track new, re-priced and removed sale listings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect every configured source, report changes and save the snapshot
    Run(commands::run::RunArgs),
    /// Reconcile two snapshot files without touching the store
    Diff(commands::diff::DiffArgs),
    /// Summarize the persisted snapshot
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Show(args) => commands::show::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
