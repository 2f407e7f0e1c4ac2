pub mod diff;
pub mod run;
pub mod show;

use clap::ValueEnum;

/// Output format shared by reporting commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
