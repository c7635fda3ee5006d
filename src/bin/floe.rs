//! floe CLI - Frozen-lake Q-learning with human intervention rules
//!
//! This CLI provides a unified interface for:
//! - Running headless training sessions on built-in or custom maps
//! - Saving session snapshots for later inspection
//! - Exporting session state as report JSON or CSV

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "floe")]
#[command(version, about = "Frozen-lake Q-learning with human interventions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run headless training episodes
    Train(Box<floe::cli::commands::train::TrainArgs>),

    /// Export a saved session as report JSON or CSV
    Export(floe::cli::commands::export::ExportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => floe::cli::commands::train::execute(*args),
        Commands::Export(args) => floe::cli::commands::export::execute(args),
    }
}
