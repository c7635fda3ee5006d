//! Export command - Serialize a saved session's read model

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::{
    adapters::{JsonRepository, MsgPackRepository},
    app::App,
    export::{SessionReport, history_csv_to_path, q_table_csv_to_path},
    ports::SnapshotRepository,
};

#[derive(Parser, Debug)]
#[command(about = "Export a saved session as report JSON or CSV")]
pub struct ExportArgs {
    /// Session snapshot to read (.msgpack loads as MessagePack, anything
    /// else as JSON)
    pub snapshot: PathBuf,

    /// Write the session report JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write the intervention history CSV to this path
    #[arg(long)]
    pub history_csv: Option<PathBuf>,

    /// Write the Q-table CSV to this path
    #[arg(long)]
    pub q_table_csv: Option<PathBuf>,
}

fn repository_for(path: &PathBuf) -> Box<dyn SnapshotRepository> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("msgpack") || ext.eq_ignore_ascii_case("mp") => {
            Box::new(MsgPackRepository::new())
        }
        _ => Box::new(JsonRepository::new()),
    }
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let repository = repository_for(&args.snapshot);
    let snapshot = repository.load(&args.snapshot)?;
    let controller = App::session_from_snapshot(snapshot)?;
    let report = SessionReport::from_controller(&controller);

    let mut wrote_anything = false;

    if let Some(path) = &args.report {
        report.save(path)?;
        println!("Report written to {}", path.display());
        wrote_anything = true;
    }

    if let Some(path) = &args.history_csv {
        history_csv_to_path(controller.intervention_history(), path)?;
        println!("Intervention history written to {}", path.display());
        wrote_anything = true;
    }

    if let Some(path) = &args.q_table_csv {
        q_table_csv_to_path(controller.q_table(), path)?;
        println!("Q-table written to {}", path.display());
        wrote_anything = true;
    }

    if !wrote_anything {
        report.write(io::stdout().lock())?;
        println!();
    }

    Ok(())
}
