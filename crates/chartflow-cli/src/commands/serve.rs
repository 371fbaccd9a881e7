//! Serve command - HTTP API over a single session.

use std::path::PathBuf;

use chartflow::{ChartflowConfig, ImportOutcome, Session};
use colored::Colorize;

use crate::server::{app, state::AppState};

pub fn run(
    file: Option<PathBuf>,
    sheet: Option<String>,
    port: u16,
    config: ChartflowConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::with_config(config);

    if let Some(file) = &file {
        match session.load_path(file, sheet.as_deref())? {
            ImportOutcome::Applied { rows, columns } => println!(
                "{} {} ({} rows, {} columns)",
                "Loaded".green().bold(),
                file.display(),
                rows,
                columns
            ),
            ImportOutcome::SheetSelectionRequired { sheets, .. } => println!(
                "{} {} has sheets {}; choose one with POST /api/import/sheet",
                "Waiting".yellow().bold(),
                file.display(),
                sheets.join(", ")
            ),
            ImportOutcome::Superseded { .. } => {}
        }
    }

    let state = AppState::new(session);

    println!(
        "{} http://127.0.0.1:{}/api",
        "Chartflow API at".cyan().bold(),
        port
    );
    println!("Press Ctrl+C to stop");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))
}
