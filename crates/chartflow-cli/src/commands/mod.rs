//! CLI command implementations.

pub mod clean;
pub mod correlate;
pub mod inspect;
pub mod serve;

use std::path::Path;

use chartflow::{ChartflowConfig, ImportOutcome, Session};

/// Load the configuration file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ChartflowConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ChartflowConfig::from_file(path)?),
        None => Ok(ChartflowConfig::default()),
    }
}

/// Import a file into a fresh session.
///
/// A workbook with several sheets and no `--sheet` is an error listing the
/// sheet names.
pub fn open_session(
    file: &Path,
    sheet: Option<&str>,
    config: ChartflowConfig,
) -> Result<Session, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut session = Session::with_config(config);
    match session.load_path(file, sheet)? {
        ImportOutcome::Applied { .. } => Ok(session),
        ImportOutcome::SheetSelectionRequired { sheets, .. } => Err(format!(
            "Workbook has several sheets, choose one with --sheet: {}",
            sheets.join(", ")
        )
        .into()),
        ImportOutcome::Superseded { .. } => Err("Import was superseded".into()),
    }
}
