//! CSV export of the current view.

use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{ChartflowError, Result};
use crate::input::Dataset;

/// Write the view rows as CSV: header first, every field double-quoted.
pub fn export_csv(dataset: &Dataset, view: &[usize]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(dataset.columns())?;
    for row in view.iter().filter_map(|&idx| dataset.rows().get(idx)) {
        writer.write_record(dataset.columns().iter().map(|c| row.get(c).to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ChartflowError::InvalidArgument(e.to_string()))
}

/// Export the view to a file.
pub fn export_csv_to_path(dataset: &Dataset, view: &[usize], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = export_csv(dataset, view)?;
    std::fs::write(path, content).map_err(|e| ChartflowError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
