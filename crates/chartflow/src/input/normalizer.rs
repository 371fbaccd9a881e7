//! Ingestion normalizer: decoded rows to a canonical dataset.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ChartflowError, Result};

use super::cell::CellValue;
use super::source::Dataset;

/// Array-of-arrays form: first row holds the headers.
pub type Grid = Vec<Vec<CellValue>>;

/// Keyed record form, as produced by delimited-text readers.
pub type Record = IndexMap<String, CellValue>;

/// Turns decoded input into a canonical [`Dataset`].
///
/// Column names are taken verbatim: no trimming, deduplication or renaming.
/// Every produced row carries exactly the column list as keys, with cells
/// missing from a short physical row set to [`CellValue::Absent`].
pub struct Normalizer;

impl Normalizer {
    /// Normalize the array-of-arrays form.
    ///
    /// `source` names the sheet or file in error messages. Fully blank rows
    /// are skipped.
    pub fn from_grid(grid: Grid, source: &str) -> Result<Dataset> {
        let mut lines = grid.into_iter();

        let Some(header_row) = lines.next() else {
            return Err(ChartflowError::EmptyFile(source.to_string()));
        };

        let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
        if headers.is_empty() {
            return Err(ChartflowError::NoColumnsDetected);
        }

        let rows: Vec<Record> = lines
            .filter(|line| line.iter().any(|cell| !cell.is_absent()))
            .map(|line| {
                let mut record = Record::with_capacity(headers.len());
                for (idx, header) in headers.iter().enumerate() {
                    // Duplicate headers: the rightmost cell wins.
                    let value = line.get(idx).cloned().unwrap_or_default();
                    record.insert(header.clone(), value);
                }
                record
            })
            .collect();

        if rows.is_empty() {
            return Err(ChartflowError::EmptySheet(source.to_string()));
        }

        debug!(source, columns = headers.len(), rows = rows.len(), "normalized grid");
        Ok(Dataset::from_cells(headers, rows))
    }

    /// Normalize the keyed record form.
    ///
    /// Columns come from the key set of the first non-empty record; keys
    /// not in that set are dropped from later records.
    pub fn from_records(records: Vec<Record>, source: &str) -> Result<Dataset> {
        let records: Vec<Record> = records.into_iter().filter(|r| !r.is_empty()).collect();

        let Some(first) = records.first() else {
            return Err(ChartflowError::EmptyFile(source.to_string()));
        };

        let headers: Vec<String> = first.keys().cloned().collect();
        if headers.is_empty() {
            return Err(ChartflowError::NoColumnsDetected);
        }

        let rows: Vec<Record> = records
            .into_iter()
            .map(|mut record| {
                headers
                    .iter()
                    .map(|header| {
                        let value = record.swap_remove(header).unwrap_or_default();
                        (header.clone(), value)
                    })
                    .collect()
            })
            .collect();

        debug!(source, columns = headers.len(), rows = rows.len(), "normalized records");
        Ok(Dataset::from_cells(headers, rows))
    }
}
