//! Canonical dataset representation and source metadata.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::cell::CellValue;

static ABSENT: CellValue = CellValue::Absent;

/// Metadata about the decoded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, xlsx, etc.).
    pub format: String,
    /// Sheet the rows were taken from, for workbooks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the import was performed.
    pub imported_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been decoded.
    pub fn new(path: PathBuf, hash: String, size_bytes: u64, format: String) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            sheet: None,
            row_count: 0,
            column_count: 0,
            imported_at: Utc::now(),
        }
    }

    /// Record the shape of the dataset built from this source.
    pub fn with_shape(mut self, dataset: &Dataset) -> Self {
        self.row_count = dataset.row_count();
        self.column_count = dataset.column_count();
        self
    }
}

/// Stable identity of a row, assigned at ingestion.
///
/// Survives sorting, filtering and cleaning; never reused within a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// A mapping from column name to cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Stable row identity.
    pub id: RowId,
    /// Cells keyed by column name.
    pub cells: IndexMap<String, CellValue>,
}

impl Row {
    /// Create a row.
    pub fn new(id: RowId, cells: IndexMap<String, CellValue>) -> Self {
        Self { id, cells }
    }

    /// Get a cell; missing keys read as absent.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&ABSENT)
    }

    /// Set a cell value.
    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// Remove a cell, returning its previous value.
    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        self.cells.shift_remove(column)
    }
}

/// Canonical in-memory table: ordered columns plus rows.
///
/// Every row's keys are a subset of `columns`. The column list is
/// authoritative for iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from columns and already-keyed rows.
    ///
    /// Keys outside the column list are dropped.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.cells.retain(|key, _| columns.iter().any(|c| c == key));
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Build a dataset and assign fresh row ids in order.
    pub fn from_cells(columns: Vec<String>, rows: Vec<IndexMap<String, CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| Row::new(RowId(idx as u64), cells))
            .collect();
        Self::from_rows(columns, rows)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of a column in the column list.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of a column, in row order.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }

    /// Finite numeric values of a column, in row order.
    pub fn numeric_values(&self, name: &str) -> Vec<f64> {
        self.column_values(name).filter_map(CellValue::as_number).collect()
    }

    /// Find a row by id, with its current position.
    pub fn row_by_id(&self, id: RowId) -> Option<(usize, &Row)> {
        self.rows.iter().enumerate().find(|(_, row)| row.id == id)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row).map(|r| r.get(column))
    }

    /// Decompose into columns and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pairs: &[(&str, CellValue)]) -> IndexMap<String, CellValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_from_cells_assigns_ids_and_drops_unknown_keys() {
        let dataset = Dataset::from_cells(
            vec!["a".into(), "b".into()],
            vec![
                cells(&[("a", CellValue::text("1")), ("zzz", CellValue::text("x"))]),
                cells(&[("b", CellValue::Number(2.0))]),
            ],
        );

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows()[0].id, RowId(0));
        assert_eq!(dataset.rows()[1].id, RowId(1));
        assert!(!dataset.rows()[0].cells.contains_key("zzz"));
        assert_eq!(dataset.rows()[1].get("a"), &CellValue::Absent);
    }

    #[test]
    fn test_numeric_values_skip_non_numeric() {
        let dataset = Dataset::from_cells(
            vec!["v".into()],
            vec![
                cells(&[("v", CellValue::text("10"))]),
                cells(&[("v", CellValue::text(""))]),
                cells(&[("v", CellValue::text("n/a"))]),
                cells(&[("v", CellValue::Number(2.5))]),
            ],
        );

        assert_eq!(dataset.numeric_values("v"), vec![10.0, 2.5]);
    }

    #[test]
    fn test_row_by_id() {
        let dataset = Dataset::from_cells(
            vec!["v".into()],
            vec![cells(&[("v", CellValue::text("a"))]), cells(&[("v", CellValue::text("b"))])],
        );

        let (pos, row) = dataset.row_by_id(RowId(1)).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(row.get("v"), &CellValue::text("b"));
        assert!(dataset.row_by_id(RowId(9)).is_none());
    }
}
