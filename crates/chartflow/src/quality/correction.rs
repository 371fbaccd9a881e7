//! Correction candidates produced by the quality scanner.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{CellValue, RowId};

/// Kind of malformed value a candidate fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    /// A date not written as `YYYY-MM-DD`.
    DateFormat,
    /// A number written with locale separators or a non-canonical form.
    NumberFormat,
}

impl CorrectionKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CorrectionKind::DateFormat => "Date Format",
            CorrectionKind::NumberFormat => "Number Format",
        }
    }
}

/// A proposed fix for one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionCandidate {
    /// Column holding the cell.
    pub column: String,
    /// 1-based row position at scan time.
    pub row: usize,
    /// Identity of the scanned row.
    pub row_id: RowId,
    /// Value found by the scan.
    pub original: CellValue,
    /// Proposed replacement.
    pub suggestion: CellValue,
    /// What kind of problem this fixes.
    pub kind: CorrectionKind,
}

/// Candidates grouped by column, in dataset column order.
///
/// Always recomputed from the current dataset, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionMap {
    columns: IndexMap<String, Vec<CorrectionCandidate>>,
}

impl CorrectionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate under its column.
    pub fn push(&mut self, candidate: CorrectionCandidate) {
        self.columns
            .entry(candidate.column.clone())
            .or_default()
            .push(candidate);
    }

    /// Candidates for one column.
    pub fn get(&self, column: &str) -> Option<&[CorrectionCandidate]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Columns with at least one candidate.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// All candidates, column by column.
    pub fn iter(&self) -> impl Iterator<Item = &CorrectionCandidate> {
        self.columns.values().flatten()
    }

    /// Find the candidate for a cell.
    pub fn find(&self, column: &str, row_id: RowId) -> Option<&CorrectionCandidate> {
        self.get(column)?.iter().find(|c| c.row_id == row_id)
    }

    /// Total number of candidates.
    pub fn total(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Flatten into a list of candidates.
    pub fn into_candidates(self) -> Vec<CorrectionCandidate> {
        self.columns.into_values().flatten().collect()
    }
}
