//! Cleaning operations that can be applied to a dataset.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ChartflowError;
use crate::input::{CellValue, Dataset, RowId};
use crate::quality::CorrectionCandidate;

/// How to treat missing cells in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueMethod {
    /// Drop every row where the column is missing.
    RemoveRows,
    /// Fill with the mean of the numeric cells.
    FillMean,
    /// Fill with the median of the numeric cells (middle pair averaged).
    FillMedian,
    /// Fill with the most frequent numeric value, smallest on ties.
    FillMode,
    /// Fill with a literal, stored as text.
    FillValue,
}

impl MissingValueMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingValueMethod::RemoveRows => "remove_rows",
            MissingValueMethod::FillMean => "fill_mean",
            MissingValueMethod::FillMedian => "fill_median",
            MissingValueMethod::FillMode => "fill_mode",
            MissingValueMethod::FillValue => "fill_value",
        }
    }
}

impl fmt::Display for MissingValueMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingValueMethod {
    type Err = ChartflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "remove_rows" | "remove" => Ok(MissingValueMethod::RemoveRows),
            "fill_mean" | "mean" => Ok(MissingValueMethod::FillMean),
            "fill_median" | "median" => Ok(MissingValueMethod::FillMedian),
            "fill_mode" | "mode" => Ok(MissingValueMethod::FillMode),
            "fill_value" | "value" => Ok(MissingValueMethod::FillValue),
            other => Err(ChartflowError::InvalidArgument(format!(
                "unknown missing-value method '{}'",
                other
            ))),
        }
    }
}

/// A cleaning operation over the active dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CleaningOperation {
    /// Replace cells with the suggestions of correction candidates.
    ApplyCorrections { candidates: Vec<CorrectionCandidate> },

    /// Remove or fill missing cells in one column.
    HandleMissing {
        column: String,
        method: MissingValueMethod,
        #[serde(default)]
        value: Option<String>,
    },

    /// Replace a column with the parts of its text split by a delimiter.
    SplitColumn {
        column: String,
        delimiter: String,
        #[serde(default)]
        new_columns: Vec<String>,
    },

    /// Rename columns; names absent from the mapping are kept.
    RenameColumns { mapping: IndexMap<String, String> },
}

impl CleaningOperation {
    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            CleaningOperation::ApplyCorrections { candidates } => {
                format!("Apply {} correction(s)", candidates.len())
            }
            CleaningOperation::HandleMissing {
                column,
                method,
                value,
            } => match (method, value) {
                (MissingValueMethod::FillValue, Some(v)) => {
                    format!("Fill missing '{}' with '{}'", column, v)
                }
                _ => format!("Handle missing '{}' by {}", column, method),
            },
            CleaningOperation::SplitColumn {
                column,
                delimiter,
                new_columns,
            } => {
                if new_columns.is_empty() {
                    format!("Split '{}' on '{}'", column, delimiter)
                } else {
                    format!(
                        "Split '{}' on '{}' into {}",
                        column,
                        delimiter,
                        new_columns.join(", ")
                    )
                }
            }
            CleaningOperation::RenameColumns { mapping } => {
                let examples: Vec<String> = mapping
                    .iter()
                    .take(3)
                    .map(|(from, to)| format!("'{}' → '{}'", from, to))
                    .collect();
                format!("Rename {}", examples.join(", "))
            }
        }
    }
}

/// Result of applying a cleaning operation: the new dataset and what changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResult {
    /// The dataset produced by the operation.
    pub dataset: Dataset,

    /// Summary of the changes.
    pub change: TransformChange,
}

/// Summary of one applied operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformChange {
    /// Description of the change.
    pub description: String,

    /// Column affected, empty for multi-column operations.
    pub column: String,

    /// Number of cell values changed.
    pub values_changed: usize,

    /// Number of non-text values dropped because they could not be split.
    #[serde(default)]
    pub values_discarded: usize,

    /// Number of rows removed.
    pub rows_removed: usize,

    /// Columns added to the dataset.
    pub columns_added: Vec<String>,

    /// Per-cell audit information.
    pub row_audits: Vec<RowAudit>,
}

/// Audit information for a single cell change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAudit {
    /// Identity of the changed row.
    pub row_id: RowId,

    /// Column that was changed.
    pub column: String,

    /// Value before the operation.
    pub original_value: CellValue,

    /// Value after the operation.
    pub new_value: CellValue,

    /// Type of transformation applied.
    pub transform_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "fill_mean".parse::<MissingValueMethod>().unwrap(),
            MissingValueMethod::FillMean
        );
        assert_eq!(
            "Remove-Rows".parse::<MissingValueMethod>().unwrap(),
            MissingValueMethod::RemoveRows
        );
        assert!("interpolate".parse::<MissingValueMethod>().is_err());
    }

    #[test]
    fn test_operation_json_shape() {
        let op: CleaningOperation = serde_json::from_str(
            r#"{"op": "handle_missing", "column": "sales", "method": "fill_value", "value": "0"}"#,
        )
        .unwrap();
        assert_eq!(op.description(), "Fill missing 'sales' with '0'");

        let op: CleaningOperation =
            serde_json::from_str(r#"{"op": "split_column", "column": "loc", "delimiter": ";"}"#)
                .unwrap();
        assert_eq!(op.description(), "Split 'loc' on ';'");
    }
}
