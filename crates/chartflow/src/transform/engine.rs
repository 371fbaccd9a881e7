//! Cleaning engine: every operation returns a new dataset.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::ChartflowConfig;
use crate::error::{ChartflowError, Result};
use crate::input::{CellValue, Dataset, Row};
use crate::quality::CorrectionCandidate;
use crate::stats;

use super::operations::{
    CleaningOperation, MissingValueMethod, RowAudit, TransformChange, TransformResult,
};

/// Engine for applying cleaning operations to a dataset snapshot.
pub struct CleaningEngine {
    /// Names given to split parts when the caller supplies none.
    default_split_columns: Vec<String>,
}

impl CleaningEngine {
    /// Create a new cleaning engine.
    pub fn new() -> Self {
        Self::from_config(&ChartflowConfig::default())
    }

    /// Create an engine from session configuration.
    pub fn from_config(config: &ChartflowConfig) -> Self {
        Self {
            default_split_columns: config.default_split_columns.clone(),
        }
    }

    /// Apply any cleaning operation.
    pub fn apply(&self, dataset: &Dataset, operation: &CleaningOperation) -> Result<TransformResult> {
        let mut result = match operation {
            CleaningOperation::ApplyCorrections { candidates } => {
                self.apply_corrections(dataset, candidates)
            }
            CleaningOperation::HandleMissing {
                column,
                method,
                value,
            } => self.handle_missing(dataset, column, *method, value.as_deref()),
            CleaningOperation::SplitColumn {
                column,
                delimiter,
                new_columns,
            } => self.split_column(dataset, column, delimiter, new_columns),
            CleaningOperation::RenameColumns { mapping } => self.rename_columns(dataset, mapping),
        }?;

        result.change.description = operation.description();
        info!(
            operation = %result.change.description,
            changed = result.change.values_changed,
            removed = result.change.rows_removed,
            "applied cleaning operation"
        );
        Ok(result)
    }

    /// Apply a single correction candidate.
    pub fn apply_correction(
        &self,
        dataset: &Dataset,
        candidate: &CorrectionCandidate,
    ) -> Result<TransformResult> {
        self.apply_corrections(dataset, std::slice::from_ref(candidate))
    }

    /// Apply correction candidates as one unit.
    ///
    /// Each candidate is resolved by row id. If any targeted cell is gone or
    /// no longer holds the scanned value, nothing is applied.
    pub fn apply_corrections(
        &self,
        dataset: &Dataset,
        candidates: &[CorrectionCandidate],
    ) -> Result<TransformResult> {
        let mut targets = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            targets.push(self.resolve_candidate(dataset, candidate)?);
        }

        let (columns, mut rows) = dataset.clone().into_parts();
        let mut row_audits = Vec::with_capacity(targets.len());

        for (position, candidate) in targets.into_iter().zip(candidates) {
            let row = &mut rows[position];
            let original = row.get(&candidate.column).clone();
            if original == candidate.suggestion {
                continue;
            }
            row.set(candidate.column.clone(), candidate.suggestion.clone());
            row_audits.push(RowAudit {
                row_id: row.id,
                column: candidate.column.clone(),
                original_value: original,
                new_value: candidate.suggestion.clone(),
                transform_type: candidate.kind.label().to_lowercase().replace(' ', "_"),
            });
        }

        let column = match candidates {
            [only] => only.column.clone(),
            _ => String::new(),
        };

        Ok(TransformResult {
            dataset: Dataset::from_rows(columns, rows),
            change: TransformChange {
                description: format!("Apply {} correction(s)", candidates.len()),
                column,
                values_changed: row_audits.len(),
                row_audits,
                ..Default::default()
            },
        })
    }

    /// Current position of the row a candidate targets.
    fn resolve_candidate(&self, dataset: &Dataset, candidate: &CorrectionCandidate) -> Result<usize> {
        let stale = |reason: &str| {
            warn!(
                column = %candidate.column,
                row = candidate.row,
                reason,
                "rejected stale correction"
            );
            ChartflowError::StaleCorrectionIndex {
                column: candidate.column.clone(),
                row: candidate.row,
                reason: reason.to_string(),
            }
        };

        if !dataset.has_column(&candidate.column) {
            return Err(stale("column no longer exists"));
        }
        let Some((position, row)) = dataset.row_by_id(candidate.row_id) else {
            return Err(stale("row no longer exists"));
        };
        let current = row.get(&candidate.column);
        if current != &candidate.original && current != &candidate.suggestion {
            return Err(stale("cell value changed since the scan"));
        }
        Ok(position)
    }

    /// Remove or fill missing (absent or empty) cells of one column.
    pub fn handle_missing(
        &self,
        dataset: &Dataset,
        column: &str,
        method: MissingValueMethod,
        value: Option<&str>,
    ) -> Result<TransformResult> {
        if !dataset.has_column(column) {
            return Err(ChartflowError::UnknownColumn(column.to_string()));
        }

        let (columns, rows) = dataset.clone().into_parts();

        if method == MissingValueMethod::RemoveRows {
            let before = rows.len();
            let kept: Vec<Row> = rows.into_iter().filter(|row| !row.get(column).is_missing()).collect();
            let removed = before - kept.len();
            debug!(column, removed, "removed rows with missing values");

            return Ok(TransformResult {
                dataset: Dataset::from_rows(columns, kept),
                change: TransformChange {
                    description: format!("Remove rows with missing '{}'", column),
                    column: column.to_string(),
                    rows_removed: removed,
                    ..Default::default()
                },
            });
        }

        let fill = self.fill_value(dataset, column, method, value)?;
        let transform_type = method.as_str().to_string();

        let mut row_audits = Vec::new();
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|mut row| {
                if row.get(column).is_missing() {
                    row_audits.push(RowAudit {
                        row_id: row.id,
                        column: column.to_string(),
                        original_value: row.get(column).clone(),
                        new_value: fill.clone(),
                        transform_type: transform_type.clone(),
                    });
                    row.set(column, fill.clone());
                }
                row
            })
            .collect();

        debug!(column, filled = row_audits.len(), %method, "filled missing values");

        Ok(TransformResult {
            dataset: Dataset::from_rows(columns, rows),
            change: TransformChange {
                description: format!("Fill missing '{}' by {}", column, method),
                column: column.to_string(),
                values_changed: row_audits.len(),
                row_audits,
                ..Default::default()
            },
        })
    }

    /// The value written into missing cells.
    fn fill_value(
        &self,
        dataset: &Dataset,
        column: &str,
        method: MissingValueMethod,
        value: Option<&str>,
    ) -> Result<CellValue> {
        if method == MissingValueMethod::FillValue {
            return match value {
                Some(literal) if !literal.is_empty() => Ok(CellValue::text(literal)),
                _ => Err(ChartflowError::InvalidArgument(
                    "fill_value requires a non-empty replacement".to_string(),
                )),
            };
        }

        let values = dataset.numeric_values(column);
        let statistic = match method {
            MissingValueMethod::FillMean => stats::mean(&values),
            MissingValueMethod::FillMedian => stats::midpoint_median(&values),
            MissingValueMethod::FillMode => stats::mode(&values),
            MissingValueMethod::RemoveRows | MissingValueMethod::FillValue => None,
        };

        statistic
            .filter(|v| v.is_finite())
            .map(CellValue::Number)
            .ok_or_else(|| {
                ChartflowError::InsufficientData(format!(
                    "column '{}' has no numeric values to compute {}",
                    column, method
                ))
            })
    }

    /// Replace a column by the delimiter-separated parts of its text.
    ///
    /// New columns are appended at the end. Missing parts are absent and
    /// surplus parts are dropped. Rows whose value is not text get absent
    /// parts.
    pub fn split_column(
        &self,
        dataset: &Dataset,
        column: &str,
        delimiter: &str,
        new_columns: &[String],
    ) -> Result<TransformResult> {
        if delimiter.is_empty() {
            return Err(ChartflowError::InvalidArgument(
                "split delimiter must not be empty".to_string(),
            ));
        }
        if !dataset.has_column(column) {
            return Err(ChartflowError::UnknownColumn(column.to_string()));
        }

        let names: Vec<String> = if new_columns.is_empty() {
            self.default_split_columns.clone()
        } else {
            new_columns.to_vec()
        };

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ChartflowError::InvalidArgument(format!(
                    "split column name '{}' given twice",
                    name
                )));
            }
            if name != column && dataset.has_column(name) {
                return Err(ChartflowError::InvalidArgument(format!(
                    "split column name '{}' already exists",
                    name
                )));
            }
        }

        let (columns, rows) = dataset.clone().into_parts();
        let mut values_changed = 0;
        let mut values_discarded = 0;

        let rows: Vec<Row> = rows
            .into_iter()
            .map(|mut row| {
                match row.remove(column) {
                    Some(CellValue::Text(text)) => {
                        let mut parts = text.split(delimiter);
                        for name in &names {
                            let part = match parts.next() {
                                Some(p) if !p.is_empty() => CellValue::text(p),
                                _ => CellValue::Absent,
                            };
                            row.set(name.clone(), part);
                        }
                        values_changed += 1;
                    }
                    source => {
                        if matches!(source, Some(CellValue::Number(_))) {
                            values_discarded += 1;
                        }
                        for name in &names {
                            row.set(name.clone(), CellValue::Absent);
                        }
                    }
                }
                row
            })
            .collect();

        let mut columns: Vec<String> = columns.into_iter().filter(|c| c != column).collect();
        columns.extend(names.iter().cloned());

        if values_discarded > 0 {
            warn!(column, discarded = values_discarded, "split dropped non-text values");
        }
        debug!(column, delimiter, parts = names.len(), "split column");

        Ok(TransformResult {
            dataset: Dataset::from_rows(columns, rows),
            change: TransformChange {
                description: format!("Split '{}' on '{}'", column, delimiter),
                column: column.to_string(),
                values_changed,
                values_discarded,
                columns_added: names,
                ..Default::default()
            },
        })
    }

    /// Rename columns, keeping their order.
    ///
    /// Mapping entries for unknown columns and empty targets are ignored.
    /// A rename that would merge two columns is rejected.
    pub fn rename_columns(
        &self,
        dataset: &Dataset,
        mapping: &IndexMap<String, String>,
    ) -> Result<TransformResult> {
        let effective: IndexMap<&str, &str> = mapping
            .iter()
            .filter(|(from, to)| !to.is_empty() && from != to && dataset.has_column(from))
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();

        let renamed: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| effective.get(c.as_str()).map_or_else(|| c.clone(), |to| to.to_string()))
            .collect();

        let distinct_before: HashSet<&String> = dataset.columns().iter().collect();
        let distinct_after: HashSet<&String> = renamed.iter().collect();
        if distinct_after.len() < distinct_before.len() {
            return Err(ChartflowError::InvalidArgument(
                "rename would give two columns the same name".to_string(),
            ));
        }

        let (_, rows) = dataset.clone().into_parts();
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|row| {
                let cells = row
                    .cells
                    .into_iter()
                    .map(|(key, value)| match effective.get(key.as_str()) {
                        Some(to) => (to.to_string(), value),
                        None => (key, value),
                    })
                    .collect();
                Row::new(row.id, cells)
            })
            .collect();

        debug!(renamed = effective.len(), "renamed columns");

        Ok(TransformResult {
            dataset: Dataset::from_rows(renamed, rows),
            change: TransformChange {
                description: format!("Rename {} column(s)", effective.len()),
                ..Default::default()
            },
        })
    }
}

impl Default for CleaningEngine {
    fn default() -> Self {
        Self::new()
    }
}
