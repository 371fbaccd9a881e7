//! Scalar cell values and their coercion rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single cell of a dataset.
///
/// Coercion rules:
/// - numeric: `Number` when finite; `Text` when its trimmed form parses as a
///   finite number; never `Absent`.
/// - display: numbers use the shortest round-trip form (`1200`, `12.5`),
///   `Absent` displays as the empty string.
/// - missing: `Absent` or the empty string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value, as produced by spreadsheet decoders or cleaning fills.
    Number(f64),
    /// Text value, as produced by delimited-text decoders.
    Text(String),
    /// No value (short row, null, empty spreadsheet cell).
    #[default]
    Absent,
}

impl CellValue {
    /// Build a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Convert a loosely-typed JSON value.
    ///
    /// Booleans become text (`"true"`/`"false"`); arrays and objects are
    /// stored as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Absent,
            Value::Bool(b) => CellValue::Text(b.to_string()),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// The value as a finite number, if it coerces to one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => parse_finite(s),
            CellValue::Absent => None,
        }
    }

    /// The raw text, only for `Text` cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this cell counts as missing (absent or empty string).
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Absent => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Whether this cell is absent.
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Absent => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Absent)
    }
}

/// Parse trimmed text as a finite number.
pub fn parse_finite(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number in its shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Drop the sign of negative zero.
        return "0".to_string();
    }
    format!("{}", value)
}
