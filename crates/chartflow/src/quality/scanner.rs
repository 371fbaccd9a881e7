//! Quality scanner for date and number formats.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::input::{CellValue, Dataset, format_number, parse_finite};

use super::correction::{CorrectionCandidate, CorrectionKind, CorrectionMap};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

/// Canonical date form; values matching it are never flagged.
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Comma used as a thousands separator (`1,200`, `12,345.50`).
static THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());

/// Date-only layouts accepted by the general date parser, in priority order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%a %b %d %Y",
];

/// Date-time layouts; the time part is dropped.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a calendar date written in any common layout.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a number that may use a comma as thousands or decimal separator.
///
/// `1,200` reads as 1200; `3,5` reads as 3.5.
pub fn normalize_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if THOUSANDS.is_match(trimmed) {
        return parse_finite(&trimmed.replace(',', ""));
    }
    parse_finite(&trimmed.replace(',', "."))
}

/// Scans a dataset snapshot for correctable cells.
///
/// Pure function of its input: scanning the same dataset twice yields equal
/// maps.
#[derive(Debug, Clone, Default)]
pub struct QualityScanner;

impl QualityScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Produce correction candidates for every column.
    pub fn scan(&self, dataset: &Dataset) -> CorrectionMap {
        let mut corrections = CorrectionMap::new();

        for column in dataset.columns() {
            let lower = column.to_lowercase();
            let date_column = lower.contains("date");
            let number_column = !lower.contains("id");

            for (idx, row) in dataset.rows().iter().enumerate() {
                // Only text cells are inspected; numbers are already canonical.
                let Some(text) = row.get(column).as_text() else {
                    continue;
                };

                let detected = if date_column {
                    self.check_date(text)
                } else {
                    None
                }
                .or_else(|| if number_column { self.check_number(text) } else { None });

                if let Some((suggestion, kind)) = detected {
                    corrections.push(CorrectionCandidate {
                        column: column.clone(),
                        row: idx + 1,
                        row_id: row.id,
                        original: CellValue::text(text),
                        suggestion,
                        kind,
                    });
                }
            }
        }

        debug!(candidates = corrections.total(), "quality scan complete");
        corrections
    }

    /// A date cell not in `YYYY-MM-DD` that still parses as a date.
    fn check_date(&self, text: &str) -> Option<(CellValue, CorrectionKind)> {
        if text.is_empty() || ISO_DATE.is_match(text) {
            return None;
        }
        let date = parse_date(text)?;
        Some((
            CellValue::text(date.format("%Y-%m-%d").to_string()),
            CorrectionKind::DateFormat,
        ))
    }

    /// A number cell whose canonical form differs from the written one.
    fn check_number(&self, text: &str) -> Option<(CellValue, CorrectionKind)> {
        let number = normalize_number(text)?;
        if format_number(number) == text {
            return None;
        }
        Some((CellValue::Number(number), CorrectionKind::NumberFormat))
    }
}
