//! Error types for the Chartflow library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Chartflow operations.
///
/// Every variant is terminal for the single operation that produced it: the
/// previously active dataset stays valid.
#[derive(Debug, Error)]
pub enum ChartflowError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from the spreadsheet decoder.
    #[error("Spreadsheet error: {0}")]
    Excel(String),

    /// File extension not recognized.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoded source has no header at all.
    #[error("Empty file: {0}")]
    EmptyFile(String),

    /// Decoded sheet has a header but zero data rows.
    #[error("Sheet '{0}' has no data rows")]
    EmptySheet(String),

    /// Decoded source yields zero column names.
    #[error("No columns detected in source")]
    NoColumnsDetected,

    /// Workbook has several sheets and none was chosen.
    #[error("Workbook has {0} sheets, select one before importing")]
    SheetSelectionRequired(usize),

    /// Selected sheet does not exist in the workbook.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A statistic or fill operation cannot produce a defined result.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A chart or operation references a column absent from the dataset.
    #[error("Column '{column}' referenced by {referrer} no longer exists")]
    DanglingColumnReference { referrer: String, column: String },

    /// A correction no longer matches the dataset it is applied to.
    #[error("Stale correction for column '{column}' at row {row}: {reason}")]
    StaleCorrectionIndex {
        column: String,
        row: usize,
        reason: String,
    },

    /// Operation targets a column that does not exist.
    #[error("Column not found: {0}")]
    UnknownColumn(String),

    /// A chart with the same id is already registered.
    #[error("Chart id already registered: {0}")]
    DuplicateChartId(String),

    /// Operation arguments are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChartflowError {
    /// Short machine-readable tag for the error condition.
    pub fn kind(&self) -> &'static str {
        match self {
            ChartflowError::Io { .. } => "io",
            ChartflowError::Csv(_) => "csv",
            ChartflowError::Excel(_) => "excel",
            ChartflowError::UnsupportedFormat(_) => "unsupported_format",
            ChartflowError::EmptyFile(_) => "empty_file",
            ChartflowError::EmptySheet(_) => "empty_sheet",
            ChartflowError::NoColumnsDetected => "no_columns_detected",
            ChartflowError::SheetSelectionRequired(_) => "sheet_selection_required",
            ChartflowError::SheetNotFound(_) => "sheet_not_found",
            ChartflowError::InsufficientData(_) => "insufficient_data",
            ChartflowError::DanglingColumnReference { .. } => "dangling_column_reference",
            ChartflowError::StaleCorrectionIndex { .. } => "stale_correction_index",
            ChartflowError::UnknownColumn(_) => "unknown_column",
            ChartflowError::DuplicateChartId(_) => "duplicate_chart_id",
            ChartflowError::InvalidArgument(_) => "invalid_argument",
            ChartflowError::Config(_) => "config",
            ChartflowError::Json(_) => "json",
        }
    }
}

/// Result type alias for Chartflow operations.
pub type Result<T> = std::result::Result<T, ChartflowError>;
