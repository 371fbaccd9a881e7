//! Chartflow: tabular data-processing and analytics engine for charting.
//!
//! Chartflow imports CSV and spreadsheet data into a canonical dataset, flags
//! malformed dates and numbers, applies cleaning operations, computes
//! descriptive statistics and pairwise correlation, and keeps chart
//! definitions and the filtered table view consistent with the active data.
//!
//! # Core Principles
//!
//! - **Snapshots in, snapshots out**: cleaning returns a new dataset; the
//!   active one is only replaced by the [`Session`]
//! - **Derived, never cached**: corrections, statistics and chart series are
//!   recomputed from the active dataset
//! - **Degrade per metric**: an undefined statistic is reported as
//!   unavailable instead of aborting the analytics view
//!
//! # Example
//!
//! ```no_run
//! use chartflow::Session;
//!
//! let mut session = Session::new();
//! session.load_path("sales.csv", None).unwrap();
//!
//! println!("Corrections: {}", session.corrections().total());
//! for record in session.statistics() {
//!     println!("{}: mean {}", record.column, record.mean);
//! }
//! ```

pub mod charts;
pub mod config;
pub mod error;
pub mod input;
pub mod quality;
pub mod stats;
pub mod transform;
pub mod view;

pub use charts::{ChartDefinition, ChartDraft, ChartRegistry, ChartType};
pub use config::ChartflowConfig;
pub use error::{ChartflowError, Result};
pub use input::{CellValue, Dataset, Parser, Row, RowId, SourceMetadata};
pub use quality::{CorrectionCandidate, CorrectionKind, CorrectionMap, QualityScanner};
pub use stats::{CorrelationAnalyzer, CorrelationResult, Metric, StatisticRecord, StatisticsEngine};
pub use transform::{CleaningEngine, CleaningOperation, MissingValueMethod};
pub use view::{ImportOutcome, Session, SortDirection, SortState};
