//! Data quality scanning.
//!
//! The scanner inspects a dataset snapshot for malformed dates and
//! locale-style numbers and proposes corrections. It never mutates the
//! dataset; applying corrections is a cleaning operation.

mod correction;
mod scanner;

pub use correction::{CorrectionCandidate, CorrectionKind, CorrectionMap};
pub use scanner::{QualityScanner, normalize_number, parse_date};
