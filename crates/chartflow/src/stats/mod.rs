//! Statistics engine: per-column summaries and pairwise analytics.

mod correlation;
mod measures;
mod metric;
mod summary;

pub use correlation::{CorrelationAnalyzer, CorrelationResult, Significance, Trend, pearson, volatility};
pub use measures::{half_averages, lower_median, mean, midpoint_median, mode, population_variance, sum};
pub use metric::{Metric, UnavailableReason};
pub use summary::{DatasetSummary, StatisticRecord, StatisticsEngine, trend_percent};
