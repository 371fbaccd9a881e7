//! Per-column descriptive statistics and the dataset overview.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChartflowConfig;
use crate::error::{ChartflowError, Result};
use crate::input::Dataset;

use super::measures::{half_averages, lower_median, mean, population_variance, sum};

/// Descriptive statistics for one numeric column.
///
/// Non-numeric and empty cells are excluded from every aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticRecord {
    pub column: String,
    pub sum: f64,
    pub mean: f64,
    /// Lower-middle median: the sorted value at index `(n - 1) / 2`.
    ///
    /// For even counts this is the lower middle value, never the one at
    /// `n / 2`, so `1..=6` gives 3.
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
    /// Percent change from the first-half to the second-half average.
    pub trend_percent: f64,
    pub is_positive_trend: bool,
}

impl StatisticRecord {
    /// Compute a record from values in row order. `None` when empty.
    pub fn from_values(column: &str, values: &[f64], trend_min_points: usize) -> Option<Self> {
        let mean = mean(values)?;
        let median = lower_median(values)?;
        let variance = population_variance(values, mean);
        let trend_percent = trend_percent(values, trend_min_points);

        Some(Self {
            column: column.to_string(),
            sum: sum(values),
            mean,
            median,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: values.len(),
            variance,
            std_dev: variance.sqrt(),
            trend_percent,
            is_positive_trend: trend_percent > 0.0,
        })
    }
}

/// Two-half trend in percent; 0 when there are too few points or the first
/// half averages to exactly 0.
pub fn trend_percent(values: &[f64], min_points: usize) -> f64 {
    if values.len() < min_points.max(2) {
        return 0.0;
    }
    match half_averages(values) {
        Some((first, second)) if first != 0.0 => (second - first) / first * 100.0,
        _ => 0.0,
    }
}

/// Overview of the active dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    /// Columns with at least one numeric cell, before the statistics cap.
    pub numeric_columns: usize,
    pub statistics: Vec<StatisticRecord>,
}

/// Computes statistic records over the numeric columns of a dataset.
pub struct StatisticsEngine {
    /// Only this many numeric columns are summarized.
    max_columns: usize,
    trend_min_points: usize,
}

impl StatisticsEngine {
    /// Create an engine with default limits.
    pub fn new() -> Self {
        Self::from_config(&ChartflowConfig::default())
    }

    /// Create an engine from session configuration.
    pub fn from_config(config: &ChartflowConfig) -> Self {
        Self {
            max_columns: config.max_stat_columns,
            trend_min_points: config.trend_min_points,
        }
    }

    /// Override the column cap.
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }

    /// Columns where at least one cell coerces to a finite number, in order.
    pub fn numeric_columns(dataset: &Dataset) -> Vec<String> {
        dataset
            .columns()
            .iter()
            .filter(|column| dataset.column_values(column).any(|v| v.as_number().is_some()))
            .cloned()
            .collect()
    }

    /// Records for the first `max_columns` numeric columns.
    pub fn compute(&self, dataset: &Dataset) -> Vec<StatisticRecord> {
        let records: Vec<StatisticRecord> = Self::numeric_columns(dataset)
            .iter()
            .take(self.max_columns)
            .filter_map(|column| {
                StatisticRecord::from_values(
                    column,
                    &dataset.numeric_values(column),
                    self.trend_min_points,
                )
            })
            .collect();

        debug!(columns = records.len(), "computed statistics");
        records
    }

    /// Record for a single column, regardless of the cap.
    pub fn column(&self, dataset: &Dataset, column: &str) -> Result<StatisticRecord> {
        if !dataset.has_column(column) {
            return Err(ChartflowError::UnknownColumn(column.to_string()));
        }
        StatisticRecord::from_values(column, &dataset.numeric_values(column), self.trend_min_points)
            .ok_or_else(|| {
                ChartflowError::InsufficientData(format!(
                    "column '{}' has no numeric values",
                    column
                ))
            })
    }

    /// Dataset overview with statistics.
    pub fn summarize(&self, dataset: &Dataset) -> DatasetSummary {
        DatasetSummary {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
            numeric_columns: Self::numeric_columns(dataset).len(),
            statistics: self.compute(dataset),
        }
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new()
    }
}
