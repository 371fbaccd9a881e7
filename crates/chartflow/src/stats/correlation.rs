//! Pairwise correlation, trend, volatility and a naive next-value estimate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChartflowConfig;
use crate::error::{ChartflowError, Result};
use crate::input::Dataset;

use super::measures::{half_averages, mean, population_variance};
use super::metric::{Metric, UnavailableReason};

/// Direction of the second-half average relative to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Coarse bucket of the absolute correlation coefficient.
///
/// Not a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    /// Bucket a coefficient: above 0.7 is high, above 0.4 medium.
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude > 0.7 {
            Significance::High
        } else if magnitude > 0.4 {
            Significance::Medium
        } else {
            Significance::Low
        }
    }
}

/// Metrics for one (x, y) column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub x_column: String,
    pub y_column: String,
    /// Rows where both columns held a number.
    pub pairs: usize,
    /// Pearson coefficient in [-1, 1].
    pub correlation: Metric<f64>,
    pub significance: Metric<Significance>,
    /// Computed on y alone.
    pub trend: Trend,
    /// Coefficient of variation of y, in percent.
    pub volatility: Metric<f64>,
    /// Second-half average of y nudged in the trend direction. A heuristic,
    /// not a fitted forecast.
    pub prediction: f64,
}

/// Pearson correlation coefficient, clamped to [-1, 1].
///
/// `None` when either sequence is constant or shorter than 2.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 || is_constant(&xs[..n]) || is_constant(&ys[..n]) {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    let denominator = (vx * vy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((cov / denominator).clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Analyzes pairs of numeric columns.
pub struct CorrelationAnalyzer {
    /// Relative band around equal half averages classified as stable.
    stable_band: f64,
    /// Relative step applied to the prediction for a rising or falling trend.
    prediction_step: f64,
}

impl CorrelationAnalyzer {
    /// Create an analyzer with a 5% stable band and a 10% prediction step.
    pub fn new() -> Self {
        Self::from_config(&ChartflowConfig::default())
    }

    /// Create an analyzer from session configuration.
    pub fn from_config(config: &ChartflowConfig) -> Self {
        Self {
            stable_band: config.stable_band,
            prediction_step: config.prediction_step,
        }
    }

    /// Analyze two columns, keeping only rows where both coerce to numbers.
    pub fn analyze(&self, dataset: &Dataset, x_column: &str, y_column: &str) -> Result<CorrelationResult> {
        for column in [x_column, y_column] {
            if !dataset.has_column(column) {
                return Err(ChartflowError::UnknownColumn(column.to_string()));
            }
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
            .rows()
            .iter()
            .filter_map(|row| Some((row.get(x_column).as_number()?, row.get(y_column).as_number()?)))
            .unzip();

        self.analyze_values(x_column, y_column, &xs, &ys)
    }

    /// Analyze already paired values.
    pub fn analyze_values(
        &self,
        x_column: &str,
        y_column: &str,
        xs: &[f64],
        ys: &[f64],
    ) -> Result<CorrelationResult> {
        let pairs = xs.len().min(ys.len());
        if pairs < 2 {
            return Err(ChartflowError::InsufficientData(format!(
                "correlation of '{}' and '{}' needs at least 2 paired values, found {}",
                x_column, y_column, pairs
            )));
        }
        let ys = &ys[..pairs];

        let correlation = match pearson(&xs[..pairs], ys) {
            Some(r) => Metric::Available(r),
            None => Metric::unavailable(UnavailableReason::ConstantColumn),
        };
        let significance = match correlation {
            Metric::Available(r) => Metric::Available(Significance::from_coefficient(r)),
            Metric::Unavailable { .. } => {
                Metric::unavailable(UnavailableReason::DependsOnUnavailable)
            }
        };

        let (first_avg, second_avg) = half_averages(ys).ok_or_else(|| {
            ChartflowError::InsufficientData(format!("'{}' has too few values", y_column))
        })?;
        let trend = self.classify(first_avg, second_avg);
        let prediction = match trend {
            Trend::Increasing => second_avg * (1.0 + self.prediction_step),
            Trend::Decreasing => second_avg * (1.0 - self.prediction_step),
            Trend::Stable => second_avg,
        };

        let volatility = volatility(ys);

        debug!(x_column, y_column, pairs, ?trend, "computed correlation");

        Ok(CorrelationResult {
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            pairs,
            correlation,
            significance,
            trend,
            volatility,
            prediction,
        })
    }

    fn classify(&self, first_avg: f64, second_avg: f64) -> Trend {
        if second_avg > first_avg * (1.0 + self.stable_band) {
            Trend::Increasing
        } else if second_avg < first_avg * (1.0 - self.stable_band) {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Coefficient of variation in percent; unavailable when the mean is zero.
pub fn volatility(values: &[f64]) -> Metric<f64> {
    match mean(values) {
        Some(m) if m != 0.0 => {
            let std_dev = population_variance(values, m).sqrt();
            Metric::finite(std_dev / m * 100.0, UnavailableReason::ZeroMean)
        }
        _ => Metric::unavailable(UnavailableReason::ZeroMean),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::input::CellValue;

    use super::*;

    fn dataset(x: Vec<CellValue>, y: Vec<CellValue>) -> Dataset {
        let rows = x
            .into_iter()
            .zip(y)
            .map(|(x, y)| {
                let mut row = IndexMap::new();
                row.insert("x".to_string(), x);
                row.insert("y".to_string(), y);
                row
            })
            .collect();
        Dataset::from_cells(vec!["x".into(), "y".into()], rows)
    }

    fn numbers(values: &[f64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Number(*v)).collect()
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let data = dataset(numbers(&[1.0, 2.0, 3.0]), numbers(&[2.0, 4.0, 6.0]));
        let result = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap();

        assert_eq!(result.correlation, Metric::Available(1.0));
        assert_eq!(result.significance, Metric::Available(Significance::High));
        assert_eq!(result.trend, Trend::Increasing);
        assert!((result.prediction - 5.5).abs() < 1e-9);
        assert_eq!(result.pairs, 3);
    }

    #[test]
    fn test_negative_and_decreasing() {
        let data = dataset(numbers(&[1.0, 2.0, 3.0, 4.0]), numbers(&[8.0, 6.0, 4.0, 2.0]));
        let result = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap();

        assert_eq!(result.correlation, Metric::Available(-1.0));
        assert_eq!(result.trend, Trend::Decreasing);
        assert!((result.prediction - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_stable_band() {
        let data = dataset(numbers(&[1.0, 2.0, 3.0, 4.0]), numbers(&[100.0, 102.0, 101.0, 103.0]));
        let result = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap();

        assert_eq!(result.trend, Trend::Stable);
        assert_eq!(result.prediction, 102.0);
    }

    #[test]
    fn test_constant_column_is_unavailable() {
        let data = dataset(numbers(&[5.0, 5.0, 5.0]), numbers(&[1.0, 2.0, 3.0]));
        let result = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap();

        assert_eq!(
            result.correlation,
            Metric::unavailable(UnavailableReason::ConstantColumn)
        );
        assert!(!result.significance.is_available());
    }

    #[test]
    fn test_zero_mean_volatility() {
        let data = dataset(numbers(&[1.0, 2.0]), numbers(&[-1.0, 1.0]));
        let result = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap();

        assert_eq!(result.volatility, Metric::unavailable(UnavailableReason::ZeroMean));
    }

    #[test]
    fn test_volatility_value() {
        let Metric::Available(v) = volatility(&[2.0, 4.0, 6.0]) else {
            panic!("expected volatility");
        };
        let expected = (8.0f64 / 3.0).sqrt() / 4.0 * 100.0;
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_than_two_pairs() {
        let data = dataset(
            vec![CellValue::Number(1.0), CellValue::text("x"), CellValue::Absent],
            vec![CellValue::Number(2.0), CellValue::Number(3.0), CellValue::Number(4.0)],
        );
        let err = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap_err();
        assert!(matches!(err, ChartflowError::InsufficientData(_)));
    }

    #[test]
    fn test_pairwise_deletion_keeps_rows_aligned() {
        // Missing cells in different rows must not shift the pairing.
        let data = dataset(
            vec![
                CellValue::Absent,
                CellValue::Number(2.0),
                CellValue::Number(3.0),
                CellValue::Number(4.0),
            ],
            vec![
                CellValue::Number(10.0),
                CellValue::Number(20.0),
                CellValue::Number(30.0),
                CellValue::Absent,
            ],
        );
        let result = CorrelationAnalyzer::new().analyze(&data, "x", "y").unwrap();

        assert_eq!(result.pairs, 2);
        assert_eq!(result.correlation, Metric::Available(1.0));
    }

    #[test]
    fn test_unknown_column() {
        let data = dataset(numbers(&[1.0]), numbers(&[1.0]));
        assert!(matches!(
            CorrelationAnalyzer::new().analyze(&data, "x", "nope"),
            Err(ChartflowError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_significance_buckets() {
        assert_eq!(Significance::from_coefficient(-0.75), Significance::High);
        assert_eq!(Significance::from_coefficient(0.7), Significance::Medium);
        assert_eq!(Significance::from_coefficient(0.41), Significance::Medium);
        assert_eq!(Significance::from_coefficient(0.4), Significance::Low);
    }
}
