//! Session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChartflowError, Result};
use crate::input::ParserConfig;

/// Colors assigned to chart series, cycled in order.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#F97316", "#84CC16",
];

/// Configuration for a Chartflow session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartflowConfig {
    /// Numeric columns summarized by the statistics engine, in column order.
    pub max_stat_columns: usize,
    /// View rows plotted by line, bar and area charts.
    pub chart_preview_rows: usize,
    /// View rows plotted by radar charts.
    pub radar_preview_rows: usize,
    /// Series colors.
    pub palette: Vec<String>,
    /// Column names used by a split when none are given.
    pub default_split_columns: Vec<String>,
    /// Fewer numeric values than this report a zero trend.
    pub trend_min_points: usize,
    /// Half-width of the "stable" band around equal half averages.
    pub stable_band: f64,
    /// Step applied to the second-half average for a prediction.
    pub prediction_step: f64,
    /// Source decoding options.
    pub parser: ParserConfig,
}

impl Default for ChartflowConfig {
    fn default() -> Self {
        Self {
            max_stat_columns: 8,
            chart_preview_rows: 20,
            radar_preview_rows: 6,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            default_split_columns: vec!["Part 1".to_string(), "Part 2".to_string()],
            trend_min_points: 4,
            stable_band: 0.05,
            prediction_step: 0.10,
            parser: ParserConfig::default(),
        }
    }
}

impl ChartflowConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ChartflowError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(ChartflowError::Config("palette must not be empty".into()));
        }
        if self.default_split_columns.is_empty() {
            return Err(ChartflowError::Config(
                "default_split_columns must not be empty".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.stable_band) {
            return Err(ChartflowError::Config(format!(
                "stable_band must be in [0, 1), got {}",
                self.stable_band
            )));
        }
        if !self.prediction_step.is_finite() || self.prediction_step < 0.0 {
            return Err(ChartflowError::Config(format!(
                "prediction_step must be a non-negative number, got {}",
                self.prediction_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChartflowConfig::default();
        assert_eq!(config.max_stat_columns, 8);
        assert_eq!(config.palette.len(), 8);
        assert_eq!(config.palette[0], "#3B82F6");
        assert_eq!(config.default_split_columns, vec!["Part 1", "Part 2"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_stat_columns": 3, "palette": ["red"]}}"#).unwrap();

        let config = ChartflowConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_stat_columns, 3);
        assert_eq!(config.palette, vec!["red"]);
        assert_eq!(config.chart_preview_rows, 20);
    }

    #[test]
    fn test_from_file_rejects_empty_palette() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"palette": []}}"#).unwrap();

        let err = ChartflowConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ChartflowError::Config(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ChartflowConfig::from_file("/nonexistent/chartflow.json").unwrap_err();
        assert!(matches!(err, ChartflowError::Io { .. }));
    }
}
