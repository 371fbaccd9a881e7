//! Chart definitions authored against dataset columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartflowError, Result};
use crate::input::Dataset;

/// Rendering type of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Area,
    Pie,
    Radar,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Radar => "radar",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "area" => Ok(ChartType::Area),
            "pie" => Ok(ChartType::Pie),
            "radar" => Ok(ChartType::Radar),
            other => Err(ChartflowError::InvalidArgument(format!(
                "unknown chart type '{}'",
                other
            ))),
        }
    }
}

/// A user-authored chart: type plus axis roles over dataset columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDefinition {
    /// Unique within a registry.
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Column providing the category labels.
    pub x_axis: String,
    /// Columns plotted as series, in order. Never empty.
    pub y_axis: Vec<String>,
    /// Series colors, cycled.
    #[serde(default)]
    pub colors: Vec<String>,
}

impl ChartDefinition {
    /// Create a definition with no colors of its own.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        chart_type: ChartType,
        x_axis: impl Into<String>,
        y_axis: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            chart_type,
            x_axis: x_axis.into(),
            y_axis,
            colors: Vec::new(),
        }
    }

    /// Set the series colors.
    pub fn with_colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    /// Check the definition on its own, without a dataset.
    pub fn validate_shape(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ChartflowError::InvalidArgument("chart id must not be empty".into()));
        }
        if self.x_axis.is_empty() {
            return Err(ChartflowError::InvalidArgument(format!(
                "chart '{}' has no x axis",
                self.id
            )));
        }
        if self.y_axis.is_empty() {
            return Err(ChartflowError::InvalidArgument(format!(
                "chart '{}' needs at least one y axis column",
                self.id
            )));
        }
        Ok(())
    }

    /// Every referenced column, x axis first.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.x_axis.as_str()).chain(self.y_axis.iter().map(String::as_str))
    }

    /// Fail on the first referenced column missing from the dataset.
    pub fn validate_against(&self, dataset: &Dataset) -> Result<()> {
        match self.referenced_columns().find(|c| !dataset.has_column(c)) {
            Some(column) => Err(ChartflowError::DanglingColumnReference {
                referrer: format!("chart '{}'", self.id),
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A chart as requested by a user, before the registry assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub x_axis: String,
    pub y_axis: Vec<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
}

impl ChartDraft {
    /// Turn into a definition with the given id, falling back to `palette`.
    pub fn into_definition(self, id: String, palette: &[String]) -> ChartDefinition {
        let colors = match self.colors {
            Some(colors) if !colors.is_empty() => colors,
            _ => palette.to_vec(),
        };
        ChartDefinition::new(id, self.title, self.chart_type, self.x_axis, self.y_axis)
            .with_colors(colors)
    }

    /// Fail on the first named column missing from the dataset.
    ///
    /// Empty names are left to [`ChartDefinition::validate_shape`].
    pub fn validate_against(&self, dataset: &Dataset) -> Result<()> {
        let missing = std::iter::once(&self.x_axis)
            .chain(&self.y_axis)
            .find(|c| !c.is_empty() && !dataset.has_column(c));
        match missing {
            Some(column) => Err(ChartflowError::DanglingColumnReference {
                referrer: format!("chart '{}'", self.title),
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }
}
