//! Chart-ready series computed from the current view.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ChartflowConfig;
use crate::error::Result;
use crate::input::{CellValue, Dataset, Row};

use super::definition::{ChartDefinition, ChartType};

/// One plotted column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub column: String,
    pub color: String,
    /// One value per label; `None` where the cell is non-numeric text.
    pub values: Vec<Option<f64>>,
}

/// One pie slice: a y column summed over the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Data for a chart widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    Cartesian { labels: Vec<String>, series: Vec<Series> },
    Pie { slices: Vec<PieSlice> },
}

/// Whether a chart could be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Rendered { data: ChartData },
    Skipped { kind: String, message: String },
}

/// A chart definition paired with its render outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedChart {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub outcome: RenderOutcome,
}

impl RenderedChart {
    pub fn is_rendered(&self) -> bool {
        matches!(self.outcome, RenderOutcome::Rendered { .. })
    }
}

/// Builds series for chart definitions.
pub struct SeriesBuilder {
    preview_rows: usize,
    radar_rows: usize,
    palette: Vec<String>,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::from_config(&ChartflowConfig::default())
    }

    pub fn from_config(config: &ChartflowConfig) -> Self {
        Self {
            preview_rows: config.chart_preview_rows,
            radar_rows: config.radar_preview_rows,
            palette: config.palette.clone(),
        }
    }

    /// Render one chart over the view rows (positions into `dataset`).
    pub fn render(&self, chart: &ChartDefinition, dataset: &Dataset, view: &[usize]) -> Result<ChartData> {
        chart.validate_against(dataset)?;

        let rows: Vec<&Row> = view.iter().filter_map(|&idx| dataset.rows().get(idx)).collect();
        let colors: &[String] = if chart.colors.is_empty() {
            &self.palette
        } else {
            &chart.colors
        };
        let color = |i: usize| colors.get(i % colors.len().max(1)).cloned().unwrap_or_default();

        if chart.chart_type == ChartType::Pie {
            let slices = chart
                .y_axis
                .iter()
                .enumerate()
                .map(|(i, column)| PieSlice {
                    name: column.clone(),
                    value: rows.iter().filter_map(|row| row.get(column).as_number()).sum(),
                    color: color(i),
                })
                .collect();
            return Ok(ChartData::Pie { slices });
        }

        let limit = match chart.chart_type {
            ChartType::Radar => self.radar_rows,
            _ => self.preview_rows,
        };
        let rows = &rows[..rows.len().min(limit)];

        let labels = rows.iter().map(|row| row.get(&chart.x_axis).to_string()).collect();
        let series = chart
            .y_axis
            .iter()
            .enumerate()
            .map(|(i, column)| Series {
                column: column.clone(),
                color: color(i),
                values: rows.iter().map(|row| plot_value(row.get(column))).collect(),
            })
            .collect();

        Ok(ChartData::Cartesian { labels, series })
    }

    /// Render every chart; a failing chart is skipped, the rest still render.
    pub fn render_all(
        &self,
        charts: &[ChartDefinition],
        dataset: &Dataset,
        view: &[usize],
    ) -> Vec<RenderedChart> {
        charts
            .iter()
            .map(|chart| {
                let outcome = match self.render(chart, dataset, view) {
                    Ok(data) => RenderOutcome::Rendered { data },
                    Err(e) => {
                        warn!(id = %chart.id, error = %e, "skipped chart");
                        RenderOutcome::Skipped {
                            kind: e.kind().to_string(),
                            message: e.to_string(),
                        }
                    }
                };
                RenderedChart {
                    id: chart.id.clone(),
                    title: chart.title.clone(),
                    chart_type: chart.chart_type,
                    outcome,
                }
            })
            .collect()
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Missing cells plot as zero; text that is not a number does not plot.
fn plot_value(cell: &CellValue) -> Option<f64> {
    if cell.is_missing() {
        Some(0.0)
    } else {
        cell.as_number()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn sales() -> Dataset {
        let rows = (1..=25)
            .map(|i| {
                let mut row = IndexMap::new();
                row.insert("month".to_string(), CellValue::text(format!("m{}", i)));
                row.insert("revenue".to_string(), CellValue::Number(i as f64));
                row.insert(
                    "cost".to_string(),
                    if i == 2 { CellValue::text("n/a") } else { CellValue::Absent },
                );
                row
            })
            .collect();
        Dataset::from_cells(vec!["month".into(), "revenue".into(), "cost".into()], rows)
    }

    fn all(dataset: &Dataset) -> Vec<usize> {
        (0..dataset.row_count()).collect()
    }

    #[test]
    fn test_cartesian_preview_and_coercion() {
        let data = sales();
        let chart = ChartDefinition::new(
            "c1",
            "Sales",
            ChartType::Line,
            "month",
            vec!["revenue".into(), "cost".into()],
        );
        let ChartData::Cartesian { labels, series } =
            SeriesBuilder::new().render(&chart, &data, &all(&data)).unwrap()
        else {
            panic!("expected cartesian data");
        };

        assert_eq!(labels.len(), 20);
        assert_eq!(labels[0], "m1");
        assert_eq!(series[0].color, "#3B82F6");
        assert_eq!(series[1].color, "#10B981");
        assert_eq!(series[0].values[4], Some(5.0));
        assert_eq!(series[1].values[0], Some(0.0));
        assert_eq!(series[1].values[1], None);
    }

    #[test]
    fn test_radar_uses_fewer_rows() {
        let data = sales();
        let chart = ChartDefinition::new("r", "R", ChartType::Radar, "month", vec!["revenue".into()]);
        let ChartData::Cartesian { labels, .. } =
            SeriesBuilder::new().render(&chart, &data, &all(&data)).unwrap()
        else {
            panic!("expected cartesian data");
        };
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn test_pie_sums_view() {
        let data = sales();
        let chart = ChartDefinition::new("p", "P", ChartType::Pie, "month", vec!["revenue".into(), "cost".into()])
            .with_colors(vec!["red".into()]);
        let view = vec![0, 1, 2];
        let ChartData::Pie { slices } = SeriesBuilder::new().render(&chart, &data, &view).unwrap() else {
            panic!("expected pie data");
        };

        assert_eq!(slices[0].value, 6.0);
        assert_eq!(slices[1].value, 0.0);
        assert_eq!(slices[1].color, "red");
    }

    #[test]
    fn test_dangling_chart_is_skipped_others_render() {
        let data = sales();
        let charts = vec![
            ChartDefinition::new("bad", "B", ChartType::Bar, "month", vec!["profit".into()]),
            ChartDefinition::new("good", "G", ChartType::Bar, "month", vec!["revenue".into()]),
        ];
        let rendered = SeriesBuilder::new().render_all(&charts, &data, &all(&data));

        assert!(!rendered[0].is_rendered());
        assert!(matches!(
            rendered[0].outcome,
            RenderOutcome::Skipped { ref kind, .. } if kind == "dangling_column_reference"
        ));
        assert!(rendered[1].is_rendered());
    }
}
