//! Ordered registry of chart definitions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartflowError, Result};
use crate::input::Dataset;

use super::definition::{ChartDefinition, ChartDraft};

/// Chart definitions in insertion order, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartRegistry {
    charts: Vec<ChartDefinition>,
    /// Counter behind generated ids; only ever increases.
    next_id: u64,
}

impl ChartRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition. Rejects a malformed definition or a taken id.
    pub fn add(&mut self, chart: ChartDefinition) -> Result<&ChartDefinition> {
        chart.validate_shape()?;
        if self.get(&chart.id).is_some() {
            return Err(ChartflowError::DuplicateChartId(chart.id));
        }
        debug!(id = %chart.id, chart_type = %chart.chart_type, "added chart");
        self.charts.push(chart);
        Ok(&self.charts[self.charts.len() - 1])
    }

    /// Register a draft under a freshly generated id.
    pub fn create(&mut self, draft: ChartDraft, palette: &[String]) -> Result<&ChartDefinition> {
        let id = self.generate_id();
        self.add(draft.into_definition(id, palette))
    }

    /// Next unused generated id (`chart-1`, `chart-2`, ...).
    pub fn generate_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("chart-{}", self.next_id);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Remove a definition by id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<ChartDefinition> {
        let position = self.charts.iter().position(|c| c.id == id)?;
        debug!(id, "removed chart");
        Some(self.charts.remove(position))
    }

    /// Look up a definition.
    pub fn get(&self, id: &str) -> Option<&ChartDefinition> {
        self.charts.iter().find(|c| c.id == id)
    }

    /// All definitions in order.
    pub fn list(&self) -> &[ChartDefinition] {
        &self.charts
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Dangling column references of every chart, in order.
    pub fn dangling(&self, dataset: &Dataset) -> Vec<ChartflowError> {
        self.charts
            .iter()
            .filter_map(|chart| chart.validate_against(dataset).err())
            .collect()
    }
}
