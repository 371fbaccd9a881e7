//! Chart definition registry and chart-ready series.

mod definition;
mod registry;
mod series;

pub use definition::{ChartDefinition, ChartDraft, ChartType};
pub use registry::ChartRegistry;
pub use series::{ChartData, PieSlice, RenderOutcome, RenderedChart, Series, SeriesBuilder};
