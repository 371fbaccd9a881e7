//! Chart registry and series handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chartflow::charts::{ChartData, RenderedChart};
use chartflow::{ChartDefinition, ChartDraft};
use serde::Deserialize;
use tracing::debug;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for registering a chart. Without an id one is generated.
#[derive(Deserialize)]
pub struct CreateChartRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub draft: ChartDraft,
}

/// GET /api/charts
pub async fn list_charts(State(state): State<AppState>) -> Json<Vec<ChartDefinition>> {
    let session = state.session.read().await;
    Json(session.charts().to_vec())
}

/// POST /api/charts
pub async fn create_chart(
    State(state): State<AppState>,
    Json(req): Json<CreateChartRequest>,
) -> Result<(StatusCode, Json<ChartDefinition>), ApiError> {
    let mut session = state.session.write().await;
    let chart = match req.id {
        Some(id) => {
            let definition = req.draft.into_definition(id, &session.config().palette);
            session.add_chart(definition)?.clone()
        }
        None => session.create_chart(req.draft)?.clone(),
    };
    Ok((StatusCode::CREATED, Json(chart)))
}

/// DELETE /api/charts/:id
///
/// Unknown ids are a no-op.
pub async fn delete_chart(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let mut session = state.session.write().await;
    if session.remove_chart(&id).is_none() {
        debug!(id = %id, "delete of unknown chart ignored");
    }
    StatusCode::NO_CONTENT
}

/// GET /api/charts/:id/data
pub async fn get_chart_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChartData>, ApiError> {
    let session = state.session.read().await;
    if !session.charts().iter().any(|chart| chart.id == id) {
        return Err(ApiError::NotFound(format!("Chart not found: {}", id)));
    }
    Ok(Json(session.chart_data(&id)?))
}

/// GET /api/render
///
/// Every chart over the current view; charts with dangling columns are
/// reported as skipped.
pub async fn render_charts(State(state): State<AppState>) -> Json<Vec<RenderedChart>> {
    let session = state.session.read().await;
    Json(session.render_charts())
}
