//! Statistics and correlation handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chartflow::{CorrelationResult, StatisticRecord};
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Query parameters for the correlation endpoint.
#[derive(Deserialize)]
pub struct CorrelationQuery {
    pub x: String,
    pub y: String,
}

/// GET /api/statistics
pub async fn get_statistics(State(state): State<AppState>) -> Json<Vec<StatisticRecord>> {
    let session = state.session.read().await;
    Json(session.statistics())
}

/// GET /api/correlation?x=..&y=..
pub async fn get_correlation(
    State(state): State<AppState>,
    Query(query): Query<CorrelationQuery>,
) -> Result<Json<CorrelationResult>, ApiError> {
    let session = state.session.read().await;
    Ok(Json(session.correlation(&query.x, &query.y)?))
}
