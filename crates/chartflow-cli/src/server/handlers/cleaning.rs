//! Correction and cleaning handlers.

use axum::{extract::State, Json};
use chartflow::transform::TransformChange;
use chartflow::{CleaningOperation, CorrectionCandidate, CorrectionMap, MissingValueMethod};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for filling or dropping missing values.
#[derive(Deserialize)]
pub struct MissingRequest {
    pub column: String,
    pub method: MissingValueMethod,
    pub value: Option<String>,
}

/// Request body for splitting a column.
#[derive(Deserialize)]
pub struct SplitRequest {
    pub column: String,
    pub delimiter: String,
    #[serde(default)]
    pub new_columns: Vec<String>,
}

/// Request body for renaming columns.
#[derive(Deserialize)]
pub struct RenameRequest {
    pub mapping: IndexMap<String, String>,
}

/// GET /api/corrections
pub async fn get_corrections(State(state): State<AppState>) -> Json<CorrectionMap> {
    let session = state.session.read().await;
    Json(session.corrections())
}

/// POST /api/corrections/apply
pub async fn apply_correction(
    State(state): State<AppState>,
    Json(candidate): Json<CorrectionCandidate>,
) -> Result<Json<TransformChange>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.apply_correction(&candidate)?))
}

/// POST /api/corrections/apply-all
pub async fn apply_all_corrections(
    State(state): State<AppState>,
) -> Result<Json<TransformChange>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.apply_all_corrections()?))
}

/// POST /api/operations
///
/// Any cleaning operation in its tagged form, e.g.
/// `{"op": "rename_columns", "mapping": {"a": "b"}}`.
pub async fn apply_operation(
    State(state): State<AppState>,
    Json(operation): Json<CleaningOperation>,
) -> Result<Json<TransformChange>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.apply(&operation)?))
}

/// POST /api/clean/missing
pub async fn handle_missing(
    State(state): State<AppState>,
    Json(req): Json<MissingRequest>,
) -> Result<Json<TransformChange>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.handle_missing(
        &req.column,
        req.method,
        req.value.as_deref(),
    )?))
}

/// POST /api/clean/split
pub async fn split_column(
    State(state): State<AppState>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<TransformChange>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.split_column(
        &req.column,
        &req.delimiter,
        &req.new_columns,
    )?))
}

/// POST /api/clean/rename
pub async fn rename_columns(
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<TransformChange>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.rename_columns(&req.mapping)?))
}
