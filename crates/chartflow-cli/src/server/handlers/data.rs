//! Import and dataset overview handlers.

use std::path::PathBuf;

use axum::{extract::State, Json};
use chartflow::input::{Parser, Record};
use chartflow::stats::DatasetSummary;
use chartflow::{CellValue, ImportOutcome, SourceMetadata};
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for importing a file from disk.
#[derive(Deserialize)]
pub struct ImportPathRequest {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

/// Request body for importing rows already decoded by the client.
#[derive(Deserialize)]
pub struct ImportRecordsRequest {
    #[serde(default = "default_source_name")]
    pub name: String,
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

fn default_source_name() -> String {
    "records".to_string()
}

/// Request body for choosing a workbook sheet.
#[derive(Deserialize)]
pub struct SelectSheetRequest {
    pub sheet: String,
}

/// Overview of the active dataset.
#[derive(Serialize)]
pub struct DatasetResponse {
    pub source: Option<SourceMetadata>,
    pub columns: Vec<String>,
    pub rows: usize,
    /// Sheets of the workbook behind the dataset, if any.
    pub sheets: Vec<String>,
}

/// POST /api/import
///
/// Decoding runs off the async runtime. A newer import started meanwhile
/// wins and this one reports `superseded`.
pub async fn import_path(
    State(state): State<AppState>,
    Json(req): Json<ImportPathRequest>,
) -> Result<Json<ImportOutcome>, ApiError> {
    if req.path.as_os_str().is_empty() {
        return Err(ApiError::BadRequest("path must not be empty".to_string()));
    }

    let (ticket, parser_config) = {
        let mut session = state.session.write().await;
        (session.begin_import(), session.config().parser.clone())
    };

    let path = req.path.clone();
    let decoded = tokio::task::spawn_blocking(move || {
        Parser::with_config(parser_config).decode_file(&path)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Import task failed: {}", e)))?;

    let mut session = state.session.write().await;
    let outcome = session.complete_import(ticket, decoded, req.sheet.as_deref())?;
    Ok(Json(outcome))
}

/// POST /api/import/records
pub async fn import_records(
    State(state): State<AppState>,
    Json(req): Json<ImportRecordsRequest>,
) -> Result<Json<ImportOutcome>, ApiError> {
    let records: Vec<Record> = req
        .records
        .iter()
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| (key.clone(), CellValue::from_json(value)))
                .collect()
        })
        .collect();

    let mut session = state.session.write().await;
    Ok(Json(session.import_records(records, &req.name)?))
}

/// POST /api/import/sheet
pub async fn select_sheet(
    State(state): State<AppState>,
    Json(req): Json<SelectSheetRequest>,
) -> Result<Json<ImportOutcome>, ApiError> {
    let mut session = state.session.write().await;
    Ok(Json(session.select_sheet(&req.sheet)?))
}

/// GET /api/dataset
pub async fn get_dataset(State(state): State<AppState>) -> Json<DatasetResponse> {
    let session = state.session.read().await;
    Json(DatasetResponse {
        source: session.source().cloned(),
        columns: session.dataset().columns().to_vec(),
        rows: session.dataset().row_count(),
        sheets: session.sheet_names(),
    })
}

/// GET /api/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<DatasetSummary> {
    let session = state.session.read().await;
    Json(session.summary())
}
