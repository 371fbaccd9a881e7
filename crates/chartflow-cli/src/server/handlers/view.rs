//! Search, sort, pagination and export handlers.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chartflow::view::DEFAULT_PAGE_SIZE;
use chartflow::{CellValue, SortDirection, SortState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for searching.
#[derive(Deserialize)]
pub struct SearchRequest {
    pub term: String,
}

/// Request body for sorting. Without a direction the column toggles.
#[derive(Deserialize)]
pub struct SortRequest {
    pub column: String,
    pub direction: Option<SortDirection>,
}

/// Query parameters for paging.
#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn first_page() -> usize {
    1
}

fn default_per_page() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Current view state.
#[derive(Serialize)]
pub struct ViewResponse {
    pub search_term: String,
    pub sort: Option<SortState>,
    /// Rows in the view.
    pub total_rows: usize,
    /// Rows in the dataset.
    pub dataset_rows: usize,
}

/// One page of rows.
#[derive(Serialize)]
pub struct PageResponse {
    pub page: usize,
    pub per_page: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    pub columns: Vec<String>,
    pub rows: Vec<IndexMap<String, CellValue>>,
}

fn view_response(session: &chartflow::Session) -> ViewResponse {
    ViewResponse {
        search_term: session.search_term().to_string(),
        sort: session.sort_state().cloned(),
        total_rows: session.view().len(),
        dataset_rows: session.dataset().row_count(),
    }
}

/// GET /api/view
pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let session = state.session.read().await;
    Json(view_response(&session))
}

/// POST /api/view/search
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Json<ViewResponse> {
    let mut session = state.session.write().await;
    session.search(&req.term);
    Json(view_response(&session))
}

/// POST /api/view/sort
pub async fn sort(
    State(state): State<AppState>,
    Json(req): Json<SortRequest>,
) -> Result<Json<ViewResponse>, ApiError> {
    let mut session = state.session.write().await;
    match req.direction {
        Some(direction) => session.sort(SortState::new(req.column, direction))?,
        None => session.toggle_sort(&req.column)?,
    };
    Ok(Json(view_response(&session)))
}

/// GET /api/view/page?page=..&per_page=..
pub async fn get_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<PageResponse> {
    let session = state.session.read().await;
    let page = session.page(query.page, query.per_page);
    let dataset = session.dataset();

    let rows = page
        .rows
        .iter()
        .filter_map(|&idx| dataset.rows().get(idx))
        .map(|row| row.cells.clone())
        .collect();

    Json(PageResponse {
        page: page.number,
        per_page: page.per_page,
        total_rows: page.total_rows,
        total_pages: page.total_pages,
        columns: dataset.columns().to_vec(),
        rows,
    })
}

/// GET /api/export
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = state.session.read().await;
    let csv = session.export_csv()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"export.csv\""),
        ],
        csv,
    ))
}
