//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chartflow::ChartflowError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from client.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
    /// Error from the chartflow library.
    Chartflow(ChartflowError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Status code for a library error.
fn library_status(err: &ChartflowError) -> StatusCode {
    match err {
        ChartflowError::UnknownColumn(_) | ChartflowError::SheetNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ChartflowError::DuplicateChartId(_)
        | ChartflowError::StaleCorrectionIndex { .. }
        | ChartflowError::DanglingColumnReference { .. } => StatusCode::CONFLICT,
        ChartflowError::InsufficientData(_)
        | ChartflowError::EmptyFile(_)
        | ChartflowError::EmptySheet(_)
        | ChartflowError::NoColumnsDetected => StatusCode::UNPROCESSABLE_ENTITY,
        ChartflowError::Io { .. } | ChartflowError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Chartflow(e) => (library_status(&e), e.kind(), e.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<ChartflowError> for ApiError {
    fn from(err: ChartflowError) -> Self {
        ApiError::Chartflow(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Chartflow(e) => write!(f, "Chartflow error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_status_mapping() {
        let cases = [
            (ChartflowError::UnknownColumn("x".into()), StatusCode::NOT_FOUND),
            (ChartflowError::DuplicateChartId("c".into()), StatusCode::CONFLICT),
            (
                ChartflowError::InsufficientData("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ChartflowError::InvalidArgument("x".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
