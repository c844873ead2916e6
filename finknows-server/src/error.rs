//! HTTP error type for finknows-server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::analysis::AnalysisError;
use crate::feedback::FeedbackError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Classifier failed or unreachable (503)
    #[error("Analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// Feedback persistence failed (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::AnalysisUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ANALYSIS_UNAVAILABLE",
                msg,
            ),
            ApiError::Storage(msg) => {
                error!("Storage failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg)
            }
            ApiError::Internal(msg) => {
                error!("Internal failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::Store(e) => ApiError::Storage(e.to_string()),
            e @ FeedbackError::Aggregation { .. } => ApiError::Storage(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyText => ApiError::BadRequest("Text is required".to_string()),
            AnalysisError::Unavailable(e) => ApiError::AnalysisUnavailable(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
