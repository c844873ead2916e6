//! Feedback endpoints
//!
//! - POST /feedback: record one user judgment
//! - GET /feedback/statistics: cumulative statistics
//! - GET /feedback/report: report over all recorded events

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::ApiResult;
use crate::feedback::{FeedbackReceipt, FeedbackReport, FeedbackStatistics, FeedbackSubmission};
use crate::AppState;

/// POST /feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> ApiResult<Json<FeedbackReceipt>> {
    let Json(submission) = payload?;
    let receipt = state.feedback.submit(submission).await?;
    Ok(Json(receipt))
}

/// GET /feedback/statistics
pub async fn feedback_statistics(
    State(state): State<AppState>,
) -> ApiResult<Json<FeedbackStatistics>> {
    Ok(Json(state.feedback.statistics().await?))
}

/// GET /feedback/report
pub async fn feedback_report(State(state): State<AppState>) -> ApiResult<Json<FeedbackReport>> {
    Ok(Json(state.feedback.report().await?))
}
