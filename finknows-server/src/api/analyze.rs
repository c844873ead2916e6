//! Document analysis endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::analysis::AnalysisResult;
use crate::error::ApiResult;
use crate::AppState;

/// Request body for POST /analyze
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Missing text is treated like empty text
    #[serde(default)]
    pub text: String,
}

/// POST /analyze
///
/// Classifies the text and returns it with a narrative summary and an
/// investment advisory.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload?;
    let result = state.analyzer.analyze(&request.text).await?;
    Ok(Json(result))
}
