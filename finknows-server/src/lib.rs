//! finknows-server library - financial sentiment insight service
//!
//! Explains sentiment classifications of financial text (narrative summary
//! and investment advisory) and collects user feedback on their accuracy.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod api;
pub mod classifier;
pub mod error;
pub mod feedback;
pub mod insight;
pub mod logging;

use analysis::Analyzer;
use feedback::FeedbackService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub feedback: Arc<FeedbackService>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, feedback: FeedbackService) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            feedback: Arc::new(feedback),
        }
    }
}

/// Build application router
///
/// CORS is permissive so the browser extension can call the service from any
/// page origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(api::analyze))
        .route("/feedback", post(api::submit_feedback))
        .route("/feedback/statistics", get(api::feedback_statistics))
        .route("/feedback/report", get(api::feedback_report))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_build_timestamp_is_utc_rfc3339() {
        let stamp = env!("BUILD_TIMESTAMP");
        assert!(stamp.ends_with('Z'), "not UTC: {}", stamp);
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(!env!("GIT_HASH").is_empty());
    }
}
