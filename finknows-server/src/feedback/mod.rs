//! User feedback on classifier predictions
//!
//! A submission is validated, recorded as an immutable event, then folded
//! into the cumulative statistics. The recorded events also feed the offline
//! [`FeedbackReport`].

pub mod aggregator;
pub mod model;
pub mod recorder;
pub mod report;
pub mod statistics;
pub mod store;

pub use aggregator::FeedbackAggregator;
pub use model::{FeedbackEvent, FeedbackId, FeedbackReceipt, FeedbackSubmission, UserJudgment};
pub use recorder::{validate_submission, FeedbackRecorder, ValidatedFeedback};
pub use report::FeedbackReport;
pub use statistics::{FeedbackStatistics, SentimentDistribution};
pub use store::{EventStore, FeedbackStores, StatisticsStore, StoreError};

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Characters of the text shown when logging an inaccurate prediction
const LOG_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The event is stored but the aggregate was not updated
    #[error("Feedback {id} recorded but statistics not updated: {source}")]
    Aggregation { id: FeedbackId, source: StoreError },
}

impl FeedbackError {
    /// Rejected before anything was persisted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FeedbackError::MissingField(_) | FeedbackError::InvalidField { .. }
        )
    }
}

/// Feedback entry point shared by the HTTP handlers
pub struct FeedbackService {
    recorder: FeedbackRecorder,
    aggregator: FeedbackAggregator,
    events: Arc<dyn EventStore>,
}

impl FeedbackService {
    pub fn new(stores: FeedbackStores) -> Self {
        Self {
            recorder: FeedbackRecorder::new(stores.events.clone()),
            aggregator: FeedbackAggregator::new(stores.statistics),
            events: stores.events,
        }
    }

    /// Validate, record and aggregate one submission
    pub async fn submit(
        &self,
        submission: FeedbackSubmission,
    ) -> Result<FeedbackReceipt, FeedbackError> {
        let validated = validate_submission(submission)?;
        let event = self.recorder.record(validated).await?;

        if !event.is_accurate() {
            warn!(
                "Inaccurate prediction reported ({}): {} -> {}",
                event.id,
                event.predicted_sentiment,
                event.text_preview(LOG_PREVIEW_CHARS)
            );
            if event.is_high_confidence_error() {
                warn!(
                    "High-confidence error ({:.2}) needs priority review: {}",
                    event.confidence_or_zero(),
                    event.id
                );
            }
        }

        let stats = match self.aggregator.apply(&event).await {
            Ok(stats) => stats,
            Err(source) => {
                error!(
                    "Feedback {} is stored but missing from the statistics: {}",
                    event.id, source
                );
                return Err(FeedbackError::Aggregation {
                    id: event.id,
                    source,
                });
            }
        };
        info!(
            "Feedback {} recorded: {} total, accuracy {:.2}%",
            event.id,
            stats.total_feedback,
            stats.accuracy_rate * 100.0
        );

        Ok(FeedbackReceipt::success(event.id))
    }

    pub async fn statistics(&self) -> Result<FeedbackStatistics, FeedbackError> {
        Ok(self.aggregator.snapshot().await?)
    }

    pub async fn events(&self) -> Result<Vec<FeedbackEvent>, FeedbackError> {
        Ok(self.events.list().await?)
    }

    pub async fn report(&self) -> Result<FeedbackReport, FeedbackError> {
        let events = self.events().await?;
        Ok(FeedbackReport::build(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(judgment: &str, confidence: f64) -> FeedbackSubmission {
        FeedbackSubmission {
            text: Some("Bank stocks rallied on rate news".to_string()),
            predicted_sentiment: Some("LABEL_2".to_string()),
            user_feedback: Some(judgment.to_string()),
            predicted_confidence: Some(confidence),
            timestamp: Some("2025-05-02T09:00:00Z".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_records_and_aggregates() {
        let service = FeedbackService::new(FeedbackStores::in_memory());

        let receipt = service.submit(submission("accurate", 0.9)).await.unwrap();
        assert_eq!(receipt.status, "success");
        service.submit(submission("inaccurate", 0.93)).await.unwrap();

        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.total_feedback, 2);
        assert_eq!(stats.high_confidence_errors, 1);
        assert_eq!(stats.accuracy_rate, 0.5);

        let events = service.events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.id == receipt.feedback_id));
    }

    #[tokio::test]
    async fn test_rejected_submission_changes_nothing() {
        let service = FeedbackService::new(FeedbackStores::in_memory());

        let mut bad = submission("accurate", 0.9);
        bad.text = None;
        let err = service.submit(bad).await.unwrap_err();
        assert!(err.is_validation());

        assert_eq!(service.statistics().await.unwrap(), FeedbackStatistics::default());
        assert!(service.events().await.unwrap().is_empty());
    }

    /// Statistics store whose saves always fail
    struct ReadOnlyStatistics;

    #[async_trait::async_trait]
    impl StatisticsStore for ReadOnlyStatistics {
        async fn load(&self) -> Result<FeedbackStatistics, StoreError> {
            Ok(FeedbackStatistics::default())
        }

        async fn save(&self, _statistics: &FeedbackStatistics) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[tokio::test]
    async fn test_failed_aggregation_reports_stored_event_id() {
        let stores = FeedbackStores {
            events: FeedbackStores::in_memory().events,
            statistics: Arc::new(ReadOnlyStatistics),
        };
        let service = FeedbackService::new(stores.clone());

        let err = service.submit(submission("inaccurate", 0.9)).await.unwrap_err();
        assert!(!err.is_validation());
        let FeedbackError::Aggregation { id, .. } = &err else {
            panic!("expected aggregation error, got {:?}", err);
        };
        assert!(err.to_string().contains(id.as_str()));

        // The event itself was kept and can be reconciled by id
        assert!(stores.events.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_report_over_recorded_events() {
        let service = FeedbackService::new(FeedbackStores::in_memory());
        service.submit(submission("inaccurate", 0.85)).await.unwrap();

        let report = service.report().await.unwrap();
        assert_eq!(report.basic.total, 1);
        assert_eq!(report.high_confidence_errors.count, 1);
    }
}
