//! Feedback validation and persistence
//!
//! Validation always completes before anything is written. Ids are short and
//! random; a collision with an existing record is resolved by drawing a new
//! id, never by overwriting.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use super::model::{FeedbackEvent, FeedbackId, FeedbackSubmission, UserJudgment};
use super::store::{EventStore, StoreError};
use super::FeedbackError;

/// Attempts at finding an unused id before giving up
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Submission that passed validation and is ready to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFeedback {
    pub text: String,
    pub predicted_sentiment: String,
    pub user_feedback: UserJudgment,
    pub predicted_confidence: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, FeedbackError> {
    value.ok_or(FeedbackError::MissingField(field))
}

/// Check a raw submission
///
/// Required fields are checked first, in the order text, predicted_sentiment,
/// user_feedback, timestamp; value checks follow.
pub fn validate_submission(
    submission: FeedbackSubmission,
) -> Result<ValidatedFeedback, FeedbackError> {
    let text = required(submission.text, "text")?;
    let predicted_sentiment = required(submission.predicted_sentiment, "predicted_sentiment")?;
    let user_feedback = required(submission.user_feedback, "user_feedback")?;
    let timestamp = required(submission.timestamp, "timestamp")?;

    let user_feedback =
        UserJudgment::parse(&user_feedback).ok_or_else(|| FeedbackError::InvalidField {
            field: "user_feedback",
            reason: format!("expected 'accurate' or 'inaccurate', got '{}'", user_feedback),
        })?;

    let timestamp = finknows_common::time::parse_rfc3339(&timestamp).map_err(|e| {
        FeedbackError::InvalidField {
            field: "timestamp",
            reason: e.to_string(),
        }
    })?;

    if let Some(confidence) = submission.predicted_confidence {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(FeedbackError::InvalidField {
                field: "predicted_confidence",
                reason: format!("must be within [0, 1], got {}", confidence),
            });
        }
    }

    Ok(ValidatedFeedback {
        text,
        predicted_sentiment,
        user_feedback,
        predicted_confidence: submission.predicted_confidence,
        timestamp,
    })
}

type IdSource = Arc<dyn Fn() -> FeedbackId + Send + Sync>;

/// Persists validated feedback as immutable events
pub struct FeedbackRecorder {
    events: Arc<dyn EventStore>,
    id_source: IdSource,
}

impl FeedbackRecorder {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self::with_id_source(events, Arc::new(FeedbackId::generate))
    }

    /// Use a custom id generator
    pub fn with_id_source(events: Arc<dyn EventStore>, id_source: IdSource) -> Self {
        Self { events, id_source }
    }

    /// Append one event, drawing a fresh id on collision
    pub async fn record(&self, feedback: ValidatedFeedback) -> Result<FeedbackEvent, FeedbackError> {
        let mut event = FeedbackEvent {
            id: (self.id_source)(),
            text: feedback.text,
            predicted_sentiment: feedback.predicted_sentiment,
            user_feedback: feedback.user_feedback,
            predicted_confidence: feedback.predicted_confidence,
            timestamp: feedback.timestamp,
            received_at: finknows_common::time::now(),
        };

        let mut attempt = 1;
        loop {
            match self.events.append(&event).await {
                Ok(()) => {
                    debug!("Recorded feedback {}", event.id);
                    return Ok(event);
                }
                Err(StoreError::DuplicateId(id)) if attempt < MAX_ID_ATTEMPTS => {
                    warn!("Feedback id {} already taken, retrying", id);
                    event.id = (self.id_source)();
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
