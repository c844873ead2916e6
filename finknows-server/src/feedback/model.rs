//! Feedback data types

use chrono::{DateTime, Utc};
use finknows_common::{uuid_utils, Label};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::statistics::HIGH_CONFIDENCE_ERROR_THRESHOLD;

/// A user's verdict on one prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserJudgment {
    Accurate,
    Inaccurate,
}

impl UserJudgment {
    pub fn as_str(self) -> &'static str {
        match self {
            UserJudgment::Accurate => "accurate",
            UserJudgment::Inaccurate => "inaccurate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "accurate" => Some(UserJudgment::Accurate),
            "inaccurate" => Some(UserJudgment::Inaccurate),
            _ => None,
        }
    }
}

impl fmt::Display for UserJudgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short opaque identifier of a recorded feedback event
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(String);

impl FeedbackId {
    /// New random identifier (8 lowercase hex digits)
    pub fn generate() -> Self {
        Self(uuid_utils::short_id())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feedback as submitted by a client, before validation
///
/// Every field is optional here so that a missing field can be reported by
/// name instead of as a generic decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackSubmission {
    pub text: Option<String>,
    pub predicted_sentiment: Option<String>,
    pub user_feedback: Option<String>,
    pub predicted_confidence: Option<f64>,
    pub timestamp: Option<String>,
}

/// A recorded feedback event; immutable once persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub id: FeedbackId,
    pub text: String,
    /// Label as submitted; may be outside the known classes
    pub predicted_sentiment: String,
    pub user_feedback: UserJudgment,
    #[serde(default)]
    pub predicted_confidence: Option<f64>,
    /// Client-side time of the judgment
    pub timestamp: DateTime<Utc>,
    /// Server-side time the event was recorded
    pub received_at: DateTime<Utc>,
}

impl FeedbackEvent {
    /// Known label, if the submitted one is recognized
    pub fn predicted_label(&self) -> Option<Label> {
        Label::parse(&self.predicted_sentiment)
    }

    pub fn is_accurate(&self) -> bool {
        self.user_feedback == UserJudgment::Accurate
    }

    /// Confidence used for thresholding; absent counts as 0
    pub fn confidence_or_zero(&self) -> f64 {
        self.predicted_confidence.unwrap_or(0.0)
    }

    /// Judged inaccurate although the classifier was confident
    pub fn is_high_confidence_error(&self) -> bool {
        !self.is_accurate() && self.confidence_or_zero() > HIGH_CONFIDENCE_ERROR_THRESHOLD
    }

    /// First `max_chars` characters of the text, with an ellipsis when cut
    pub fn text_preview(&self, max_chars: usize) -> String {
        preview(&self.text, max_chars)
    }
}

pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Response returned to the client after a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub status: String,
    pub message: String,
    pub feedback_id: FeedbackId,
}

impl FeedbackReceipt {
    pub fn success(feedback_id: FeedbackId) -> Self {
        Self {
            status: "success".to_string(),
            message: "Feedback received successfully".to_string(),
            feedback_id,
        }
    }
}
