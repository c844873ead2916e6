//! Cumulative feedback statistics
//!
//! Counters are the source of truth; `accuracy_rate` is always recomputed
//! from them, never adjusted incrementally.

use finknows_common::Label;
use serde::{Deserialize, Serialize};

use super::model::FeedbackEvent;

/// Inaccurate predictions above this confidence count as high-confidence errors
pub const HIGH_CONFIDENCE_ERROR_THRESHOLD: f64 = 0.8;

/// Feedback counts per predicted label, keyed by classifier wire id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(rename = "LABEL_0", default)]
    pub negative: u64,
    #[serde(rename = "LABEL_1", default)]
    pub neutral: u64,
    #[serde(rename = "LABEL_2", default)]
    pub positive: u64,
}

impl SentimentDistribution {
    pub fn get(&self, label: Label) -> u64 {
        match label {
            Label::Negative => self.negative,
            Label::Neutral => self.neutral,
            Label::Positive => self.positive,
        }
    }

    fn increment(&mut self, label: Label) {
        match label {
            Label::Negative => self.negative += 1,
            Label::Neutral => self.neutral += 1,
            Label::Positive => self.positive += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.negative + self.neutral + self.positive
    }
}

/// Aggregate over all recorded feedback events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStatistics {
    #[serde(default)]
    pub total_feedback: u64,
    #[serde(default)]
    pub accurate_predictions: u64,
    #[serde(default)]
    pub inaccurate_predictions: u64,
    #[serde(default)]
    pub accuracy_rate: f64,
    #[serde(default)]
    pub high_confidence_errors: u64,
    #[serde(default)]
    pub sentiment_distribution: SentimentDistribution,
}

impl FeedbackStatistics {
    /// Fold one event into the aggregate
    ///
    /// Unknown labels count toward the totals but not the distribution.
    pub fn record(&mut self, event: &FeedbackEvent) {
        self.total_feedback += 1;

        if event.is_accurate() {
            self.accurate_predictions += 1;
        } else {
            self.inaccurate_predictions += 1;
            if event.is_high_confidence_error() {
                self.high_confidence_errors += 1;
            }
        }

        self.accuracy_rate = self.computed_accuracy_rate();

        if let Some(label) = event.predicted_label() {
            self.sentiment_distribution.increment(label);
        }
    }

    /// accurate / total, or 0.0 when nothing has been recorded
    pub fn computed_accuracy_rate(&self) -> f64 {
        if self.total_feedback == 0 {
            0.0
        } else {
            self.accurate_predictions as f64 / self.total_feedback as f64
        }
    }

    /// Recompute derived fields after loading a persisted document
    pub fn normalized(mut self) -> Self {
        self.accuracy_rate = self.computed_accuracy_rate();
        self
    }

    /// Counters agree with each other and with the derived rate
    pub fn is_consistent(&self) -> bool {
        self.accurate_predictions + self.inaccurate_predictions == self.total_feedback
            && self.high_confidence_errors <= self.inaccurate_predictions
            && self.sentiment_distribution.total() <= self.total_feedback
            && self.accuracy_rate == self.computed_accuracy_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::model::{FeedbackId, UserJudgment};
    use chrono::Utc;

    fn event(label: &str, judgment: UserJudgment, confidence: Option<f64>) -> FeedbackEvent {
        FeedbackEvent {
            id: FeedbackId::generate(),
            text: "Sample text".to_string(),
            predicted_sentiment: label.to_string(),
            user_feedback: judgment,
            predicted_confidence: confidence,
            timestamp: Utc::now(),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_zeroed_statistics_are_well_defined() {
        let stats = FeedbackStatistics::default();
        assert_eq!(stats.total_feedback, 0);
        assert_eq!(stats.computed_accuracy_rate(), 0.0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_record_accurate_and_inaccurate() {
        let mut stats = FeedbackStatistics::default();
        stats.record(&event("LABEL_2", UserJudgment::Accurate, Some(0.9)));
        stats.record(&event("LABEL_0", UserJudgment::Inaccurate, Some(0.95)));
        stats.record(&event("LABEL_1", UserJudgment::Inaccurate, Some(0.5)));
        stats.record(&event("LABEL_2", UserJudgment::Accurate, None));

        assert_eq!(stats.total_feedback, 4);
        assert_eq!(stats.accurate_predictions, 2);
        assert_eq!(stats.inaccurate_predictions, 2);
        assert_eq!(stats.high_confidence_errors, 1);
        assert_eq!(stats.accuracy_rate, 0.5);
        assert_eq!(stats.sentiment_distribution.positive, 2);
        assert_eq!(stats.sentiment_distribution.negative, 1);
        assert_eq!(stats.sentiment_distribution.neutral, 1);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_unknown_label_counts_toward_totals_only() {
        let mut stats = FeedbackStatistics::default();
        stats.record(&event("LABEL_9", UserJudgment::Accurate, Some(0.7)));

        assert_eq!(stats.total_feedback, 1);
        assert_eq!(stats.accurate_predictions, 1);
        assert_eq!(stats.sentiment_distribution.total(), 0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_accuracy_rate_has_no_drift() {
        let mut stats = FeedbackStatistics::default();
        for i in 0..1000u64 {
            let judgment = if i % 3 == 0 {
                UserJudgment::Inaccurate
            } else {
                UserJudgment::Accurate
            };
            stats.record(&event("LABEL_1", judgment, None));
            assert_eq!(
                stats.accuracy_rate,
                stats.accurate_predictions as f64 / stats.total_feedback as f64
            );
        }
        assert_eq!(stats.inaccurate_predictions, 334);
    }

    #[test]
    fn test_persisted_layout_field_names() {
        let mut stats = FeedbackStatistics::default();
        stats.record(&event("LABEL_0", UserJudgment::Accurate, None));
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["total_feedback"], 1);
        assert_eq!(json["accurate_predictions"], 1);
        assert_eq!(json["inaccurate_predictions"], 0);
        assert_eq!(json["accuracy_rate"], 1.0);
        assert_eq!(json["high_confidence_errors"], 0);
        assert_eq!(json["sentiment_distribution"]["LABEL_0"], 1);
        assert_eq!(json["sentiment_distribution"]["LABEL_2"], 0);
    }

    #[test]
    fn test_normalized_repairs_stale_rate() {
        let stats: FeedbackStatistics = serde_json::from_str(
            r#"{"total_feedback": 4, "accurate_predictions": 3, "inaccurate_predictions": 1, "accuracy_rate": 0.1}"#,
        )
        .unwrap();
        let stats = stats.normalized();
        assert_eq!(stats.accuracy_rate, 0.75);
        assert!(stats.is_consistent());
    }
}
