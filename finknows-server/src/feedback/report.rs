//! Offline feedback report
//!
//! Summarizes recorded events to point at classifier weaknesses: error
//! distribution per predicted label, confident mistakes, label balance and
//! the vocabulary that keeps showing up in misclassified texts.

use chrono::{DateTime, NaiveDate, Utc};
use finknows_common::Label;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::model::FeedbackEvent;

/// Confident-error examples listed in a report
pub const MAX_ERROR_EXAMPLES: usize = 5;
pub const ERROR_PREVIEW_CHARS: usize = 100;
pub const MAX_FREQUENT_TERMS: usize = 10;
/// Terms must be longer than this many characters
pub const MIN_TERM_CHARS: usize = 3;

pub const HIGH_ERROR_RATE: f64 = 0.3;
pub const MEDIUM_ERROR_RATE: f64 = 0.2;
/// Largest label count above this multiple of the smallest counts as imbalance
pub const IMBALANCE_RATIO: u64 = 3;

const TERM_STOP_LIST: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "can", "this", "that", "these", "those", "i", "you", "he",
    "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word pattern"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStatistics {
    pub total: u64,
    pub accurate: u64,
    pub inaccurate: u64,
    pub accuracy_rate: f64,
    pub date_range: Option<DateRange>,
}

/// Count of events for one predicted label as submitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorExample {
    pub feedback_id: String,
    pub predicted_sentiment: String,
    pub confidence: f64,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighConfidenceErrors {
    pub count: u64,
    pub examples: Vec<ErrorExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    HighErrorRate,
    MediumErrorRate,
    LowErrorRate,
    HighConfidenceErrors,
    LabelImbalance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub message: String,
}

/// Full report over a set of recorded events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackReport {
    pub generated_at: DateTime<Utc>,
    pub basic: BasicStatistics,
    pub errors_by_label: Vec<LabelCount>,
    pub high_confidence_errors: HighConfidenceErrors,
    pub sentiment_distribution: Vec<LabelShare>,
    pub frequent_error_terms: Vec<TermCount>,
    pub suggestions: Vec<Suggestion>,
}

/// Human-readable name for a submitted label, or the raw value when unknown
fn label_name(raw: &str) -> String {
    Label::parse(raw)
        .map(|label| label.display_name().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Count occurrences, ordered by count descending then first appearance
fn count_ranked<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        match positions.get(item) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(item, counts.len());
                counts.push((item.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

impl FeedbackReport {
    pub fn build(events: &[FeedbackEvent]) -> Self {
        let errors: Vec<&FeedbackEvent> = events.iter().filter(|e| !e.is_accurate()).collect();

        let basic = basic_statistics(events, errors.len() as u64);
        let errors_by_label = count_ranked(errors.iter().map(|e| e.predicted_sentiment.as_str()))
            .into_iter()
            .map(|(label, count)| LabelCount {
                name: label_name(&label),
                label,
                count,
            })
            .collect();

        let high_confidence_errors = high_confidence_errors(&errors);
        let sentiment_distribution = sentiment_distribution(events);
        let frequent_error_terms = frequent_terms(&errors);
        let suggestions = suggestions(&basic, &high_confidence_errors, &sentiment_distribution);

        Self {
            generated_at: finknows_common::time::now(),
            basic,
            errors_by_label,
            high_confidence_errors,
            sentiment_distribution,
            frequent_error_terms,
            suggestions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.basic.total == 0
    }
}

fn basic_statistics(events: &[FeedbackEvent], inaccurate: u64) -> BasicStatistics {
    let total = events.len() as u64;
    let accurate = total - inaccurate;
    let accuracy_rate = if total == 0 {
        0.0
    } else {
        accurate as f64 / total as f64
    };

    let first = events.iter().map(|e| e.timestamp).min();
    let last = events.iter().map(|e| e.timestamp).max();
    let date_range = first.zip(last).map(|(first, last)| DateRange {
        first: first.date_naive(),
        last: last.date_naive(),
    });

    BasicStatistics {
        total,
        accurate,
        inaccurate,
        accuracy_rate,
        date_range,
    }
}

fn high_confidence_errors(errors: &[&FeedbackEvent]) -> HighConfidenceErrors {
    let confident: Vec<&&FeedbackEvent> =
        errors.iter().filter(|e| e.is_high_confidence_error()).collect();

    let examples = confident
        .iter()
        .take(MAX_ERROR_EXAMPLES)
        .map(|e| ErrorExample {
            feedback_id: e.id.to_string(),
            predicted_sentiment: e.predicted_sentiment.clone(),
            confidence: e.confidence_or_zero(),
            preview: e.text_preview(ERROR_PREVIEW_CHARS),
        })
        .collect();

    HighConfidenceErrors {
        count: confident.len() as u64,
        examples,
    }
}

fn sentiment_distribution(events: &[FeedbackEvent]) -> Vec<LabelShare> {
    let total = events.len() as f64;
    count_ranked(events.iter().map(|e| e.predicted_sentiment.as_str()))
        .into_iter()
        .map(|(label, count)| LabelShare {
            name: label_name(&label),
            label,
            count,
            percentage: count as f64 / total * 100.0,
        })
        .collect()
}

fn frequent_terms(errors: &[&FeedbackEvent]) -> Vec<TermCount> {
    let lowered: Vec<String> = errors.iter().map(|e| e.text.to_lowercase()).collect();
    let words = lowered
        .iter()
        .flat_map(|text| WORD.find_iter(text).map(|m| m.as_str()))
        .filter(|word| word.chars().count() > MIN_TERM_CHARS && !TERM_STOP_LIST.contains(word));

    count_ranked(words)
        .into_iter()
        .take(MAX_FREQUENT_TERMS)
        .map(|(term, count)| TermCount { term, count })
        .collect()
}

fn suggestions(
    basic: &BasicStatistics,
    confident_errors: &HighConfidenceErrors,
    distribution: &[LabelShare],
) -> Vec<Suggestion> {
    if basic.total == 0 {
        return Vec::new();
    }

    let mut suggestions = Vec::new();
    let error_rate = basic.inaccurate as f64 / basic.total as f64;

    let (kind, message) = if error_rate > HIGH_ERROR_RATE {
        (
            SuggestionKind::HighErrorRate,
            "🔴 High error rate (>30%): retrain the model or add training data".to_string(),
        )
    } else if error_rate > MEDIUM_ERROR_RATE {
        (
            SuggestionKind::MediumErrorRate,
            "🟡 Moderate error rate (20-30%): tune model parameters or add domain-specific data"
                .to_string(),
        )
    } else {
        (
            SuggestionKind::LowErrorRate,
            "🟢 Low error rate (<20%): the model is performing well".to_string(),
        )
    };
    suggestions.push(Suggestion { kind, message });

    if confident_errors.count > 0 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::HighConfidenceErrors,
            message: format!(
                "⚠️ Found {} high-confidence errors; review these samples first",
                confident_errors.count
            ),
        });
    }

    let max = distribution.iter().map(|s| s.count).max();
    let min = distribution.iter().map(|s| s.count).min();
    if let (Some(max), Some(min)) = (max, min) {
        if max > min * IMBALANCE_RATIO {
            suggestions.push(Suggestion {
                kind: SuggestionKind::LabelImbalance,
                message: "📊 Predicted sentiment is unevenly distributed; balance the training data"
                    .to_string(),
            });
        }
    }

    suggestions
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(30))
}

impl fmt::Display for FeedbackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "📈 FinKnows Feedback Analysis Report")?;
        writeln!(f, "{}", "=".repeat(60))?;

        if self.is_empty() {
            writeln!(f, "No feedback recorded.")?;
            return Ok(());
        }

        section(f, "📊 Basic statistics:")?;
        writeln!(f, "Total feedback: {}", self.basic.total)?;
        writeln!(f, "Accurate predictions: {}", self.basic.accurate)?;
        writeln!(f, "Inaccurate predictions: {}", self.basic.inaccurate)?;
        writeln!(f, "Accuracy rate: {:.2}%", self.basic.accuracy_rate * 100.0)?;
        if let Some(range) = &self.basic.date_range {
            writeln!(f, "Date range: {} to {}", range.first, range.last)?;
        }

        section(f, "🚨 Errors by predicted label:")?;
        if self.errors_by_label.is_empty() {
            writeln!(f, "✅ No inaccurate predictions")?;
        }
        for entry in &self.errors_by_label {
            writeln!(f, "  {}: {}", entry.name, entry.count)?;
        }

        section(f, "⚠️ High-confidence errors:")?;
        if self.high_confidence_errors.count == 0 {
            writeln!(f, "✅ No high-confidence errors")?;
        } else {
            writeln!(f, "Found {} high-confidence errors:", self.high_confidence_errors.count)?;
            for example in &self.high_confidence_errors.examples {
                writeln!(
                    f,
                    "  - {} (confidence: {:.2}%): {}",
                    example.predicted_sentiment,
                    example.confidence * 100.0,
                    example.preview
                )?;
            }
        }

        section(f, "📊 Sentiment distribution:")?;
        for share in &self.sentiment_distribution {
            writeln!(f, "{}: {} ({:.1}%)", share.name, share.count, share.percentage)?;
        }

        if !self.frequent_error_terms.is_empty() {
            section(f, "🔍 Frequent terms in inaccurate predictions:")?;
            for term in &self.frequent_error_terms {
                writeln!(f, "  {}: {}", term.term, term.count)?;
            }
        }

        section(f, "💡 Suggestions:")?;
        for suggestion in &self.suggestions {
            writeln!(f, "{}", suggestion.message)?;
        }

        Ok(())
    }
}
