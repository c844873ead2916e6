//! Sentiment classification types
//!
//! The upstream classifier produces a 3-class probability vector in the fixed
//! class order negative, neutral, positive. Labels travel on the wire using the
//! classifier's identifiers (`LABEL_0`, `LABEL_1`, `LABEL_2`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance allowed when checking that class probabilities sum to 1
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// Predicted polarity of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "LABEL_0", alias = "negative", alias = "Negative")]
    Negative,
    #[serde(rename = "LABEL_1", alias = "neutral", alias = "Neutral")]
    Neutral,
    #[serde(rename = "LABEL_2", alias = "positive", alias = "Positive")]
    Positive,
}

impl Label {
    /// All labels in classifier index order
    pub const ALL: [Label; 3] = [Label::Negative, Label::Neutral, Label::Positive];

    /// Position of this label in the classifier's probability vector
    pub fn index(self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Neutral => 1,
            Label::Positive => 2,
        }
    }

    /// Label for a probability vector index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Classifier wire identifier (`LABEL_0` .. `LABEL_2`)
    pub fn wire_id(self) -> &'static str {
        match self {
            Label::Negative => "LABEL_0",
            Label::Neutral => "LABEL_1",
            Label::Positive => "LABEL_2",
        }
    }

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Label::Negative => "Negative",
            Label::Neutral => "Neutral",
            Label::Positive => "Positive",
        }
    }

    /// Parse a label from its wire identifier or its name (case-insensitive)
    ///
    /// Returns `None` for anything else; callers that must tolerate unknown
    /// labels (feedback aggregation) rely on this instead of an error.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        match trimmed {
            "LABEL_0" => return Some(Label::Negative),
            "LABEL_1" => return Some(Label::Neutral),
            "LABEL_2" => return Some(Label::Positive),
            _ => {}
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "negative" => Some(Label::Negative),
            "neutral" => Some(Label::Neutral),
            "positive" => Some(Label::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Label::parse(s).ok_or_else(|| Error::Parse(format!("Unknown sentiment label: {}", s)))
    }
}

/// Per-class probabilities in the classifier's class order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl ClassScores {
    /// Build scores from a raw probability vector
    ///
    /// The vector must have exactly three finite entries in [0, 1] summing to
    /// 1 within [`PROBABILITY_SUM_TOLERANCE`].
    pub fn from_probabilities(probabilities: &[f64]) -> Result<Self> {
        if probabilities.len() != 3 {
            return Err(Error::InvalidInput(format!(
                "Expected 3 class probabilities, got {}",
                probabilities.len()
            )));
        }

        if let Some(bad) = probabilities
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(Error::InvalidInput(format!(
                "Class probability out of range: {}",
                bad
            )));
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(Error::InvalidInput(format!(
                "Class probabilities must sum to 1, got {:.6}",
                sum
            )));
        }

        Ok(Self {
            negative: probabilities[0],
            neutral: probabilities[1],
            positive: probabilities[2],
        })
    }

    /// Probability assigned to `label`
    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::Negative => self.negative,
            Label::Neutral => self.neutral,
            Label::Positive => self.positive,
        }
    }

    /// Highest-probability label; ties resolve to the lowest class index
    pub fn argmax(&self) -> Label {
        let mut best = Label::Negative;
        for label in [Label::Neutral, Label::Positive] {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }
}

/// Output of the upstream classifier for one document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f64,
    pub scores: ClassScores,
}

impl ClassificationResult {
    /// Derive label and confidence from the probability vector
    pub fn from_scores(scores: ClassScores) -> Self {
        let label = scores.argmax();
        Self {
            label,
            confidence: scores.get(label),
            scores,
        }
    }
}
