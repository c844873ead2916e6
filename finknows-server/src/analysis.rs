//! Document analysis: classify, then explain

use finknows_common::{ClassScores, Label};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::classifier::{Classifier, ClassifierError};
use crate::insight::explain;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Text is empty")]
    EmptyText,

    #[error(transparent)]
    Unavailable(#[from] ClassifierError),
}

/// Classification plus its synthesized explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub label: Label,
    pub confidence: f64,
    pub scores: ClassScores,
    pub summary: String,
    pub investment_advice: String,
}

pub struct Analyzer {
    classifier: Arc<dyn Classifier>,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }

        let classification = self.classifier.classify(text).await?;
        let explanation = explain(text, &classification);

        info!(
            "Analyzed {} chars: {} ({:.3})",
            text.chars().count(),
            classification.label.display_name(),
            classification.confidence
        );

        Ok(AnalysisResult {
            label: classification.label,
            confidence: classification.confidence,
            scores: classification.scores,
            summary: explanation.summary,
            investment_advice: explanation.investment_advice,
        })
    }
}
