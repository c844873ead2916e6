//! Explanation of one classification: narrative summary plus advisory

use super::advisory::synthesize_advisory;
use super::narrative::synthesize_narrative;
use finknows_common::ClassificationResult;
use serde::Serialize;

/// Synthesized text for one classified document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub summary: String,
    pub investment_advice: String,
}

/// Explain `classification` of `text`
///
/// Both synthesizers are pure and independent of each other.
pub fn explain(text: &str, classification: &ClassificationResult) -> Explanation {
    Explanation {
        summary: synthesize_narrative(text, classification.label, classification.confidence),
        investment_advice: synthesize_advisory(
            text,
            classification.label,
            classification.confidence,
            &classification.scores,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finknows_common::ClassScores;

    #[test]
    fn test_explain_combines_both_outputs() {
        let scores = ClassScores::from_probabilities(&[0.03, 0.05, 0.92]).unwrap();
        let classification = ClassificationResult::from_scores(scores);
        let text = "Apple Inc. reported profit growth of 15%.";

        let explanation = explain(text, &classification);
        assert!(explanation.summary.starts_with("📈 Strong positive sentiment:"));
        assert!(explanation
            .investment_advice
            .starts_with("🚀 Strong bullish signals detected."));
    }
}
