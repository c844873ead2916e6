//! Investment advisory synthesis
//!
//! # Decision order
//! 1. Confidence below 0.6: low-confidence caveat, no label-specific text
//! 2. Otherwise a lead-in from the `(Label, ScoreTier)` decision table, where
//!    the tier comes from the score of the predicted class
//!
//! Context addenda are then appended in fixed order (earnings, stock,
//! market), each triggered independently by a case-insensitive substring.

use finknows_common::{ClassScores, Label};
use serde::Serialize;
use tracing::debug;

/// Below this confidence only the caveat is given
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

pub const STRONG_SCORE_THRESHOLD: f64 = 0.85;
pub const MODERATE_SCORE_THRESHOLD: f64 = 0.7;

pub const LOW_CONFIDENCE_CAVEAT: &str = "⚠️ Low confidence analysis. Consider gathering additional information from multiple sources before making investment decisions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    /// score > 0.85
    Strong,
    /// score > 0.7
    Moderate,
    Mild,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score > STRONG_SCORE_THRESHOLD {
            ScoreTier::Strong
        } else if score > MODERATE_SCORE_THRESHOLD {
            ScoreTier::Moderate
        } else {
            ScoreTier::Mild
        }
    }
}

/// Decision table lookup for the advisory lead-in
pub fn advisory_lead(label: Label, tier: ScoreTier) -> &'static str {
    match (label, tier) {
        (Label::Positive, ScoreTier::Strong) => "🚀 Strong bullish signals detected. Consider increasing exposure to related assets while maintaining proper risk management and stop-loss orders.",
        (Label::Positive, ScoreTier::Moderate) => "📈 Positive market sentiment suggests favorable conditions. Monitor for technical confirmation and consider gradual position building.",
        (Label::Positive, ScoreTier::Mild) => "📊 Moderately positive outlook. Maintain current positions and watch for stronger confirmation signals.",
        (Label::Negative, ScoreTier::Strong) => "🔻 Strong bearish signals detected. Consider defensive positions, hedging strategies, or reducing exposure to related assets.",
        (Label::Negative, ScoreTier::Moderate) => "📉 Negative sentiment suggests caution. Review portfolio risk exposure and consider protective measures.",
        (Label::Negative, ScoreTier::Mild) => "⚠️ Moderately negative outlook. Exercise caution and avoid aggressive positions until sentiment improves.",
        (Label::Neutral, _) => "⚖️ Neutral sentiment indicates mixed signals. Focus on fundamental analysis, technical indicators, and wait for clearer directional signals.",
    }
}

/// Context clause appended when any trigger occurs in the text
#[derive(Debug, Clone, Copy)]
pub struct Addendum {
    pub triggers: &'static [&'static str],
    pub clause: &'static str,
}

/// Addenda in append order
pub const ADDENDA: [Addendum; 3] = [
    Addendum {
        triggers: &["earnings", "revenue"],
        clause: " Pay attention to upcoming earnings reports and analyst expectations.",
    },
    Addendum {
        triggers: &["stock", "share"],
        clause: " Monitor stock-specific news and technical levels.",
    },
    Addendum {
        triggers: &["market", "trading"],
        clause: " Consider broader market trends and sector performance.",
    },
];

/// Build the advisory for one classification of `text`
pub fn synthesize_advisory(text: &str, label: Label, confidence: f64, scores: &ClassScores) -> String {
    let mut advice = if confidence < LOW_CONFIDENCE_THRESHOLD {
        debug!(confidence, "Low confidence, skipping label-specific advice");
        LOW_CONFIDENCE_CAVEAT.to_string()
    } else {
        let tier = ScoreTier::from_score(scores.get(label));
        debug!(?label, ?tier, "Selected advisory lead-in");
        advisory_lead(label, tier).to_string()
    };

    let lowered = text.to_lowercase();
    for addendum in &ADDENDA {
        if addendum.triggers.iter().any(|t| lowered.contains(t)) {
            advice.push_str(addendum.clause);
        }
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(neg: f64, neu: f64, pos: f64) -> ClassScores {
        ClassScores::from_probabilities(&[neg, neu, pos]).unwrap()
    }

    #[test]
    fn test_score_tier_boundaries() {
        assert_eq!(ScoreTier::from_score(0.86), ScoreTier::Strong);
        assert_eq!(ScoreTier::from_score(0.85), ScoreTier::Moderate);
        assert_eq!(ScoreTier::from_score(0.71), ScoreTier::Moderate);
        assert_eq!(ScoreTier::from_score(0.7), ScoreTier::Mild);
    }

    #[test]
    fn test_decision_table_is_total_and_distinct() {
        let mut leads = std::collections::HashSet::new();
        for label in [Label::Positive, Label::Negative] {
            for tier in [ScoreTier::Strong, ScoreTier::Moderate, ScoreTier::Mild] {
                assert!(leads.insert(advisory_lead(label, tier)));
            }
        }
        assert!(leads.insert(advisory_lead(Label::Neutral, ScoreTier::Strong)));
        assert_eq!(
            advisory_lead(Label::Neutral, ScoreTier::Strong),
            advisory_lead(Label::Neutral, ScoreTier::Mild)
        );
    }

    #[test]
    fn test_low_confidence_caveat_only() {
        for label in Label::ALL {
            let advice = synthesize_advisory("Nothing relevant here", label, 0.55, &scores(0.2, 0.25, 0.55));
            assert_eq!(advice, LOW_CONFIDENCE_CAVEAT);
        }
    }

    #[test]
    fn test_low_confidence_still_gets_addenda() {
        let advice = synthesize_advisory("stock news", Label::Positive, 0.5, &scores(0.2, 0.3, 0.5));
        assert!(advice.starts_with(LOW_CONFIDENCE_CAVEAT));
        assert!(advice.ends_with(" Monitor stock-specific news and technical levels."));
        assert!(!advice.contains("bullish"));
    }

    #[test]
    fn test_strong_positive() {
        let advice = synthesize_advisory("", Label::Positive, 0.9, &scores(0.05, 0.05, 0.9));
        assert!(advice.starts_with("🚀 Strong bullish signals detected."));
    }

    #[test]
    fn test_tier_uses_class_score_not_confidence() {
        // Neutral carries the remaining mass; positive score 0.75 -> moderate
        let advice = synthesize_advisory("", Label::Positive, 0.75, &scores(0.1, 0.15, 0.75));
        assert!(advice.starts_with("📈 Positive market sentiment"));

        let advice = synthesize_advisory("", Label::Negative, 0.65, &scores(0.65, 0.2, 0.15));
        assert!(advice.starts_with("⚠️ Moderately negative outlook."));
    }

    #[test]
    fn test_neutral_single_template() {
        let advice = synthesize_advisory("", Label::Neutral, 0.95, &scores(0.02, 0.95, 0.03));
        assert!(advice.starts_with("⚖️ Neutral sentiment indicates mixed signals."));
    }

    #[test]
    fn test_all_addenda_in_fixed_order() {
        let text = "MARKET watchers await Earnings as the Stock slides";
        let advice = synthesize_advisory(text, Label::Negative, 0.9, &scores(0.9, 0.05, 0.05));
        assert!(advice.ends_with(
            " Pay attention to upcoming earnings reports and analyst expectations. \
             Monitor stock-specific news and technical levels. \
             Consider broader market trends and sector performance."
        ));
        assert!(advice.starts_with("🔻 Strong bearish signals detected."));
    }

    #[test]
    fn test_alternate_triggers() {
        let advice = synthesize_advisory("revenue per share in trading", Label::Neutral, 0.7, &scores(0.1, 0.7, 0.2));
        let expected_tail = ADDENDA.iter().map(|a| a.clause).collect::<String>();
        assert!(advice.ends_with(&expected_tail));
    }

    #[test]
    fn test_no_addenda_without_triggers() {
        let advice = synthesize_advisory("Weather report", Label::Neutral, 0.9, &scores(0.05, 0.9, 0.05));
        assert_eq!(advice, advisory_lead(Label::Neutral, ScoreTier::Strong));
    }
}
