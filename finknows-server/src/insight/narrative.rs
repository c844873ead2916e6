//! Narrative summary synthesis
//!
//! Builds a one-paragraph summary from the most relevant sentence, the first
//! extracted company, and the first extracted number. The template is chosen
//! from a decision table keyed by `(Label, ConfidenceTier)`.

use super::entities::{extract_companies, extract_numbers};
use super::key_phrases::extract_key_phrases;
use super::relevance::{select_most_relevant, split_sentences};
use finknows_common::Label;
use serde::Serialize;
use tracing::debug;

/// Returned when the document contains no usable sentence
pub const NO_CONTENT_SUMMARY: &str = "Unable to extract meaningful content for summary.";

/// Confidence above which a polar label is reported as "strong"
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// confidence > 0.8
    High,
    /// confidence <= 0.8
    Moderate,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceTier::High
        } else {
            ConfidenceTier::Moderate
        }
    }
}

/// One row of the narrative decision table
///
/// Rendered as `lead + sentence [+ " " entity + entity_suffix]
/// [+ " with " number + number_suffix] + closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeTemplate {
    pub lead: &'static str,
    pub entity_suffix: Option<&'static str>,
    pub number_suffix: Option<&'static str>,
    pub closing: &'static str,
}

const STRONG_POSITIVE: NarrativeTemplate = NarrativeTemplate {
    lead: "📈 Strong positive sentiment: ",
    entity_suffix: Some(" shows promising performance"),
    number_suffix: Some(" growth"),
    closing: ". The analysis suggests optimistic market conditions.",
};

const MODERATE_POSITIVE: NarrativeTemplate = NarrativeTemplate {
    lead: "📊 Moderately positive outlook: ",
    entity_suffix: None,
    number_suffix: None,
    closing: ". Consider monitoring for stronger confirmation signals.",
};

const STRONG_NEGATIVE: NarrativeTemplate = NarrativeTemplate {
    lead: "📉 Strong negative sentiment: ",
    entity_suffix: Some(" faces challenges"),
    number_suffix: Some(" decline"),
    closing: ". The analysis suggests potential risks ahead.",
};

const MODERATE_NEGATIVE: NarrativeTemplate = NarrativeTemplate {
    lead: "⚠️ Moderately negative outlook: ",
    entity_suffix: None,
    number_suffix: None,
    closing: ". Exercise caution and monitor developments.",
};

const BALANCED: NarrativeTemplate = NarrativeTemplate {
    lead: "📊 Balanced analysis: ",
    entity_suffix: Some(" presents mixed signals"),
    number_suffix: None,
    closing: ". The article requires careful consideration.",
};

/// Decision table lookup
pub fn narrative_template(label: Label, tier: ConfidenceTier) -> &'static NarrativeTemplate {
    match (label, tier) {
        (Label::Positive, ConfidenceTier::High) => &STRONG_POSITIVE,
        (Label::Positive, ConfidenceTier::Moderate) => &MODERATE_POSITIVE,
        (Label::Negative, ConfidenceTier::High) => &STRONG_NEGATIVE,
        (Label::Negative, ConfidenceTier::Moderate) => &MODERATE_NEGATIVE,
        (Label::Neutral, _) => &BALANCED,
    }
}

impl NarrativeTemplate {
    /// Fill the template; absent entity or number drops its clause
    pub fn render(&self, sentence: &str, entity: Option<&str>, number: Option<&str>) -> String {
        let mut summary = String::with_capacity(self.lead.len() + sentence.len() + 96);
        summary.push_str(self.lead);
        summary.push_str(sentence);

        if let (Some(suffix), Some(entity)) = (self.entity_suffix, entity) {
            summary.push(' ');
            summary.push_str(entity);
            summary.push_str(suffix);
        }

        if let (Some(suffix), Some(number)) = (self.number_suffix, number) {
            summary.push_str(" with ");
            summary.push_str(number);
            summary.push_str(suffix);
        }

        summary.push_str(self.closing);
        summary
    }
}

/// Summarize `text` for the predicted `label` and `confidence`
pub fn synthesize_narrative(text: &str, label: Label, confidence: f64) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        debug!("No usable sentences, returning fixed summary");
        return NO_CONTENT_SUMMARY.to_string();
    }

    let key_phrases = extract_key_phrases(text);
    let sentence = select_most_relevant(&sentences, label, &key_phrases);
    let companies = extract_companies(text);
    let numbers = extract_numbers(text);

    let tier = ConfidenceTier::from_confidence(confidence);
    debug!(
        ?label,
        ?tier,
        sentences = sentences.len(),
        companies = companies.len(),
        numbers = numbers.len(),
        "Selected narrative template"
    );

    narrative_template(label, tier).render(
        sentence,
        companies.first().map(String::as_str),
        numbers.first().map(String::as_str),
    )
}
