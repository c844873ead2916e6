//! Sentence relevance scoring
//!
//! Splits a document into sentences and picks the one that best represents
//! the predicted sentiment.
//!
//! # Scoring
//! - +2 for each key phrase contained in the sentence (case-insensitive)
//! - +1 for each polarity word of the predicted label contained in the
//!   sentence (Positive and Negative only)
//! - +1 if the sentence quotes a percentage or a decimal number
//!
//! # Selection
//! Highest score wins; equal scores resolve to the earliest sentence in the
//! document. A top score of 0 selects the first sentence.

use super::key_phrases::KeyPhraseSet;
use finknows_common::Label;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentences shorter than this many characters are discarded
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Returned when no sentence survives splitting
pub const NO_SENTENCE_PLACEHOLDER: &str = "The article discusses market developments.";

pub const POSITIVE_WORDS: [&str; 8] = [
    "growth", "profit", "gain", "increase", "rise", "surge", "success", "positive",
];

pub const NEGATIVE_WORDS: [&str; 8] = [
    "loss", "decline", "fall", "drop", "crash", "risk", "concern", "negative",
];

const KEY_PHRASE_WEIGHT: u32 = 2;

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("invalid sentence break pattern"));

static METRIC_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+%|\d+\.\d+").expect("invalid metric hint pattern"));

/// A candidate sentence with its position and score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSentence<'a> {
    /// Position among surviving sentences (document order)
    pub index: usize,
    pub text: &'a str,
    pub score: u32,
}

/// Split on runs of terminal punctuation, trim, and keep sentences of at
/// least [`MIN_SENTENCE_CHARS`] characters
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

/// Polarity words that earn a bonus for `label`
pub fn polarity_words(label: Label) -> &'static [&'static str] {
    match label {
        Label::Positive => &POSITIVE_WORDS,
        Label::Negative => &NEGATIVE_WORDS,
        Label::Neutral => &[],
    }
}

/// Relevance score of one sentence
pub fn score_sentence(sentence: &str, label: Label, key_phrases: &KeyPhraseSet) -> u32 {
    let lowered = sentence.to_lowercase();

    let phrase_hits = key_phrases
        .iter()
        .filter(|phrase| lowered.contains(&phrase.to_lowercase()))
        .count() as u32;

    let polarity_hits = polarity_words(label)
        .iter()
        .filter(|word| lowered.contains(*word))
        .count() as u32;

    let metric_bonus = u32::from(METRIC_HINT.is_match(sentence));

    phrase_hits * KEY_PHRASE_WEIGHT + polarity_hits + metric_bonus
}

/// Score every sentence, preserving document order
pub fn score_sentences<'a>(
    sentences: &[&'a str],
    label: Label,
    key_phrases: &KeyPhraseSet,
) -> Vec<ScoredSentence<'a>> {
    sentences
        .iter()
        .enumerate()
        .map(|(index, &text)| ScoredSentence {
            index,
            text,
            score: score_sentence(text, label, key_phrases),
        })
        .collect()
}

/// Pick the most relevant sentence
///
/// Never empty: falls back to the first sentence when nothing scores, and to
/// [`NO_SENTENCE_PLACEHOLDER`] when there are no sentences at all.
pub fn select_most_relevant<'a>(
    sentences: &[&'a str],
    label: Label,
    key_phrases: &KeyPhraseSet,
) -> &'a str {
    let scored = score_sentences(sentences, label, key_phrases);

    let mut best: Option<ScoredSentence<'a>> = None;
    for candidate in scored {
        // Strictly greater: an equal score never displaces an earlier sentence
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    match best {
        None => NO_SENTENCE_PLACEHOLDER,
        Some(top) if top.score == 0 => sentences[0],
        Some(top) => top.text,
    }
}
