//! Key-phrase extraction
//!
//! Surfaces the most frequent finance-vocabulary tokens of a document.
//! Vocabulary matching is by substring, so `earn` also matches `learning`;
//! this imprecision is kept because summaries depend on it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Maximum number of phrases returned
pub const MAX_KEY_PHRASES: usize = 3;

/// Returned when no token matches the vocabulary
pub const FALLBACK_KEY_PHRASES: [&str; 3] = ["market", "financial", "analysis"];

/// A token is kept when it contains any of these substrings
pub const FINANCE_VOCABULARY: [&str; 8] = [
    "earn", "revenue", "profit", "stock", "market", "price", "share", "dividend",
];

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Up to three salient finance terms, most frequent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPhraseSet {
    phrases: Vec<String>,
    fallback: bool,
}

impl KeyPhraseSet {
    fn fallback() -> Self {
        Self {
            phrases: FALLBACK_KEY_PHRASES.iter().map(|s| s.to_string()).collect(),
            fallback: true,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.phrases
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// True when no vocabulary token was found and the fixed list was used
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn into_vec(self) -> Vec<String> {
        self.phrases
    }
}

/// Extract key phrases from raw text
///
/// Lower-cases, turns punctuation into whitespace, keeps vocabulary tokens,
/// and ranks them by descending frequency. Equal frequencies keep the order
/// of first occurrence.
pub fn extract_key_phrases(text: &str) -> KeyPhraseSet {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");

    // (token, count) in first-occurrence order
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for token in cleaned.split_whitespace() {
        if !FINANCE_VOCABULARY.iter().any(|term| token.contains(term)) {
            continue;
        }
        match position.get(token) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                position.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }

    if counts.is_empty() {
        return KeyPhraseSet::fallback();
    }

    let mut ranked: Vec<(usize, &str, usize)> = counts
        .into_iter()
        .enumerate()
        .map(|(first_seen, (token, count))| (first_seen, token, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    KeyPhraseSet {
        phrases: ranked
            .into_iter()
            .take(MAX_KEY_PHRASES)
            .map(|(_, token, _)| token.to_string())
            .collect(),
        fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_vocabulary_returns_fallback() {
        let set = extract_key_phrases("The weather was pleasant all week.");
        assert!(set.is_fallback());
        assert_eq!(set.as_slice(), &["market", "financial", "analysis"]);
    }

    #[test]
    fn test_empty_text_returns_fallback() {
        let set = extract_key_phrases("");
        assert!(set.is_fallback());
        assert_eq!(set.into_vec(), vec!["market", "financial", "analysis"]);
    }

    #[test]
    fn test_ranked_by_frequency() {
        let text = "Stock prices fell. Stock futures fell. Profit warnings hit stock markets.";
        let set = extract_key_phrases(text);
        assert!(!set.is_fallback());
        // stock x3; prices, profit, markets x1 each in first-seen order
        assert_eq!(set.as_slice(), &["stock", "prices", "profit"]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let set = extract_key_phrases("dividend revenue earnings revenue dividend earnings");
        assert_eq!(set.as_slice(), &["dividend", "revenue", "earnings"]);
    }

    #[test]
    fn test_at_most_three_phrases() {
        let set = extract_key_phrases("earnings revenue profit stock market price share dividend");
        assert_eq!(set.len(), MAX_KEY_PHRASES);
    }

    #[test]
    fn test_punctuation_is_whitespace() {
        let set = extract_key_phrases("Market-wide sell-off: shares, (shares) & SHARES!");
        assert_eq!(set.as_slice(), &["shares", "market"]);
    }

    #[test]
    fn test_substring_matching_is_kept() {
        // "learning" contains "earn"
        let set = extract_key_phrases("Machine learning is everywhere");
        assert_eq!(set.as_slice(), &["learning"]);
    }

    #[test]
    fn test_phrases_drawn_from_text() {
        let text = "Apple Inc. reported profit growth of 15%.";
        let set = extract_key_phrases(text);
        for phrase in set.iter() {
            assert!(text.to_lowercase().contains(phrase));
        }
        assert_eq!(set.as_slice(), &["profit"]);
    }
}
