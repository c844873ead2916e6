//! Entity and metric extraction
//!
//! Pulls company-like names and numeric magnitudes out of raw text using the
//! pattern tables in [`super::patterns`]. Output order is reproducible:
//! rule priority first, then position in the text, deduplicated by first
//! sighting.

use super::patterns::{ENTITY_TABLE, METRIC_TABLE};
use std::collections::HashSet;

/// Maximum number of company mentions returned
pub const MAX_ENTITIES: usize = 3;

/// Maximum number of numeric mentions returned
pub const MAX_NUMBERS: usize = 2;

/// Capitalized function words that are never company names
pub const ENTITY_STOP_LIST: [&str; 9] = [
    "The", "This", "That", "They", "When", "What", "Where", "Why", "How",
];

/// Company-like mentions, at most [`MAX_ENTITIES`]
pub fn extract_companies(text: &str) -> Vec<String> {
    let candidates = ENTITY_TABLE.find_all(text).into_iter().map(|m| m.text);

    dedup_first_seen(candidates)
        .into_iter()
        .filter(|name| !ENTITY_STOP_LIST.contains(&name.as_str()))
        .take(MAX_ENTITIES)
        .collect()
}

/// Percentages and magnitudes, at most [`MAX_NUMBERS`], in rule priority order
pub fn extract_numbers(text: &str) -> Vec<String> {
    METRIC_TABLE
        .find_all(text)
        .into_iter()
        .map(|m| m.text)
        .take(MAX_NUMBERS)
        .collect()
}

/// Remove duplicates, keeping the first occurrence of each value in place
fn dedup_first_seen(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
