//! Explanation engine
//!
//! Pure text heuristics that turn a document and its sentiment classification
//! into a narrative summary and an investment advisory. Nothing here touches
//! shared state, so every function is safe to call from concurrent requests.

pub mod advisory;
pub mod entities;
pub mod explain;
pub mod key_phrases;
pub mod narrative;
pub mod patterns;
pub mod relevance;

pub use advisory::synthesize_advisory;
pub use entities::{extract_companies, extract_numbers};
pub use explain::{explain, Explanation};
pub use key_phrases::{extract_key_phrases, KeyPhraseSet};
pub use narrative::synthesize_narrative;
pub use relevance::{select_most_relevant, split_sentences};
