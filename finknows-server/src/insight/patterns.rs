//! Declarative pattern tables
//!
//! Each text heuristic is a static table of `(category, pattern)` rows.
//! A table is compiled once and evaluated row by row in declaration order;
//! matches from one row are collected left to right, without overlap, and
//! rows are concatenated. Output order is therefore fully determined by the
//! table and the input text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// One row of a pattern table
#[derive(Debug, Clone, Copy)]
pub struct PatternRule<K: 'static> {
    pub kind: K,
    pub pattern: &'static str,
}

/// A text match tagged with the category of the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mention<K> {
    pub kind: K,
    pub text: String,
}

/// Compiled pattern table, evaluated in fixed priority order
pub struct PatternTable<K: 'static> {
    rules: Vec<(K, Regex)>,
}

impl<K: Copy> PatternTable<K> {
    /// Compile a static rule set
    ///
    /// Patterns are compile-time constants; an invalid one is a programming
    /// error caught by the table tests below.
    pub fn compile(rules: &[PatternRule<K>]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| {
                let regex = Regex::new(rule.pattern).expect("valid pattern table entry");
                (rule.kind, regex)
            })
            .collect();
        Self { rules }
    }

    /// All matches of all rows, in row order then text order
    pub fn find_all(&self, text: &str) -> Vec<Mention<K>> {
        self.rules
            .iter()
            .flat_map(|(kind, regex)| {
                regex.find_iter(text).map(move |m| Mention {
                    kind: *kind,
                    text: m.as_str().to_string(),
                })
            })
            .collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Company-like surface forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Capitalized word followed by a legal suffix ("Apple Inc")
    LegalName,
    /// All-uppercase token of two or more letters ("AAPL")
    Ticker,
    /// Two consecutive capitalized words ("Federal Reserve")
    CapitalizedPair,
}

/// Numeric magnitudes worth quoting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Percentage,
    /// Dollar amount, optionally with an M/B/K suffix
    Currency,
    /// Bare number with an M/B/K suffix
    Magnitude,
}

pub const ENTITY_RULES: &[PatternRule<EntityKind>] = &[
    PatternRule {
        kind: EntityKind::LegalName,
        pattern: r"\b[A-Z][a-z]+ (?:Inc|Corp|Ltd|LLC|Company|Co)\b",
    },
    PatternRule {
        kind: EntityKind::Ticker,
        pattern: r"\b[A-Z]{2,}\b",
    },
    PatternRule {
        kind: EntityKind::CapitalizedPair,
        pattern: r"\b[A-Z][a-z]+ [A-Z][a-z]+\b",
    },
];

pub const METRIC_RULES: &[PatternRule<MetricKind>] = &[
    PatternRule {
        kind: MetricKind::Percentage,
        pattern: r"\d+\.?\d*%",
    },
    PatternRule {
        kind: MetricKind::Currency,
        pattern: r"\$\d+\.?\d*[MBK]?",
    },
    PatternRule {
        kind: MetricKind::Magnitude,
        pattern: r"\d+\.?\d*[MBK]",
    },
];

pub static ENTITY_TABLE: Lazy<PatternTable<EntityKind>> =
    Lazy::new(|| PatternTable::compile(ENTITY_RULES));

pub static METRIC_TABLE: Lazy<PatternTable<MetricKind>> =
    Lazy::new(|| PatternTable::compile(METRIC_RULES));
