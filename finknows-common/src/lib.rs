//! # FinKnows Common Library
//!
//! Shared code for the FinKnows service and its tools:
//! - Sentiment types (labels, class scores, classification results)
//! - Configuration loading and data folder resolution
//! - Common error type
//! - Utility functions (timestamps, short identifiers)

pub mod config;
pub mod error;
pub mod sentiment;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use sentiment::{ClassScores, ClassificationResult, Label};
