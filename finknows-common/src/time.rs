//! Timestamp utilities

use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse an RFC 3339 timestamp (e.g. `2025-01-15T10:30:00Z`) into UTC
///
/// Offsets other than `Z` are accepted and normalized to UTC.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("Invalid RFC 3339 timestamp '{}': {}", s, e)))
}
