//! # Temporal Types
//!
//! UTC-only timestamps with second precision, plus calendar-date parsing
//! for claim fields such as a course completion date.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp truncated to whole seconds.
///
/// Serializes as RFC 3339 with a `Z` suffix (`2026-01-15T12:00:00Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }

    /// Wrap a `DateTime<Utc>`, truncating sub-second precision.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(0))
    }

    /// Access the underlying `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// ISO 8601 with `Z` suffix, no fractional seconds.
    pub fn to_canonical_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Parse a `YYYY-MM-DD` calendar date that must not lie after `today`.
///
/// `today` is passed in so callers and tests agree on the reference date.
pub fn parse_calendar_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))?;
    // chrono accepts unpadded fields; require the strict ten-character form.
    if date.format("%Y-%m-%d").to_string() != trimmed {
        return Err(ValidationError::InvalidDate(trimmed.to_string()));
    }
    if date > today {
        return Err(ValidationError::FutureDate(trimmed.to_string()));
    }
    Ok(date)
}
