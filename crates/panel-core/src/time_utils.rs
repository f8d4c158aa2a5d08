use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::{PanelError, Result};

/// Naive layouts accepted when a timestamp carries no offset. Such values are
/// interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an ISO 8601 / RFC 3339 reset timestamp into a UTC [`DateTime`].
///
/// Accepts the `Z` suffix, any fixed offset, fractional seconds, and naive
/// date-times (taken as UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(PanelError::TimestampParse(s.to_string()));
    }

    let normalised = match trimmed.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(PanelError::TimestampParse(s.to_string()))
}

/// Lenient form of [`parse_timestamp`] for display paths.
///
/// `None` in, or an unparseable string, yields `None`; the latter is logged.
pub fn parse_reset_at(s: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = s?;
    match parse_timestamp(raw) {
        Ok(dt) => Some(dt),
        Err(e) => {
            warn!(error = %e, "ignoring unparseable reset timestamp");
            None
        }
    }
}
