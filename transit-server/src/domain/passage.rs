//! Real-time passage type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Error returned when a SIRI timestamp can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ISO-8601 datetime: {input}")]
pub struct InvalidDateTime {
    input: String,
}

/// One upcoming departure reported by a real-time system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealTimePassage {
    /// Expected departure time.
    pub datetime: DateTime<Utc>,

    /// Destination label, as published by the provider.
    pub destination: Option<String>,
}

impl RealTimePassage {
    /// Create a new passage.
    pub fn new(datetime: DateTime<Utc>, destination: Option<String>) -> Self {
        Self {
            datetime,
            destination,
        }
    }
}

/// Parse an ISO-8601 datetime as published in SIRI feeds.
///
/// Offsets are honoured and normalised to UTC. Datetimes without an offset
/// are taken to be UTC already.
///
/// # Examples
///
/// ```
/// use transit_server::domain::parse_iso_datetime;
///
/// let dt = parse_iso_datetime("2024-01-01T09:05:00+01:00").unwrap();
/// assert_eq!(dt.to_rfc3339(), "2024-01-01T08:05:00+00:00");
///
/// let naive = parse_iso_datetime("2024-01-01T08:05:00").unwrap();
/// assert_eq!(naive, dt);
/// ```
pub fn parse_iso_datetime(s: &str) -> Result<DateTime<Utc>, InvalidDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // %.f accepts an absent fractional part
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| InvalidDateTime {
            input: s.to_string(),
        })
}
