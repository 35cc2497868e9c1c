//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::RealTimePassage;

/// Default number of passages asked of the provider.
pub const DEFAULT_COUNT: u32 = 5;

/// Largest accepted `count`.
pub const MAX_COUNT: u32 = 50;

/// Query for the next passages at a route point.
///
/// Codes are the ones published under the source's object-id tag.
#[derive(Debug, Deserialize)]
pub struct NextPassagesRequest {
    /// Stop point code (SIRI `MonitoringRef`)
    pub stop_point: String,

    /// Line code (SIRI `LineRef`)
    pub line: String,

    /// Route code (SIRI `DirectionName`)
    pub route: String,

    /// Number of passages to ask for (defaults to 5)
    pub count: Option<u32>,

    /// ISO-8601 start time (defaults to now)
    pub from: Option<String>,
}

/// One passage in a response.
#[derive(Debug, Serialize)]
pub struct PassageResult {
    /// Expected departure time (RFC 3339, UTC)
    pub datetime: String,

    /// Destination label, if published
    pub destination: Option<String>,
}

impl From<&RealTimePassage> for PassageResult {
    fn from(p: &RealTimePassage) -> Self {
        Self {
            datetime: p.datetime.to_rfc3339(),
            destination: p.destination.clone(),
        }
    }
}

/// Response to a next passages query.
#[derive(Debug, Serialize)]
pub struct NextPassagesResponse {
    /// Real-time system that answered
    pub rt_system_id: String,

    /// Whether real-time data was available
    pub realtime: bool,

    /// Upcoming passages; `None` means use the base schedule
    pub passages: Option<Vec<PassageResult>>,
}

impl NextPassagesResponse {
    pub fn new(rt_system_id: impl Into<String>, passages: Option<&[RealTimePassage]>) -> Self {
        Self {
            rt_system_id: rt_system_id.into(),
            realtime: passages.is_some(),
            passages: passages.map(|ps| ps.iter().map(PassageResult::from).collect()),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
