//! SIRI (Service Interface for Real Time Information) client.
//!
//! Talks to SIRI "stop monitoring" providers over SOAP to get live next
//! departures at a route point.
//!
//! Key characteristics:
//! - One `GetStopMonitoring` request per stop; the response may contain
//!   visits for every line serving it, so results are filtered on stop,
//!   line and direction
//! - `DirectionName` carries the route code
//! - Providers are flaky: calls are cached, guarded by a circuit breaker,
//!   and failures degrade to "use the base schedule"

mod client;
mod error;
mod recorder;
mod request;
mod response;

pub use client::{SiriClient, SiriConfig, SourceStatus};
pub use error::SiriError;
pub use recorder::{FailureRecorder, LogFailureRecorder};
pub use request::{MESSAGE_IDENTIFIER, stop_monitoring_request};
pub use response::{SIRI_NS, VisitFilter, parse_passages};
