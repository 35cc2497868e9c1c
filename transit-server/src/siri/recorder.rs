//! External failure reporting.

use tracing::warn;

/// Receives notice that a real-time source could not provide data.
///
/// Called once per failed provider call, after which the caller falls back
/// to scheduled data. Implementations decide what "degraded" means
/// downstream (metrics, alerting, ...).
pub trait FailureRecorder: Send + Sync {
    fn record_external_failure(&self, rt_system_id: &str, reason: &str);
}

/// Recorder that only emits a log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailureRecorder;

impl FailureRecorder for LogFailureRecorder {
    fn record_external_failure(&self, rt_system_id: &str, reason: &str) {
        warn!(rt_system_id, reason, "external failure on real-time source");
    }
}
