//! SIRI stop monitoring HTTP client.
//!
//! Every outbound call goes through the response cache first, then through
//! the source's circuit breaker. Provider trouble never fails the caller's
//! request: it is logged, recorded as an external failure, and reported as
//! "no real-time data" so the caller can use the base schedule.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, error};

use crate::cache::{CachedResponse, ResponseCache};
use crate::circuit_breaker::{BreakerError, BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig};
use crate::domain::{RealTimePassage, RoutePoint};

use super::error::SiriError;
use super::recorder::{FailureRecorder, LogFailureRecorder};
use super::request::stop_monitoring_request;
use super::response::{VisitFilter, parse_passages};

/// Default timeout for a provider call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a SIRI source.
#[derive(Debug, Clone)]
pub struct SiriConfig {
    /// Real-time system id. Also the cache scope.
    pub id: String,
    /// Stop monitoring endpoint.
    pub service_url: String,
    /// Our login with the provider.
    pub requestor_ref: String,
    /// Tag of the object codes to send and match (defaults to `id`).
    pub object_id_tag: Option<String>,
    /// Tag of destination codes published by this provider.
    pub destination_id_tag: Option<String>,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl SiriConfig {
    /// Create a config with default timeout and breaker settings.
    pub fn new(
        id: impl Into<String>,
        service_url: impl Into<String>,
        requestor_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            service_url: service_url.into(),
            requestor_ref: requestor_ref.into(),
            object_id_tag: None,
            destination_id_tag: None,
            timeout: DEFAULT_TIMEOUT,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }

    /// Match codes published under `tag` instead of the system id.
    pub fn with_object_id_tag(mut self, tag: impl Into<String>) -> Self {
        self.object_id_tag = Some(tag.into());
        self
    }

    /// Set the destination code tag.
    pub fn with_destination_id_tag(mut self, tag: impl Into<String>) -> Self {
        self.destination_id_tag = Some(tag.into());
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set circuit breaker settings.
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }
}

/// Observability snapshot of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub id: String,
    /// Tag of destination codes, if configured.
    pub destination_id_tag: Option<String>,
    /// Call timeout in seconds.
    pub timeout: u64,
    pub circuit_breaker: BreakerSnapshot,
}

/// Client for one SIRI real-time system.
pub struct SiriClient {
    http: reqwest::Client,
    id: String,
    service_url: String,
    requestor_ref: String,
    object_id_tag: String,
    destination_id_tag: Option<String>,
    timeout: Duration,
    breaker: CircuitBreaker,
    cache: ResponseCache,
    recorder: Arc<dyn FailureRecorder>,
}

impl SiriClient {
    /// Create a client. Responses are stored in `cache`, which may be shared
    /// with other sources.
    pub fn new(config: SiriConfig, cache: ResponseCache) -> Result<Self, SiriError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=UTF-8"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let object_id_tag = config.object_id_tag.unwrap_or_else(|| config.id.clone());
        let breaker = CircuitBreaker::new(config.id.clone(), config.circuit_breaker);

        Ok(Self {
            http,
            id: config.id,
            service_url: config.service_url,
            requestor_ref: config.requestor_ref,
            object_id_tag,
            destination_id_tag: config.destination_id_tag,
            timeout: config.timeout,
            breaker,
            cache,
            recorder: Arc::new(LogFailureRecorder),
        })
    }

    /// Report external failures to `recorder` instead of only logging them.
    pub fn with_recorder(mut self, recorder: Arc<dyn FailureRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Real-time system id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tag used to resolve route point codes.
    pub fn object_id_tag(&self) -> &str {
        &self.object_id_tag
    }

    /// Get the next passages at a route point.
    ///
    /// Returns `Ok(None)` when no real-time data could be obtained (the
    /// caller should use the base schedule), and `Ok(Some(..))` with the
    /// matching passages otherwise. Malformed provider responses are errors.
    ///
    /// `_current_dt` is accepted for interface compatibility with other
    /// real-time sources; passages are not filtered against it.
    pub async fn next_passages(
        &self,
        route_point: &RoutePoint,
        count: u32,
        from_dt: DateTime<Utc>,
        _current_dt: DateTime<Utc>,
    ) -> Result<Option<Vec<RealTimePassage>>, SiriError> {
        let Some(stop) = route_point.fetch_stop_id(&self.object_id_tag) else {
            debug!(
                rt_system_id = %self.id,
                tag = %self.object_id_tag,
                "route point has no stop code for this source"
            );
            return Ok(None);
        };

        let request = stop_monitoring_request(from_dt, &self.requestor_ref, stop, count);

        let Some(response) = self.call_siri(&request).await else {
            return Ok(None);
        };
        if !response.is_ok() {
            debug!(
                rt_system_id = %self.id,
                status = response.status,
                "siri provider answered with an error status"
            );
            return Ok(None);
        }

        debug!(rt_system_id = %self.id, stop, body = %response.body, "siri response");

        let filter = VisitFilter {
            stop,
            line: route_point.fetch_line_id(&self.object_id_tag),
            route: route_point.fetch_route_id(&self.object_id_tag),
        };

        match parse_passages(&response.body, &filter) {
            Ok(passages) => Ok(Some(passages)),
            Err(e) => {
                error!(rt_system_id = %self.id, stop, error = %e, "invalid siri response");
                Err(e)
            }
        }
    }

    /// Status snapshot, for observability.
    pub fn status(&self) -> SourceStatus {
        SourceStatus {
            id: self.id.clone(),
            destination_id_tag: self.destination_id_tag.clone(),
            timeout: self.timeout.as_secs(),
            circuit_breaker: self.breaker.snapshot(),
        }
    }

    /// Mark this source's data as degraded.
    pub fn record_external_failure(&self, reason: &str) {
        self.recorder.record_external_failure(&self.id, reason);
    }

    /// Fetch the raw response for `request`, from cache or provider.
    ///
    /// Identical requests in flight at the same time share one provider
    /// call. Returns `None` (after recording the failure once) when the
    /// provider could not be reached.
    async fn call_siri(&self, request: &str) -> Option<Arc<CachedResponse>> {
        let fetch = async {
            debug!(rt_system_id = %self.id, url = %self.service_url, "posting siri request");
            match self.breaker.call(|| self.post(request)).await {
                Ok(response) => Ok(Arc::new(response)),
                Err(e) => {
                    self.report_call_failure(&e);
                    Err(e)
                }
            }
        };

        self.cache.get_or_fetch(&self.id, request, fetch).await.ok()
    }

    fn report_call_failure(&self, err: &BreakerError<reqwest::Error>) {
        match err {
            BreakerError::Open => {
                error!(
                    rt_system_id = %self.id,
                    "siri RT service dead, using base schedule (circuit breaker open)"
                );
                self.record_external_failure("circuit breaker open");
            }
            BreakerError::Inner(e) if e.is_timeout() => {
                error!(
                    rt_system_id = %self.id,
                    error = %e,
                    "siri RT service timeout, using base schedule"
                );
                self.record_external_failure("timeout");
            }
            BreakerError::Inner(e) => {
                error!(
                    rt_system_id = %self.id,
                    error = %e,
                    "siri RT error, using base schedule"
                );
                self.record_external_failure(&e.to_string());
            }
        }
    }

    async fn post(&self, request: &str) -> Result<CachedResponse, reqwest::Error> {
        let response = self
            .http
            .post(&self.service_url)
            .body(request.to_string())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(CachedResponse::new(status, body))
    }
}

impl fmt::Display for SiriClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl fmt::Debug for SiriClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiriClient")
            .field("id", &self.id)
            .field("service_url", &self.service_url)
            .field("object_id_tag", &self.object_id_tag)
            .field("timeout", &self.timeout)
            .field("breaker", &self.breaker)
            .finish_non_exhaustive()
    }
}
