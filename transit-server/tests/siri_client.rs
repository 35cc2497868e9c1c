//! Integration tests for the SIRI client using WireMock
//!
//! These tests mock a stop monitoring provider to verify caching, circuit
//! breaking and failure reporting over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use transit_server::cache::{CacheConfig, ResponseCache};
use transit_server::circuit_breaker::{CircuitBreakerConfig, CircuitState};
use transit_server::domain::{RealTimePassage, RoutePoint};
use transit_server::siri::{FailureRecorder, SiriClient, SiriConfig, SiriError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Default)]
struct RecordingRecorder {
    failures: Mutex<Vec<(String, String)>>,
}

impl RecordingRecorder {
    fn reasons(&self) -> Vec<String> {
        self.failures.lock().iter().map(|(_, r)| r.clone()).collect()
    }
}

impl FailureRecorder for RecordingRecorder {
    fn record_external_failure(&self, rt_system_id: &str, reason: &str) {
        self.failures
            .lock()
            .push((rt_system_id.to_string(), reason.to_string()));
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
}

fn cache() -> ResponseCache {
    ResponseCache::new(&CacheConfig::default())
}

fn config(server: &MockServer) -> SiriConfig {
    SiriConfig::new("siri", format!("{}/siri", server.uri()), "test_login")
}

fn client(config: SiriConfig, cache: ResponseCache) -> (SiriClient, Arc<RecordingRecorder>) {
    let recorder = Arc::new(RecordingRecorder::default());
    let client = SiriClient::new(config, cache)
        .unwrap()
        .with_recorder(recorder.clone());
    (client, recorder)
}

fn route_point() -> RoutePoint {
    RoutePoint::single_tag("siri", "STOP_1", "L1", "Northbound")
}

fn visit(stop: &str, line: &str, direction: &str, dest: &str, dt: &str) -> String {
    format!(
        r#"<siri:MonitoredStopVisit>
             <siri:MonitoringRef>{stop}</siri:MonitoringRef>
             <siri:MonitoredVehicleJourney>
               <siri:LineRef>{line}</siri:LineRef>
               <siri:DirectionName>{direction}</siri:DirectionName>
               <siri:DestinationName>{dest}</siri:DestinationName>
               <siri:MonitoredCall>
                 <siri:StopPointRef>{stop}</siri:StopPointRef>
                 <siri:ExpectedDepartureTime>{dt}</siri:ExpectedDepartureTime>
               </siri:MonitoredCall>
             </siri:MonitoredVehicleJourney>
           </siri:MonitoredStopVisit>"#
    )
}

/// Sample stop monitoring response
fn stop_monitoring_response(visits: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<S:Envelope xmlns:S="http://schemas.xmlsoap.org/soap/envelope/">
  <S:Body>
    <ns8:GetStopMonitoringResponse xmlns:siri="http://www.siri.org.uk/siri" xmlns:ns8="http://wsdl.siri.org.uk">
      <Answer>
        <siri:StopMonitoringDelivery version="1.3">
          {}
        </siri:StopMonitoringDelivery>
      </Answer>
    </ns8:GetStopMonitoringResponse>
  </S:Body>
</S:Envelope>"#,
        visits.join("\n")
    )
}

fn downtown_response() -> String {
    stop_monitoring_response(&[
        visit("STOP_1", "L1", "Northbound", "Downtown", "2024-01-01T08:05:00"),
        visit("STOP_1", "L2", "Northbound", "Uptown", "2024-01-01T08:07:00"),
        visit("STOP_1", "L1", "Southbound", "Harbour", "2024-01-01T08:09:00"),
    ])
}

/// A provider that answers after `delay`.
async fn mount_slow(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/siri"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(downtown_response())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

// =============================================================================
// Passages
// =============================================================================

mod passage_tests {
    use super::*;

    #[tokio::test]
    async fn returns_matching_passages_only() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/siri"))
            .and(header("content-type", "text/xml; charset=UTF-8"))
            .and(body_string_contains(
                "<siri:MonitoringRef>STOP_1</siri:MonitoringRef>",
            ))
            .and(body_string_contains(
                "<siri:MaximumStopVisits>3</siri:MaximumStopVisits>",
            ))
            .and(body_string_contains(
                "<siri:RequestorRef>test_login</siri:RequestorRef>",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(downtown_response()))
            .expect(1)
            .mount(&server)
            .await;

        let (client, recorder) = client(config(&server), cache());
        let passages = client
            .next_passages(&route_point(), 3, now(), now())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            passages,
            vec![RealTimePassage::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 8, 5, 0).unwrap(),
                Some("Downtown".to_string()),
            )]
        );
        assert!(recorder.reasons().is_empty());
    }

    #[tokio::test]
    async fn object_id_tag_selects_codes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains(
                "<siri:MonitoringRef>STOP_1</siri:MonitoringRef>",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(downtown_response()))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client(config(&server).with_object_id_tag("provider"), cache());
        let rp = RoutePoint::single_tag("provider", "STOP_1", "L1", "Northbound");

        let passages = client.next_passages(&rp, 3, now(), now()).await.unwrap().unwrap();
        assert_eq!(passages.len(), 1);

        // Codes under the system id are ignored once a tag is configured
        let result = client.next_passages(&route_point(), 3, now(), now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn error_status_means_no_realtime() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .expect(1)
            .mount(&server)
            .await;

        let (client, recorder) = client(config(&server), cache());
        let result = client.next_passages(&route_point(), 3, now(), now()).await.unwrap();

        assert!(result.is_none());
        assert!(recorder.reasons().is_empty());
        assert_eq!(client.status().circuit_breaker.fail_counter, 0);
    }

    #[tokio::test]
    async fn invalid_xml_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<Envelope><unclosed>"))
            .mount(&server)
            .await;

        let (client, _) = client(config(&server), cache());
        let err = client
            .next_passages(&route_point(), 3, now(), now())
            .await
            .unwrap_err();

        assert!(matches!(err, SiriError::InvalidXml(_)));
    }

    #[tokio::test]
    async fn matching_visit_without_time_is_an_error() {
        let server = MockServer::start().await;
        let body = stop_monitoring_response(&[visit(
            "STOP_1",
            "L1",
            "Northbound",
            "Downtown",
            "soon",
        )]);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let (client, _) = client(config(&server), cache());
        let err = client
            .next_passages(&route_point(), 3, now(), now())
            .await
            .unwrap_err();

        assert!(matches!(err, SiriError::MalformedVisit(_)));
    }
}

// =============================================================================
// Caching
// =============================================================================

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn identical_queries_hit_provider_once() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(downtown_response()))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client(config(&server), cache());
        let first = client.next_passages(&route_point(), 3, now(), now()).await.unwrap();
        let second = client.next_passages(&route_point(), 3, now(), now()).await.unwrap();

        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[tokio::test]
    async fn concurrent_identical_queries_share_one_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(downtown_response())
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client(config(&server), cache());
        let rp = route_point();
        let (first, second) = tokio::join!(
            client.next_passages(&rp, 3, now(), now()),
            client.next_passages(&rp, 3, now(), now()),
        );

        let first = first.unwrap();
        assert!(first.is_some());
        assert_eq!(first, second.unwrap());
    }

    #[tokio::test]
    async fn different_queries_are_cached_separately() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(downtown_response()))
            .expect(2)
            .mount(&server)
            .await;

        let (client, _) = client(config(&server), cache());
        client.next_passages(&route_point(), 3, now(), now()).await.unwrap();
        client.next_passages(&route_point(), 4, now(), now()).await.unwrap();
        client.next_passages(&route_point(), 3, now(), now()).await.unwrap();
    }

    #[tokio::test]
    async fn cache_is_scoped_by_system_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(downtown_response()))
            .expect(2)
            .mount(&server)
            .await;

        let shared = cache();
        let (a, _) = client(config(&server), shared.clone());
        let (b, _) = client(config(&server), shared.clone());
        let (other, _) = client(
            SiriConfig::new("other", format!("{}/siri", server.uri()), "test_login")
                .with_object_id_tag("siri"),
            shared,
        );

        // Same id: the second client is served from the first one's entry
        a.next_passages(&route_point(), 3, now(), now()).await.unwrap();
        b.next_passages(&route_point(), 3, now(), now()).await.unwrap();
        // Same request body, different id: a fresh call
        other.next_passages(&route_point(), 3, now(), now()).await.unwrap();
    }

    #[tokio::test]
    async fn error_statuses_are_cached() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client(config(&server), cache());
        assert!(client.next_passages(&route_point(), 3, now(), now()).await.unwrap().is_none());
        assert!(client.next_passages(&route_point(), 3, now(), now()).await.unwrap().is_none());
    }
}

// =============================================================================
// Failures and circuit breaking
// =============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn timeout_is_recorded_once() {
        let server = MockServer::start().await;
        mount_slow(&server, Duration::from_secs(2)).await;

        let (client, recorder) = client(
            config(&server).with_timeout(Duration::from_millis(200)),
            cache(),
        );
        let result = client.next_passages(&route_point(), 3, now(), now()).await.unwrap();

        assert!(result.is_none());
        assert_eq!(recorder.reasons(), vec!["timeout".to_string()]);
        assert_eq!(recorder.failures.lock()[0].0, "siri");
    }

    #[tokio::test]
    async fn concurrent_timeout_is_recorded_once() {
        let server = MockServer::start().await;
        mount_slow(&server, Duration::from_secs(2)).await;

        let (client, recorder) = client(
            config(&server).with_timeout(Duration::from_millis(200)),
            cache(),
        );
        let rp = route_point();
        let (first, second) = tokio::join!(
            client.next_passages(&rp, 3, now(), now()),
            client.next_passages(&rp, 3, now(), now()),
        );

        assert!(first.unwrap().is_none());
        assert!(second.unwrap().is_none());
        assert_eq!(recorder.reasons(), vec!["timeout"]);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let server = MockServer::start().await;
        mount_slow(&server, Duration::from_secs(2)).await;

        let (client, recorder) = client(
            config(&server).with_timeout(Duration::from_millis(200)),
            cache(),
        );
        client.next_passages(&route_point(), 3, now(), now()).await.unwrap();
        client.next_passages(&route_point(), 3, now(), now()).await.unwrap();

        assert_eq!(recorder.reasons().len(), 2);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn breaker_opens_after_threshold() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(downtown_response())
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let (client, recorder) = client(
            config(&server)
                .with_timeout(Duration::from_millis(200))
                .with_circuit_breaker(CircuitBreakerConfig::new(2, Duration::from_secs(60))),
            cache(),
        );

        for _ in 0..4 {
            let result = client.next_passages(&route_point(), 3, now(), now()).await.unwrap();
            assert!(result.is_none());
        }

        assert_eq!(
            recorder.reasons(),
            vec!["timeout", "timeout", "circuit breaker open", "circuit breaker open"]
        );

        let status = client.status();
        assert_eq!(status.circuit_breaker.current_state, CircuitState::Open);
        assert_eq!(status.circuit_breaker.fail_counter, 2);
    }

    #[tokio::test]
    async fn breaker_recovers_after_reset_timeout() {
        let server = MockServer::start().await;
        mount_slow(&server, Duration::from_secs(2)).await;

        let (client, recorder) = client(
            config(&server)
                .with_timeout(Duration::from_millis(200))
                .with_circuit_breaker(CircuitBreakerConfig::new(1, Duration::from_millis(300))),
            cache(),
        );

        assert!(client.next_passages(&route_point(), 3, now(), now()).await.unwrap().is_none());
        assert_eq!(client.status().circuit_breaker.current_state, CircuitState::Open);

        // The provider is healthy again
        server.reset().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(downtown_response()))
            .expect(1)
            .mount(&server)
            .await;

        // Still open: short-circuited without a request
        assert!(client.next_passages(&route_point(), 3, now(), now()).await.unwrap().is_none());

        tokio::time::sleep(Duration::from_millis(400)).await;

        let passages = client
            .next_passages(&route_point(), 3, now(), now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(client.status().circuit_breaker.current_state, CircuitState::Closed);
        assert_eq!(client.status().circuit_breaker.fail_counter, 0);
        assert_eq!(recorder.reasons(), vec!["timeout", "circuit breaker open"]);
    }
}
