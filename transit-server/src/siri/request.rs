//! SIRI `GetStopMonitoring` request rendering.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;

/// Message identifier sent with every request. Providers don't use it for
/// correlation, and a fixed value keeps rendered requests cacheable.
pub const MESSAGE_IDENTIFIER: &str = "IDontCare";

/// Render a SOAP `GetStopMonitoring` envelope.
///
/// The output is a pure function of its arguments, so it doubles as a
/// cache key.
pub fn stop_monitoring_request(
    dt: DateTime<Utc>,
    requestor_ref: &str,
    monitoring_ref: &str,
    count: u32,
) -> String {
    let dt = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let requestor_ref = escape(requestor_ref);
    let monitoring_ref = escape(monitoring_ref);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<x:Envelope xmlns:x="http://schemas.xmlsoap.org/soap/envelope/"
            xmlns:wsd="http://wsdl.siri.org.uk" xmlns:siri="http://www.siri.org.uk/siri">
  <x:Header/>
  <x:Body>
    <GetStopMonitoring xmlns="http://wsdl.siri.org.uk" xmlns:siri="http://www.siri.org.uk/siri">
      <ServiceRequestInfo xmlns="">
        <siri:RequestTimestamp>{dt}</siri:RequestTimestamp>
        <siri:RequestorRef>{requestor_ref}</siri:RequestorRef>
        <siri:MessageIdentifier>{MESSAGE_IDENTIFIER}</siri:MessageIdentifier>
      </ServiceRequestInfo>
      <Request version="1.3" xmlns="">
        <siri:RequestTimestamp>{dt}</siri:RequestTimestamp>
        <siri:MessageIdentifier>{MESSAGE_IDENTIFIER}</siri:MessageIdentifier>
        <siri:MonitoringRef>{monitoring_ref}</siri:MonitoringRef>
        <siri:MaximumStopVisits>{count}</siri:MaximumStopVisits>
      </Request>
      <RequestExtension xmlns=""/>
    </GetStopMonitoring>
  </x:Body>
</x:Envelope>
"#
    )
}
