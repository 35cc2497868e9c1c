//! SIRI stop monitoring response parsing.
//!
//! Responses can contain visits for stops, lines and directions other than
//! the one asked about. Only visits matching the requested route point are
//! turned into passages, in document order.

use roxmltree::{Document, Node};
use tracing::trace;

use crate::domain::{RealTimePassage, parse_iso_datetime};

use super::error::SiriError;

/// SIRI XML namespace.
pub const SIRI_NS: &str = "http://www.siri.org.uk/siri";

/// Identifiers a stop visit must carry to be kept.
#[derive(Debug, Clone, Copy)]
pub struct VisitFilter<'a> {
    pub stop: &'a str,
    pub line: Option<&'a str>,
    pub route: Option<&'a str>,
}

/// Raw fields of one `MonitoredStopVisit`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StopVisit<'a> {
    stop_point_ref: Option<&'a str>,
    line_ref: Option<&'a str>,
    direction_name: Option<&'a str>,
    destination_name: Option<&'a str>,
    expected_departure_time: Option<&'a str>,
}

impl<'a> StopVisit<'a> {
    fn from_node<'input: 'a>(visit: Node<'a, 'input>) -> Self {
        Self {
            stop_point_ref: find_text(visit, "StopPointRef"),
            line_ref: find_text(visit, "LineRef"),
            direction_name: find_text(visit, "DirectionName"),
            destination_name: find_text(visit, "DestinationName"),
            expected_departure_time: find_text(visit, "ExpectedDepartureTime"),
        }
    }

    /// Stop, line and route (`DirectionName`) must all equal the filter.
    /// Destination is carried through, never compared.
    fn matches(&self, filter: &VisitFilter<'_>) -> bool {
        self.stop_point_ref == Some(filter.stop)
            && filter.line.is_some()
            && self.line_ref == filter.line
            && filter.route.is_some()
            && self.direction_name == filter.route
    }
}

/// First descendant of `node` in the SIRI namespace named `name`.
fn find_text<'a, 'input: 'a>(node: Node<'a, 'input>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.has_tag_name((SIRI_NS, name)))
        .and_then(|n| n.text())
}

/// Parse a stop monitoring response into the passages matching `filter`.
///
/// Fails if the body isn't XML, or if a matching visit has no usable
/// `ExpectedDepartureTime`.
pub fn parse_passages(
    xml: &str,
    filter: &VisitFilter<'_>,
) -> Result<Vec<RealTimePassage>, SiriError> {
    let doc = Document::parse(xml)?;

    let mut passages = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.has_tag_name((SIRI_NS, "MonitoredStopVisit")))
    {
        let visit = StopVisit::from_node(node);
        if !visit.matches(filter) {
            trace!(?visit, "skipping stop visit for another route point");
            continue;
        }

        let raw_dt = visit.expected_departure_time.ok_or_else(|| {
            SiriError::MalformedVisit(format!(
                "missing ExpectedDepartureTime for stop {}",
                filter.stop
            ))
        })?;
        let datetime =
            parse_iso_datetime(raw_dt).map_err(|e| SiriError::MalformedVisit(e.to_string()))?;

        passages.push(RealTimePassage::new(
            datetime,
            visit.destination_name.map(str::to_string),
        ));
    }

    Ok(passages)
}
