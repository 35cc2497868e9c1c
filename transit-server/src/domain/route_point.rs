//! Route point identifiers.
//!
//! A route point is a (stop point, line, route) triple. Each of the three
//! objects carries external codes published by the various real-time
//! systems, keyed by an object-id tag (usually the real-time system id).

use std::collections::HashMap;

/// External codes of a single object, keyed by object-id tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectCodes(HashMap<String, String>);

impl ObjectCodes {
    /// Create an empty code set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a code under the given tag, replacing any previous one.
    pub fn insert(&mut self, tag: impl Into<String>, code: impl Into<String>) {
        self.0.insert(tag.into(), code.into());
    }

    /// Builder-style variant of [`ObjectCodes::insert`].
    pub fn with(mut self, tag: impl Into<String>, code: impl Into<String>) -> Self {
        self.insert(tag, code);
        self
    }

    /// Look up the code published under `tag`.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }
}

/// A stop point served by a given line on a given route.
///
/// Identifier resolution is tag based: the same route point can be known
/// as `"StopPoint:42"` by one real-time system and `"A42"` by another.
///
/// # Examples
///
/// ```
/// use transit_server::domain::{ObjectCodes, RoutePoint};
///
/// let rp = RoutePoint::new(
///     ObjectCodes::new().with("siri", "STOP_1"),
///     ObjectCodes::new().with("siri", "L1"),
///     ObjectCodes::new().with("siri", "Northbound"),
/// );
///
/// assert_eq!(rp.fetch_stop_id("siri"), Some("STOP_1"));
/// assert_eq!(rp.fetch_line_id("other"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePoint {
    stop_point: ObjectCodes,
    line: ObjectCodes,
    route: ObjectCodes,
}

impl RoutePoint {
    /// Create a route point from the codes of its three objects.
    pub fn new(stop_point: ObjectCodes, line: ObjectCodes, route: ObjectCodes) -> Self {
        Self {
            stop_point,
            line,
            route,
        }
    }

    /// Create a route point known under a single tag.
    pub fn single_tag(
        tag: &str,
        stop_point: impl Into<String>,
        line: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            stop_point: ObjectCodes::new().with(tag, stop_point),
            line: ObjectCodes::new().with(tag, line),
            route: ObjectCodes::new().with(tag, route),
        }
    }

    /// Stop point code under `tag`.
    pub fn fetch_stop_id(&self, tag: &str) -> Option<&str> {
        self.stop_point.get(tag)
    }

    /// Line code under `tag`.
    pub fn fetch_line_id(&self, tag: &str) -> Option<&str> {
        self.line.get(tag)
    }

    /// Route code under `tag`.
    pub fn fetch_route_id(&self, tag: &str) -> Option<&str> {
        self.route.get(tag)
    }
}
