//! Place and transport mode types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown fallback mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fallback mode: {0}")]
pub struct InvalidMode(String);

/// Street-network mode used to reach (or leave) public transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Walking,
    Bike,
    Car,
    /// Bike sharing system.
    Bss,
}

impl Mode {
    /// All fallback modes.
    pub const ALL: [Mode; 4] = [Mode::Walking, Mode::Bike, Mode::Car, Mode::Bss];

    /// Returns the mode as its lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Walking => "walking",
            Mode::Bike => "bike",
            Mode::Car => "car",
            Mode::Bss => "bss",
        }
    }
}

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(Mode::Walking),
            "bike" => Ok(Mode::Bike),
            "car" => Ok(Mode::Car),
            "bss" => Ok(Mode::Bss),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier of a place (stop point, stop area, address, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceUri(String);

impl PlaceUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceUri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A candidate place found near the requested origin/destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub uri: PlaceUri,

    /// Straight-line distance to the requested place, in metres.
    pub distance: f64,
}

impl Place {
    pub fn new(uri: impl Into<String>, distance: f64) -> Self {
        Self {
            uri: PlaceUri::new(uri),
            distance,
        }
    }
}
