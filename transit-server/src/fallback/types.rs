//! Inputs and outputs of the fallback duration computation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::async_value::{AsyncValue, TaskFailed};
use crate::domain::{Mode, Place, PlaceUri};

/// Outcome of routing to one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingStatus {
    /// Routed on the street network.
    Reached,
    /// Not reachable within the budget.
    Unreached,
    /// The router couldn't tell; the duration must be estimated.
    Unknown,
}

/// Access duration to one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationElement {
    /// Duration in seconds.
    pub duration: u32,
    pub status: RoutingStatus,
}

impl DurationElement {
    pub fn new(duration: u32, status: RoutingStatus) -> Self {
        Self { duration, status }
    }

    /// A place reached in `duration` seconds.
    pub fn reached(duration: u32) -> Self {
        Self::new(duration, RoutingStatus::Reached)
    }
}

/// Fallback durations for one mode, keyed by place.
pub type FallbackDurations = HashMap<PlaceUri, DurationElement>;

/// Places that can be used without any access duration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacesFreeAccess {
    /// Stop points within crowfly reach of the requested place.
    pub crowfly: HashSet<PlaceUri>,
    /// Stop points served by on-demand transport from the requested place.
    pub odt: HashSet<PlaceUri>,
}

impl PlacesFreeAccess {
    pub fn new(crowfly: HashSet<PlaceUri>, odt: HashSet<PlaceUri>) -> Self {
        Self { crowfly, odt }
    }

    /// Union of crowfly and odt places.
    pub fn all(&self) -> HashSet<&PlaceUri> {
        self.crowfly.union(&self.odt).collect()
    }
}

/// Candidate places near the requested place, computed per mode.
#[derive(Debug, Clone, Default)]
pub struct ProximitiesByCrowflyPool {
    by_mode: HashMap<Mode, AsyncValue<Vec<Place>>>,
}

impl ProximitiesByCrowflyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the (possibly still computing) candidates for `mode`.
    pub fn insert(&mut self, mode: Mode, places: AsyncValue<Vec<Place>>) {
        self.by_mode.insert(mode, places);
    }

    /// Wait for the candidates of `mode`. `None` if the mode is unknown.
    pub async fn wait_and_get(&self, mode: Mode) -> Option<Result<Arc<Vec<Place>>, TaskFailed>> {
        match self.by_mode.get(&mode) {
            Some(places) => Some(places.wait_and_get().await),
            None => None,
        }
    }
}

/// Per-request limits on fallback durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRequest {
    /// Max walking duration to reach public transport, in seconds.
    pub max_walking_duration_to_pt: u32,
    pub max_bike_duration_to_pt: u32,
    pub max_car_duration_to_pt: u32,
    pub max_bss_duration_to_pt: u32,
}

impl FallbackRequest {
    /// Max duration to public transport for `mode`, in seconds.
    pub fn max_duration_to_pt(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Walking => self.max_walking_duration_to_pt,
            Mode::Bike => self.max_bike_duration_to_pt,
            Mode::Car => self.max_car_duration_to_pt,
            Mode::Bss => self.max_bss_duration_to_pt,
        }
    }

    /// Set the max duration for `mode`.
    pub fn with_max_duration_to_pt(mut self, mode: Mode, secs: u32) -> Self {
        match mode {
            Mode::Walking => self.max_walking_duration_to_pt = secs,
            Mode::Bike => self.max_bike_duration_to_pt = secs,
            Mode::Car => self.max_car_duration_to_pt = secs,
            Mode::Bss => self.max_bss_duration_to_pt = secs,
        }
        self
    }
}

impl Default for FallbackRequest {
    fn default() -> Self {
        Self {
            max_walking_duration_to_pt: 30 * 60,
            max_bike_duration_to_pt: 30 * 60,
            max_car_duration_to_pt: 30 * 60,
            max_bss_duration_to_pt: 30 * 60,
        }
    }
}

/// Speed of each mode, in metres per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSwitcher {
    pub walking: f64,
    pub bike: f64,
    pub car: f64,
    pub bss: f64,
}

impl SpeedSwitcher {
    pub fn get(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Walking => self.walking,
            Mode::Bike => self.bike,
            Mode::Car => self.car,
            Mode::Bss => self.bss,
        }
    }
}

impl Default for SpeedSwitcher {
    fn default() -> Self {
        Self {
            walking: 1.12,
            bike: 4.1,
            car: 11.11,
            bss: 4.1,
        }
    }
}

/// One routed destination in a routing matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingResponse {
    /// Duration in seconds; meaningful only when `Reached`.
    pub duration: u32,
    pub routing_status: RoutingStatus,
}

impl RoutingResponse {
    pub fn new(duration: u32, routing_status: RoutingStatus) -> Self {
        Self {
            duration,
            routing_status,
        }
    }
}

/// Responses from one origin to every destination, in destination order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixRow {
    pub routing_response: Vec<RoutingResponse>,
}

/// Street-network routing matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingMatrix {
    pub rows: Vec<MatrixRow>,
}

impl RoutingMatrix {
    /// A matrix with a single row.
    pub fn single_row(routing_response: Vec<RoutingResponse>) -> Self {
        Self {
            rows: vec![MatrixRow { routing_response }],
        }
    }
}
