//! Fallback duration computation.
//!
//! Before searching public transport, a journey planner needs to know how
//! long it takes to reach the network from the origin (and to leave it at
//! the destination) with each street-network mode. This module computes
//! those "fallback" durations concurrently, one task per mode.

mod backend;
mod durations;
mod error;
mod pool;
mod types;

#[cfg(test)]
mod test_support;

pub use backend::{RoutingBackend, StreetNetworkError};
pub use durations::{FallbackContext, FallbackDurationsCalculator};
pub use error::FallbackError;
pub use pool::FallbackDurationsPool;
pub use types::{
    DurationElement, FallbackDurations, FallbackRequest, MatrixRow, PlacesFreeAccess,
    ProximitiesByCrowflyPool, RoutingMatrix, RoutingResponse, RoutingStatus, SpeedSwitcher,
};
