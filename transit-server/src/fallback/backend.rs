//! Street-network collaborator used by the fallback computation.

use std::future::Future;

use crate::domain::{Mode, Place, PlaceUri};

use super::types::{FallbackRequest, RoutingMatrix, SpeedSwitcher};

/// The street network failed to compute a matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("street network error: {0}")]
pub struct StreetNetworkError(pub String);

/// Geographic lookups and street-network routing.
///
/// This abstraction allows the fallback computation to be tested without
/// a real routing engine.
pub trait RoutingBackend: Send + Sync + 'static {
    /// Route from every origin to every destination.
    ///
    /// Row `i` holds the responses from `origins[i]`, with one response per
    /// destination in `destinations` order.
    fn routing_matrix(
        &self,
        origins: &[PlaceUri],
        destinations: &[Place],
        mode: Mode,
        max_duration: u32,
        request: &FallbackRequest,
        speeds: &SpeedSwitcher,
    ) -> impl Future<Output = Result<RoutingMatrix, StreetNetworkError>> + Send;

    /// Whether `uri` designates a stop point (a place you can board at).
    fn is_stop_point(&self, uri: &PlaceUri) -> bool;
}
