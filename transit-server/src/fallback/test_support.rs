//! Fake routing backend for fallback tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::async_value::AsyncValue;
use crate::domain::{Mode, Place, PlaceUri};

use super::backend::{RoutingBackend, StreetNetworkError};
use super::durations::FallbackContext;
use super::types::{
    FallbackRequest, PlacesFreeAccess, ProximitiesByCrowflyPool, RoutingMatrix, SpeedSwitcher,
};

/// A recorded `routing_matrix` call.
#[derive(Debug, Clone)]
pub struct MatrixCall {
    pub mode: Mode,
    pub origins: Vec<PlaceUri>,
    pub destinations: Vec<PlaceUri>,
    pub max_duration: u32,
}

/// Serves canned matrices per mode and records every call.
///
/// Modes without a canned matrix get an empty one.
#[derive(Default)]
pub struct FakeBackend {
    matrices: HashMap<Mode, Result<RoutingMatrix, StreetNetworkError>>,
    stop_points: HashSet<PlaceUri>,
    calls: Mutex<Vec<MatrixCall>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matrix(
        mut self,
        mode: Mode,
        matrix: Result<RoutingMatrix, StreetNetworkError>,
    ) -> Self {
        self.matrices.insert(mode, matrix);
        self
    }

    pub fn with_stop_point(mut self, uri: &str) -> Self {
        self.stop_points.insert(PlaceUri::from(uri));
        self
    }

    pub fn calls(&self) -> Vec<MatrixCall> {
        self.calls.lock().clone()
    }
}

impl RoutingBackend for FakeBackend {
    async fn routing_matrix(
        &self,
        origins: &[PlaceUri],
        destinations: &[Place],
        mode: Mode,
        max_duration: u32,
        _request: &FallbackRequest,
        _speeds: &SpeedSwitcher,
    ) -> Result<RoutingMatrix, StreetNetworkError> {
        self.calls.lock().push(MatrixCall {
            mode,
            origins: origins.to_vec(),
            destinations: destinations.iter().map(|p| p.uri.clone()).collect(),
            max_duration,
        });
        self.matrices.get(&mode).cloned().unwrap_or(Ok(RoutingMatrix::default()))
    }

    fn is_stop_point(&self, uri: &PlaceUri) -> bool {
        self.stop_points.contains(uri)
    }
}

/// Build a context around `place`, with the given crowfly free-access
/// places and the same candidate `proximities` for every mode.
pub fn context(
    backend: impl Into<Arc<FakeBackend>>,
    place: &str,
    free_access: &[&str],
    proximities: &[(&str, f64)],
    request: FallbackRequest,
) -> FallbackContext<FakeBackend> {
    let places: Vec<Place> = proximities
        .iter()
        .map(|(uri, distance)| Place::new(*uri, *distance))
        .collect();

    let mut pool = ProximitiesByCrowflyPool::new();
    for mode in Mode::ALL {
        pool.insert(mode, AsyncValue::ready(places.clone()));
    }

    let crowfly = free_access.iter().map(|uri| PlaceUri::from(*uri)).collect();

    FallbackContext {
        backend: backend.into(),
        requested_place: PlaceUri::from(place),
        is_origin: true,
        proximities_by_crowfly: Arc::new(pool),
        places_free_access: AsyncValue::ready(PlacesFreeAccess::new(crowfly, HashSet::new())),
        request: Arc::new(request),
        speeds: SpeedSwitcher::default(),
    }
}
