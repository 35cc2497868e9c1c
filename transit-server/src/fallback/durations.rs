//! Fallback durations for a single mode.
//!
//! Computes how long it takes, with one street-network mode, to go from the
//! requested place to every nearby stop (or from every nearby stop to it).
//! Places with free access are known to cost nothing and are never routed.
//! Everything else is routed in a single matrix call bounded by the mode's
//! maximum duration.

use std::collections::HashMap;
use std::f64::consts::SQRT_2;
use std::sync::Arc;

use tracing::debug;

use crate::async_value::AsyncValue;
use crate::domain::{Mode, Place, PlaceUri};

use super::backend::RoutingBackend;
use super::error::FallbackError;
use super::types::{
    DurationElement, FallbackDurations, FallbackRequest, MatrixRow, PlacesFreeAccess,
    ProximitiesByCrowflyPool, RoutingStatus, SpeedSwitcher,
};

/// Everything a fallback computation reads. Shared, never mutated.
pub struct FallbackContext<B> {
    /// Routing collaborator.
    pub backend: Arc<B>,
    /// The requested origin or destination.
    pub requested_place: PlaceUri,
    /// Whether `requested_place` is the journey origin.
    pub is_origin: bool,
    /// Nearby candidate places, per mode.
    pub proximities_by_crowfly: Arc<ProximitiesByCrowflyPool>,
    /// Places reachable at no cost.
    pub places_free_access: AsyncValue<PlacesFreeAccess>,
    /// Per-mode duration limits.
    pub request: Arc<FallbackRequest>,
    pub speeds: SpeedSwitcher,
}

impl<B> Clone for FallbackContext<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            requested_place: self.requested_place.clone(),
            is_origin: self.is_origin,
            proximities_by_crowfly: self.proximities_by_crowfly.clone(),
            places_free_access: self.places_free_access.clone(),
            request: self.request.clone(),
            speeds: self.speeds,
        }
    }
}

/// A running fallback duration computation for one mode.
///
/// The computation starts when the calculator is created; results are
/// read with [`FallbackDurationsCalculator::wait_and_get`].
#[derive(Debug, Clone)]
pub struct FallbackDurationsCalculator {
    mode: Mode,
    value: AsyncValue<FallbackDurations, FallbackError>,
}

impl FallbackDurationsCalculator {
    /// Start computing fallback durations for `mode`.
    pub fn spawn<B: RoutingBackend>(ctx: FallbackContext<B>, mode: Mode) -> Self {
        let value = AsyncValue::spawn(compute(ctx, mode));
        Self { mode, value }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Wait for the durations.
    pub async fn wait_and_get(&self) -> Result<Arc<FallbackDurations>, FallbackError> {
        self.value.wait_and_get().await
    }
}

async fn compute<B: RoutingBackend>(
    ctx: FallbackContext<B>,
    mode: Mode,
) -> Result<FallbackDurations, FallbackError> {
    let center = &ctx.requested_place;

    let free_access = ctx.places_free_access.wait_and_get().await?;
    let all_free_access = free_access.all();

    let proximities = match ctx.proximities_by_crowfly.wait_and_get(mode).await {
        Some(places) => places?,
        None => Arc::default(),
    };

    // Free access places are never routed
    let candidates: Vec<Place> = proximities
        .iter()
        .filter(|p| !all_free_access.contains(&p.uri))
        .cloned()
        .collect();

    let mut result: FallbackDurations = all_free_access
        .iter()
        .map(|uri| ((*uri).clone(), DurationElement::reached(0)))
        .collect();

    let max_duration = ctx.request.max_duration_to_pt(mode);

    // With no budget, public transport is only usable if we're already at a stop
    if max_duration == 0 {
        if ctx.backend.is_stop_point(center) {
            return Ok(HashMap::from([(center.clone(), DurationElement::reached(0))]));
        }
        return Ok(result);
    }

    let matrix = ctx
        .backend
        .routing_matrix(
            std::slice::from_ref(center),
            &candidates,
            mode,
            max_duration,
            &ctx.request,
            &ctx.speeds,
        )
        .await?;

    let Some(row) = matrix.rows.first().filter(|r| !r.routing_response.is_empty()) else {
        debug!(
            %mode,
            place = %center,
            is_origin = ctx.is_origin,
            "empty routing matrix, using free access places only"
        );
        return Ok(result);
    };

    add_routed_durations(
        &mut result,
        &candidates,
        row,
        max_duration,
        ctx.speeds.get(mode),
    );

    // A place is always zero seconds away from itself
    if let Some(elem) = result.get_mut(center) {
        *elem = DurationElement::reached(0);
    }

    debug!(
        %mode,
        place = %center,
        is_origin = ctx.is_origin,
        candidates = candidates.len(),
        reachable = result.len(),
        "fallback durations computed"
    );

    Ok(result)
}

/// Add every candidate reachable in under `max_duration` seconds.
///
/// `row` holds one response per candidate, in candidate order.
fn add_routed_durations(
    result: &mut FallbackDurations,
    candidates: &[Place],
    row: &MatrixRow,
    max_duration: u32,
    speed: f64,
) {
    for (place, response) in candidates.iter().zip(&row.routing_response) {
        let duration = match response.routing_status {
            RoutingStatus::Unreached => continue,
            RoutingStatus::Reached => response.duration,
            RoutingStatus::Unknown => estimated_duration(place.distance, speed),
        };

        if duration < max_duration {
            result.insert(
                place.uri.clone(),
                DurationElement::new(duration, response.routing_status),
            );
        }
    }
}

/// Estimate a street duration from a crowfly distance, stretched by √2.
///
/// Unusable inputs (negative or non-finite distance, non-positive speed)
/// yield `u32::MAX`, i.e. never reachable.
fn estimated_duration(distance: f64, speed: f64) -> u32 {
    if !distance.is_finite() || distance < 0.0 || speed.is_nan() || speed <= 0.0 {
        return u32::MAX;
    }
    // Saturating cast
    (distance * SQRT_2 / speed) as u32
}
