//! Fallback durations for several modes at once.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::backend::RoutingBackend;
use super::durations::{FallbackContext, FallbackDurationsCalculator};
use super::error::FallbackError;
use super::types::FallbackDurations;
use crate::domain::Mode;

/// One calculator per requested mode, all started immediately.
///
/// Requesting the same mode twice starts a single computation.
#[derive(Debug, Clone)]
pub struct FallbackDurationsPool {
    calculators: BTreeMap<Mode, FallbackDurationsCalculator>,
}

impl FallbackDurationsPool {
    /// Start a calculator for each distinct mode in `modes`.
    pub fn new<B: RoutingBackend>(
        ctx: FallbackContext<B>,
        modes: impl IntoIterator<Item = Mode>,
    ) -> Self {
        let mut calculators = BTreeMap::new();
        for mode in modes {
            calculators
                .entry(mode)
                .or_insert_with(|| FallbackDurationsCalculator::spawn(ctx.clone(), mode));
        }
        Self { calculators }
    }

    /// The calculator for `mode`, if it was requested.
    pub fn get(&self, mode: Mode) -> Option<&FallbackDurationsCalculator> {
        self.calculators.get(&mode)
    }

    /// Wait for the durations of `mode`. `None` if it was never requested.
    pub async fn wait_and_get(
        &self,
        mode: Mode,
    ) -> Option<Result<Arc<FallbackDurations>, FallbackError>> {
        match self.calculators.get(&mode) {
            Some(calculator) => Some(calculator.wait_and_get().await),
            None => None,
        }
    }

    /// Whether no mode reaches any place.
    ///
    /// Stops waiting at the first mode with a non-empty result. A failed
    /// computation is reported rather than counted as empty.
    pub async fn is_empty(&self) -> Result<bool, FallbackError> {
        for calculator in self.calculators.values() {
            if !calculator.wait_and_get().await?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The requested modes, in a stable order.
    pub fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.calculators.keys().copied()
    }
}
