//! # suitcast-engine
//!
//! Pattern-driven prediction and verification over round messages.
//!
//! - `extract`: stateless text parsing (round marker, suit sections, indicators)
//! - `generator`: decides whether a message triggers a prediction
//! - `store`: outstanding predictions and the trigger fingerprint set
//! - `verify`: windowed, stop-at-first resolution of pending predictions
//!
//! [`Engine`] owns all mutable state; callers serialize access to it.

pub mod extract;
pub mod generator;
pub mod prediction;
pub mod store;
pub mod verify;

#[cfg(test)]
mod tests;

pub use extract::Suit;
pub use generator::{Combination, SkipReason, Verdict};
pub use prediction::{DeliveryMap, Prediction, Status};
pub use store::{FingerprintSet, PredictionStore};
pub use verify::Resolution;

use tracing::info;

/// Offsets `0..=VERIFICATION_WINDOW` after the predicted round may confirm it.
pub const VERIFICATION_WINDOW: u64 = 3;

/// Minimum suit occurrences in the first section that confirm a prediction.
pub const MIN_CONFIRMING_SYMBOLS: usize = 3;

/// The prediction engine: store plus dedup state, reset together.
#[derive(Debug, Default)]
pub struct Engine {
    pub(crate) store: PredictionStore,
    pub(crate) fingerprints: FingerprintSet,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the prediction store.
    pub fn store(&self) -> &PredictionStore {
        &self.store
    }

    /// Attach delivered message ids to the prediction for `round`.
    /// Returns false if no such prediction exists.
    pub fn record_deliveries(&mut self, round: u64, deliveries: DeliveryMap) -> bool {
        self.store.record_deliveries(round, deliveries)
    }

    /// Delivered message ids for `round`, empty if none were recorded.
    pub fn deliveries(&self, round: u64) -> DeliveryMap {
        self.store
            .get(round)
            .map(|p| p.destinations.clone())
            .unwrap_or_default()
    }

    /// Drop every prediction and fingerprint.
    pub fn reset(&mut self) {
        let predictions = self.store.len();
        let fingerprints = self.fingerprints.len();
        self.store.clear();
        self.fingerprints.clear();
        info!("engine reset: dropped {predictions} predictions, {fingerprints} fingerprints");
    }
}
