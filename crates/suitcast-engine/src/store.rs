//! In-memory prediction store and trigger fingerprint set.
//!
//! Both live only for the process lifetime. The store keeps predictions
//! keyed by round number; concluded predictions are pruned once they fall
//! far enough behind the newest prediction.

use crate::prediction::{DeliveryMap, Prediction};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use suitcast_core::error::SuitcastError;
use tracing::debug;

/// Concluded predictions older than this many rounds behind the newest
/// prediction are dropped.
pub const RESOLVED_RETENTION_ROUNDS: u64 = 20;

/// Fingerprints older than this many rounds behind the newest seen round are
/// dropped. Covers the verification window plus the trigger round.
pub const FINGERPRINT_RETENTION_ROUNDS: u64 = 5;

/// Predictions keyed by predicted round.
#[derive(Debug, Default)]
pub struct PredictionStore {
    predictions: BTreeMap<u64, Prediction>,
}

impl PredictionStore {
    /// Whether a pending prediction exists for `round`.
    pub fn has_pending(&self, round: u64) -> bool {
        self.predictions
            .get(&round)
            .is_some_and(|p| p.status.is_pending())
    }

    /// Store a new prediction. A concluded prediction for the same round is
    /// replaced; a pending one is an error.
    pub fn insert(&mut self, prediction: Prediction) -> Result<(), SuitcastError> {
        let round = prediction.round_number;
        if self.has_pending(round) {
            return Err(SuitcastError::Engine(format!(
                "pending prediction for round {round} already exists"
            )));
        }
        self.predictions.insert(round, prediction);
        self.prune_resolved(round);
        Ok(())
    }

    pub fn get(&self, round: u64) -> Option<&Prediction> {
        self.predictions.get(&round)
    }

    pub(crate) fn get_mut(&mut self, round: u64) -> Option<&mut Prediction> {
        self.predictions.get_mut(&round)
    }

    /// Rounds of all pending predictions, ascending.
    pub fn pending_rounds(&self) -> Vec<u64> {
        self.pending().map(|p| p.round_number).collect()
    }

    /// Pending predictions, ascending by round.
    pub fn pending(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions.values().filter(|p| p.status.is_pending())
    }

    /// All predictions, ascending by round.
    pub fn iter(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Merge delivered message ids into the prediction for `round`.
    pub fn record_deliveries(&mut self, round: u64, deliveries: DeliveryMap) -> bool {
        match self.predictions.get_mut(&round) {
            Some(p) => {
                p.destinations.extend(deliveries);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn clear(&mut self) {
        self.predictions.clear();
    }

    fn prune_resolved(&mut self, newest: u64) {
        let before = self.predictions.len();
        self.predictions.retain(|round, p| {
            p.status.is_pending() || round.saturating_add(RESOLVED_RETENTION_ROUNDS) >= newest
        });
        let dropped = before - self.predictions.len();
        if dropped > 0 {
            debug!("pruned {dropped} concluded predictions behind round {newest}");
        }
    }
}

/// SHA-256 hex digest of raw message text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fingerprints of messages that already triggered a prediction, each
/// tagged with the round it came from.
#[derive(Debug, Default)]
pub struct FingerprintSet {
    seen: HashMap<String, u64>,
    newest_round: u64,
}

impl FingerprintSet {
    /// Record `text` as seen for `round`. Returns false if it was already seen.
    pub fn insert(&mut self, text: &str, round: u64) -> bool {
        self.newest_round = self.newest_round.max(round);
        self.evict();
        let digest = fingerprint(text);
        if self.seen.contains_key(&digest) {
            return false;
        }
        self.seen.insert(digest, round);
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains_key(&fingerprint(text))
    }

    /// Highest round that has triggered since the last clear.
    pub fn newest_round(&self) -> u64 {
        self.newest_round
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.newest_round = 0;
    }

    fn evict(&mut self) {
        let newest = self.newest_round;
        self.seen
            .retain(|_, round| round.saturating_add(FINGERPRINT_RETENTION_ROUNDS) >= newest);
    }
}
