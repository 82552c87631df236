//! Multi-destination delivery of prediction status messages.

use std::sync::{Arc, Mutex, PoisonError};
use suitcast_core::{error::SuitcastError, traits::Transport};
use suitcast_engine::DeliveryMap;
use tracing::{info, warn};

/// Result of pushing a new status text to a round's destinations.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// At least one destination was edited or re-sent.
    pub updated: bool,
    /// Message ids that now carry the text. Fresh sends replace the old id.
    pub deliveries: DeliveryMap,
}

/// Sends predictions to the active destination set and keeps them current.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    defaults: Vec<i64>,
    max_destinations: usize,
    overridden: Mutex<Option<Vec<i64>>>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, defaults: Vec<i64>, max_destinations: usize) -> Self {
        Self {
            transport,
            defaults,
            max_destinations,
            overridden: Mutex::new(None),
        }
    }

    /// Destinations new predictions go to.
    pub fn active(&self) -> Vec<i64> {
        self.overridden
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn max_destinations(&self) -> usize {
        self.max_destinations
    }

    /// Temporarily replace the destination set. Duplicates are dropped.
    pub fn set_override(&self, ids: Vec<i64>) -> Result<Vec<i64>, SuitcastError> {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(SuitcastError::Config("no destination given".into()));
        }
        if unique.len() > self.max_destinations {
            return Err(SuitcastError::Config(format!(
                "{} destinations given, max is {}",
                unique.len(),
                self.max_destinations
            )));
        }
        info!("destination override set: {unique:?}");
        *self
            .overridden
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(unique.clone());
        Ok(unique)
    }

    /// Return to the configured destinations.
    pub fn reset_override(&self) {
        self.overridden
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!("destination override cleared");
    }

    /// Send `text` to every active destination. Failed sends are logged and
    /// left out of the returned map.
    pub async fn dispatch(&self, text: &str) -> DeliveryMap {
        let mut deliveries = DeliveryMap::new();
        for chat_id in self.active() {
            match self.transport.send_text(chat_id, text).await {
                Ok(message_id) => {
                    deliveries.insert(chat_id, message_id);
                }
                Err(e) => warn!("dispatch to {chat_id} failed: {e}"),
            }
        }
        deliveries
    }

    /// Replace the text of every recorded delivery for `round`.
    ///
    /// A failed edit falls back to a fresh send to the same chat. When
    /// nothing was recorded, the text goes fresh to the active set.
    pub async fn update(&self, round: u64, recorded: &DeliveryMap, text: &str) -> UpdateOutcome {
        if recorded.is_empty() {
            warn!("round {round}: no recorded deliveries, sending fresh");
            let deliveries = self.dispatch(text).await;
            return UpdateOutcome {
                updated: !deliveries.is_empty(),
                deliveries,
            };
        }

        let mut deliveries = DeliveryMap::new();
        for (&chat_id, &message_id) in recorded {
            match self.transport.edit_text(chat_id, message_id, text).await {
                Ok(()) => {
                    deliveries.insert(chat_id, message_id);
                }
                Err(e) => {
                    warn!("round {round}: edit in {chat_id} failed ({e}), sending fresh");
                    match self.transport.send_text(chat_id, text).await {
                        Ok(fresh_id) => {
                            deliveries.insert(chat_id, fresh_id);
                        }
                        Err(e) => warn!("round {round}: fresh send to {chat_id} failed: {e}"),
                    }
                }
            }
        }
        UpdateOutcome {
            updated: !deliveries.is_empty(),
            deliveries,
        }
    }
}
