//! Gateway: the main event loop connecting the transport, the prediction
//! engine, and the dispatcher.
//!
//! Updates from long polling or from the webhook server share one queue and
//! are handled strictly one at a time.

pub mod dispatcher;
mod pipeline;

#[cfg(test)]
pub(crate) mod mock;

use dispatcher::Dispatcher;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use suitcast_core::{config::Config, message::InboundUpdate, traits::Transport};
use suitcast_engine::Engine;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Queue depth between ingress (poller or webhook) and the gateway loop.
const QUEUE_CAPACITY: usize = 256;

/// Shared handle on the engine state.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Lock the engine. The guard must never live across an `.await`.
pub fn lock_engine(engine: &Mutex<Engine>) -> MutexGuard<'_, Engine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The central gateway that routes source posts through the engine and out
/// to the destination channels.
pub struct Gateway {
    pub(super) transport: Arc<dyn Transport>,
    pub(super) engine: SharedEngine,
    pub(super) dispatcher: Dispatcher,
    pub(super) config: Config,
    pub(super) uptime: Instant,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, config: Config) -> Self {
        let dispatcher = Dispatcher::new(
            transport.clone(),
            config.routing.destinations.clone(),
            config.routing.max_destinations,
        );
        Self {
            transport,
            engine: Arc::new(Mutex::new(Engine::new())),
            dispatcher,
            config,
            uptime: Instant::now(),
        }
    }

    /// Run the main event loop until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "{} gateway running | transport: {} | source: {} | destinations: {:?} | ingress: {}",
            self.config.bot.name,
            self.transport.name(),
            self.config.routing.source_channel,
            self.dispatcher.active(),
            if self.config.webhook.enabled {
                "webhook"
            } else {
                "polling"
            },
        );

        let (tx, mut rx) = mpsc::channel::<InboundUpdate>(QUEUE_CAPACITY);

        let api_handle = if self.config.webhook.enabled {
            let state = crate::api::ApiState::new(
                tx.clone(),
                &self.config.webhook.secret_token,
                self.engine.clone(),
                self.uptime,
            );
            let webhook = self.config.webhook.clone();
            Some(tokio::spawn(async move {
                crate::api::serve(webhook, state).await;
            }))
        } else {
            let mut transport_rx = self
                .transport
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start {}: {e}", self.transport.name()))?;
            let tx = tx.clone();
            let name = self.transport.name().to_string();
            tokio::spawn(async move {
                while let Some(update) = transport_rx.recv().await {
                    if tx.send(update).await.is_err() {
                        info!("gateway receiver dropped, stopping {name} forwarder");
                        break;
                    }
                }
            });
            info!("Transport started: {}", self.transport.name());
            None
        };

        drop(tx);

        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(update) => self.handle_update(update).await,
                    None => {
                        warn!("all ingress sources closed");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(api_handle).await;
        Ok(())
    }

    async fn shutdown(&self, api_handle: Option<tokio::task::JoinHandle<()>>) {
        info!("Shutting down...");
        if let Some(handle) = api_handle {
            handle.abort();
        }
        if let Err(e) = self.transport.stop().await {
            error!("failed to stop {}: {e}", self.transport.name());
        }
        let engine = lock_engine(&self.engine);
        info!(
            "Shutdown complete ({} predictions, {} pending, dropped)",
            engine.store().len(),
            engine.store().pending_count()
        );
    }
}
