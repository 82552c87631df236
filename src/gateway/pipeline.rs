//! Update processing pipeline: the handle_update flow.

use super::{lock_engine, Gateway};
use crate::commands::{self, Command, CommandContext};
use suitcast_core::message::InboundUpdate;
use suitcast_engine::{extract::has_pending_indicator, Verdict};
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 60;

impl Gateway {
    /// Process a single inbound update to completion.
    pub(super) async fn handle_update(&self, update: InboundUpdate) {
        // --- 1. OPERATOR COMMANDS ---
        if update.is_command() && !update.is_edit {
            self.handle_command(&update).await;
            return;
        }

        // --- 2. SOURCE ALLOW-LIST ---
        let source = self.config.routing.source_channel;
        if !update.is_from(source) {
            debug!(
                "ignoring update {} from chat {} (not source)",
                update.update_id, update.chat_id
            );
            return;
        }

        info!(
            "[source] {} message {}: {}",
            if update.is_edit { "edited" } else { "new" },
            update.message_id,
            update.preview(PREVIEW_CHARS)
        );

        // Round outcomes are only final once the post is edited.
        if !update.is_edit {
            if has_pending_indicator(&update.text) {
                debug!("message {} still in progress", update.message_id);
            }
            return;
        }

        // --- 3. PREDICT ---
        self.predict(&update.text).await;

        // --- 4. VERIFY ---
        self.verify(&update.text).await;
    }

    async fn predict(&self, text: &str) {
        let verdict = lock_engine(&self.engine).should_predict(text);
        let (source_round, combination) = match verdict {
            Verdict::Predict {
                source_round,
                combination,
            } => (source_round, combination),
            Verdict::Skip(reason) => {
                debug!("no prediction: {reason}");
                return;
            }
        };

        let made = lock_engine(&self.engine).make_prediction(source_round, combination);
        let (round, rendered) = match made {
            Ok(made) => made,
            Err(e) => {
                warn!("prediction after round {source_round} not stored: {e}");
                return;
            }
        };

        let deliveries = self.dispatcher.dispatch(&rendered).await;
        if deliveries.is_empty() {
            warn!("round {round}: prediction reached no destination");
            return;
        }
        info!("round {round}: prediction sent to {} chat(s)", deliveries.len());
        lock_engine(&self.engine).record_deliveries(round, deliveries);
    }

    async fn verify(&self, text: &str) {
        let resolution = lock_engine(&self.engine).resolve(text, true);
        let Some(resolution) = resolution else {
            return;
        };

        let round = resolution.round_number;
        let recorded = lock_engine(&self.engine).deliveries(round);
        let outcome = self
            .dispatcher
            .update(round, &recorded, &resolution.new_rendered_text)
            .await;

        if outcome.updated {
            info!(
                "round {round}: status {} pushed to {} chat(s)",
                resolution.status.label(),
                outcome.deliveries.len()
            );
            lock_engine(&self.engine).record_deliveries(round, outcome.deliveries);
        } else {
            warn!("round {round}: status update reached no destination");
        }
    }

    async fn handle_command(&self, update: &InboundUpdate) {
        let Some(cmd) = Command::parse(&update.text) else {
            debug!("unknown command: {}", update.preview(PREVIEW_CHARS));
            return;
        };

        let ctx = CommandContext {
            engine: &self.engine,
            dispatcher: &self.dispatcher,
            config: &self.config,
            uptime: &self.uptime,
            text: &update.text,
        };
        let reply = commands::handle(cmd, &ctx);

        if let Err(e) = self.transport.send_text(update.chat_id, &reply).await {
            warn!("command reply to {} failed: {e}", update.chat_id);
        }
    }
}
