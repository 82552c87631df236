//! Long-polling update loop and Transport trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::{parse_update, TelegramChannel};
use async_trait::async_trait;
use std::time::Duration;
use suitcast_core::{error::SuitcastError, message::InboundUpdate, traits::Transport};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Update kinds requested from `getUpdates` and `setWebhook`.
pub const ALLOWED_UPDATES: &[&str] = &[
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
];

const MAX_BACKOFF_SECS: u64 = 60;

#[async_trait]
impl Transport for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundUpdate>, SuitcastError> {
        // A registered webhook makes getUpdates fail with 409.
        self.delete_webhook().await?;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let last_update_id = self.last_update_id.clone();
        let poll_timeout = self.config.poll_timeout_secs;
        let allowed = serde_json::to_string(ALLOWED_UPDATES)?;

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut query = vec![
                    ("timeout", poll_timeout.to_string()),
                    ("allowed_updates", allowed.clone()),
                ];
                if let Some(off) = offset {
                    query.push(("offset", off.to_string()));
                }

                let resp = match client
                    .get(format!("{base_url}/getUpdates"))
                    .query(&query)
                    .timeout(Duration::from_secs(poll_timeout + 5))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let update_id = update.update_id;
                    let Some(inbound) = parse_update(update) else {
                        debug!("telegram: skipping update {update_id} without text");
                        continue;
                    };

                    if tx.send(inbound).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, SuitcastError> {
        self.send_message(chat_id, text).await
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), SuitcastError> {
        self.edit_message(chat_id, message_id, text).await
    }

    async fn stop(&self) -> Result<(), SuitcastError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}
