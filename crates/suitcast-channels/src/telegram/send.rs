//! Outbound Bot API calls: send, edit, and webhook registration.

use super::polling::ALLOWED_UPDATES;
use super::types::{TgResponse, TgSentMessage};
use super::TelegramChannel;
use serde::de::DeserializeOwned;
use suitcast_core::error::SuitcastError;
use tracing::{debug, info, warn};

/// Both send and edit use the same mode so an edit never changes formatting.
const PARSE_MODE: &str = "HTML";

impl TelegramChannel {
    /// POST a Bot API method and unwrap its `result`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, SuitcastError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SuitcastError::Channel(format!("telegram {method} failed: {e}")))?;

        let status = resp.status();
        let parsed: TgResponse<T> = resp.json().await.map_err(|e| {
            SuitcastError::Channel(format!("telegram {method} parse failed ({status}): {e}"))
        })?;

        if !parsed.ok {
            return Err(SuitcastError::Channel(format!(
                "telegram {method} failed ({status}): {}",
                parsed.description.unwrap_or_default()
            )));
        }
        parsed
            .result
            .ok_or_else(|| SuitcastError::Channel(format!("telegram {method} returned no result")))
    }

    /// Send a text message and return its message id. Retries as plain text
    /// when Telegram rejects the HTML entities.
    pub(crate) async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, SuitcastError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": PARSE_MODE,
        });
        let sent: TgSentMessage = match self.call("sendMessage", &body).await {
            Ok(sent) => sent,
            Err(SuitcastError::Channel(msg)) if is_entity_error(&msg) => {
                warn!("HTML parse failed, retrying as plain text: {msg}");
                let plain = serde_json::json!({
                    "chat_id": chat_id,
                    "text": text,
                });
                self.call("sendMessage", &plain).await?
            }
            Err(e) => return Err(e),
        };
        debug!("telegram: sent message {} to {chat_id}", sent.message_id);
        Ok(sent.message_id)
    }

    /// Replace the text of a sent message.
    pub(crate) async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), SuitcastError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": PARSE_MODE,
        });
        // `result` is the edited Message, or `true` for inline messages.
        match self.call::<serde_json::Value>("editMessageText", &body).await {
            Ok(_) => Ok(()),
            Err(SuitcastError::Channel(msg)) if msg.contains("message is not modified") => {
                debug!("telegram: message {message_id} in {chat_id} already up to date");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Register `url` as the webhook endpoint. An empty `secret` disables the
    /// header check on Telegram's side.
    pub async fn set_webhook(&self, url: &str, secret: &str) -> Result<(), SuitcastError> {
        let mut body = serde_json::json!({
            "url": url,
            "allowed_updates": ALLOWED_UPDATES,
        });
        if !secret.is_empty() {
            body["secret_token"] = serde_json::Value::from(secret);
        }
        let _: bool = self.call("setWebhook", &body).await?;
        info!("telegram webhook registered at {url}");
        Ok(())
    }

    /// Remove any registered webhook so long polling can run.
    pub async fn delete_webhook(&self) -> Result<(), SuitcastError> {
        let body = serde_json::json!({ "drop_pending_updates": false });
        let _: bool = self.call("deleteWebhook", &body).await?;
        debug!("telegram webhook cleared");
        Ok(())
    }
}

/// Whether a Bot API error describes malformed message entities.
pub(crate) fn is_entity_error(description: &str) -> bool {
    description.contains("can't parse entities")
}
