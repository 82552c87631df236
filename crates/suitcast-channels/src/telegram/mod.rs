//! Telegram Bot API transport.
//!
//! Receives round posts by long polling `getUpdates` (or through the webhook
//! server in the binary) and publishes predictions with `sendMessage` /
//! `editMessageText`.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
pub mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;
use suitcast_core::{config::TelegramConfig, error::SuitcastError, message::InboundUpdate};
use tokio::sync::Mutex;
use types::{TgMessage, TgUpdate};

/// Telegram channel using the Bot API.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: TelegramConfig) -> Result<Self, SuitcastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .map_err(|e| SuitcastError::Channel(format!("failed to build http client: {e}")))?;
        let base_url = format!(
            "{}/bot{}",
            config.api_base.trim_end_matches('/'),
            config.bot_token
        );
        Ok(Self {
            config,
            client,
            base_url,
            last_update_id: Arc::new(Mutex::new(None)),
        })
    }
}

/// Convert a Bot API update into an [`InboundUpdate`].
///
/// Accepts fresh and edited messages and channel posts. Updates without text
/// (stickers, photos without caption, service messages) yield `None`.
pub fn parse_update(update: TgUpdate) -> Option<InboundUpdate> {
    let update_id = update.update_id;
    let (msg, is_edit) = if let Some(m) = update.message {
        (m, false)
    } else if let Some(m) = update.edited_message {
        (m, true)
    } else if let Some(m) = update.channel_post {
        (m, false)
    } else if let Some(m) = update.edited_channel_post {
        (m, true)
    } else {
        return None;
    };
    into_inbound(update_id, msg, is_edit)
}

fn into_inbound(update_id: i64, msg: TgMessage, is_edit: bool) -> Option<InboundUpdate> {
    let text = msg.text.or(msg.caption)?;
    let source_chat_id = match msg.sender_chat {
        Some(sender) => Some(sender.id),
        None if msg.chat.chat_type == "channel" => Some(msg.chat.id),
        None => None,
    };
    Some(InboundUpdate {
        update_id,
        is_edit,
        source_chat_id,
        chat_id: msg.chat.id,
        chat_type: msg.chat.chat_type,
        message_id: msg.message_id,
        sender_user_id: msg.from.map(|u| u.id),
        text,
        received_at: chrono::Utc::now(),
    })
}
