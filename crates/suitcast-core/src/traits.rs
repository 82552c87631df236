use crate::{error::SuitcastError, message::InboundUpdate};
use async_trait::async_trait;

/// Messaging transport: the wire to the chat platform.
///
/// Telegram implements it over the Bot API; tests implement it in memory.
/// Sent and edited text share one rendering mode so an edit supersedes
/// the original without format drift.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name.
    fn name(&self) -> &str;

    /// Start listening for inbound updates.
    /// Returns a receiver that yields updates in arrival order.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundUpdate>, SuitcastError>;

    /// Send a text message, returning the platform message id.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, SuitcastError>;

    /// Replace the text of a previously sent message.
    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str)
        -> Result<(), SuitcastError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), SuitcastError>;
}
