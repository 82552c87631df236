use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A text update delivered by a transport, either a fresh post or an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundUpdate {
    /// Transport-level update sequence number.
    pub update_id: i64,
    /// Whether this update is an edit of an earlier message.
    pub is_edit: bool,
    /// Chat the message was authored on behalf of (Telegram `sender_chat`,
    /// or the channel itself for channel posts).
    pub source_chat_id: Option<i64>,
    /// Chat the message lives in; command replies go here.
    pub chat_id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default)]
    pub chat_type: String,
    /// Platform message identifier.
    pub message_id: i64,
    /// Human sender, absent for channel posts.
    #[serde(default)]
    pub sender_user_id: Option<i64>,
    /// Message text content.
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundUpdate {
    /// Whether this update was authored by the given chat.
    pub fn is_from(&self, chat_id: i64) -> bool {
        self.source_chat_id == Some(chat_id)
    }

    /// Whether the text looks like a bot command (`/help`, `/status@bot`).
    pub fn is_command(&self) -> bool {
        self.text.trim_start().starts_with('/')
    }

    /// Short, char-boundary-safe preview of the text for logs.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.text.chars().take(max_chars).collect();
        if self.text.chars().count() > max_chars {
            preview.push('…');
        }
        preview
    }
}
