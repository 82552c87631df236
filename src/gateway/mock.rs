//! In-memory transport for gateway, command, and API tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use suitcast_core::{error::SuitcastError, message::InboundUpdate, traits::Transport};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { chat_id: i64, text: String },
    Edit { chat_id: i64, message_id: i64, text: String },
}

/// Records every call; sends return increasing message ids starting at 100.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    failing_sends: Mutex<HashSet<i64>>,
    failing_edits: Mutex<HashSet<i64>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn fail_sends_to(&self, chat_id: i64) {
        self.failing_sends.lock().unwrap().insert(chat_id);
    }

    pub fn fail_edits_in(&self, chat_id: i64) {
        self.failing_edits.lock().unwrap().insert(chat_id);
    }

    pub fn heal(&self) {
        self.failing_sends.lock().unwrap().clear();
        self.failing_edits.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn sends(&self) -> Vec<(i64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { chat_id, text } => Some((chat_id, text)),
                Call::Edit { .. } => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(i64, i64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Edit {
                    chat_id,
                    message_id,
                    text,
                } => Some((chat_id, message_id, text)),
                Call::Send { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundUpdate>, SuitcastError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, SuitcastError> {
        self.calls.lock().unwrap().push(Call::Send {
            chat_id,
            text: text.to_string(),
        });
        if self.failing_sends.lock().unwrap().contains(&chat_id) {
            return Err(SuitcastError::Channel(format!("send to {chat_id} refused")));
        }
        Ok(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), SuitcastError> {
        self.calls.lock().unwrap().push(Call::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        if self.failing_edits.lock().unwrap().contains(&chat_id) {
            return Err(SuitcastError::Channel(format!(
                "edit of {message_id} in {chat_id} refused"
            )));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), SuitcastError> {
        Ok(())
    }
}
