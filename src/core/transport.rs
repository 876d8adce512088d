//! Chat transport abstraction for sending and editing messages.
//!
//! [`ChatTransport`] is transport-agnostic; the telegram module implements it via teloxide.
//! Keyboards are modeled here so the support flow can attach inline buttons without
//! depending on a concrete bot framework.

use crate::core::error::{Result, SupportError};
use async_trait::async_trait;

/// One inline button: visible label plus the callback data delivered when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard: rows of buttons attached to an outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Keyboard with one button per row.
    pub fn single_column(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

/// Abstraction for sending and editing messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a text message and returns its transport-specific id (used for correlation).
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<String>;
    /// Sends a text message with an inline keyboard; returns the message id.
    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<String>;
    /// Edits an already-sent message. `message_id` is transport-specific (e.g. Telegram numeric string).
    async fn edit_message(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()>;
}

/// Parses a message id string into an i32. Used by edit_message.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| SupportError::Bot(format!("Invalid message_id for edit: {}", s)))
}
