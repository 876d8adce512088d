//! Wraps teloxide::Bot and implements [`crate::core::ChatTransport`]. Production
//! code sends messages via Telegram; tests substitute a recording transport.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
};

use crate::core::{parse_message_id, ChatTransport, InlineKeyboard, Result, SupportError};

/// Teloxide-based implementation of [`ChatTransport`].
pub struct TelegramTransport {
    bot: teloxide::Bot,
}

impl TelegramTransport {
    /// Creates a transport from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }

    fn to_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
                .collect::<Vec<_>>()
        }))
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(|e| SupportError::Bot(e.to_string()))?;
        Ok(sent.id.to_string())
    }

    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), text.to_string())
            .reply_markup(Self::to_markup(keyboard))
            .await
            .map_err(|e| SupportError::Bot(e.to_string()))?;
        Ok(sent.id.to_string())
    }

    async fn edit_message(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(id), text)
            .await
            .map_err(|e| SupportError::Bot(e.to_string()))?;
        Ok(())
    }
}
