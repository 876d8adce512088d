//! Converters from teloxide updates to core events.

use teloxide::types::MaybeInaccessibleMessage;

use crate::core::{Chat, Event, EventKind, ReplyContext, ToCoreEvent, ToCoreUser, User};

/// Telegram user to core user.
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

fn anonymous_user() -> User {
    User {
        id: 0,
        username: None,
        first_name: None,
        last_name: None,
    }
}

/// Splits a leading slash command from text: `/support@mybot hi` → `support`.
fn parse_command(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    if name.is_empty() {
        return None;
    }
    let name = name.split('@').next().unwrap_or(name);
    Some(name.to_string())
}

/// Telegram message to core event.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreEvent for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Event {
        let msg = self.0;
        let text = msg
            .text()
            .or_else(|| msg.caption())
            .unwrap_or("")
            .to_string();

        let kind = match parse_command(&text) {
            Some(cmd) => EventKind::Command(cmd),
            None => EventKind::Text,
        };

        let mut attachments = Vec::new();
        if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
            attachments.push(photo.file.id.to_string());
        }
        if let Some(doc) = msg.document() {
            attachments.push(doc.file.id.to_string());
        }

        Event {
            kind,
            user: msg
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(anonymous_user),
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: format!("{:?}", msg.chat.kind),
            },
            message_id: msg.id.to_string(),
            text,
            reply_to: msg.reply_to_message().map(|r| ReplyContext {
                message_id: r.id.to_string(),
            }),
            attachments,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Telegram callback query (inline-button press) to core event.
pub struct TelegramCallbackWrapper<'a>(pub &'a teloxide::types::CallbackQuery);

impl<'a> ToCoreEvent for TelegramCallbackWrapper<'a> {
    fn to_core(&self) -> Event {
        let q = self.0;
        let user = TelegramUserWrapper(&q.from).to_core();
        let (chat, message_id) = match q.message.as_ref() {
            Some(MaybeInaccessibleMessage::Regular(msg)) => (
                Chat {
                    id: msg.chat.id.0,
                    chat_type: format!("{:?}", msg.chat.kind),
                },
                msg.id.to_string(),
            ),
            // Telegram stops serving old message content, but an inaccessible
            // message still names its chat, so a stale staff-channel button
            // keeps routing into the staff channel.
            Some(MaybeInaccessibleMessage::Inaccessible(msg)) => (
                Chat {
                    id: msg.chat.id.0,
                    chat_type: format!("{:?}", msg.chat.kind),
                },
                msg.message_id.to_string(),
            ),
            // No message context at all (inline-mode buttons). Only the
            // presser is known; route to their private chat.
            None => (
                Chat {
                    id: user.id,
                    chat_type: "private".to_string(),
                },
                "0".to_string(),
            ),
        };

        Event {
            kind: EventKind::Callback(q.data.clone().unwrap_or_default()),
            user,
            chat,
            message_id,
            text: String::new(),
            reply_to: None,
            attachments: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }
}
