//! Inbound chat event and transport conversion traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, user::User};

/// Kind of inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A slash command; the name is stored without the leading `/` or bot mention.
    Command(String),
    /// Plain text (or a caption on an attachment-bearing message).
    Text,
    /// An inline-button press carrying its callback data.
    Callback(String),
}

/// Context of the message this event replies to, used for correlation-based threading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyContext {
    pub message_id: String,
}

/// One inbound chat event with user, chat, content, and optional reply context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub user: User,
    pub chat: Chat,
    pub message_id: String,
    pub text: String,
    pub reply_to: Option<ReplyContext>,
    /// Opaque attachment file references carried by the message (photo/document ids).
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// True when the event is the given slash command.
    pub fn is_command(&self, name: &str) -> bool {
        matches!(&self.kind, EventKind::Command(c) if c == name)
    }

    /// Callback data, if this is a button press.
    pub fn callback_data(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Callback(data) => Some(data.as_str()),
            _ => None,
        }
    }
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific update type to core [`Event`].
pub trait ToCoreEvent: Send + Sync {
    fn to_core(&self) -> Event;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind) -> Event {
        Event {
            kind,
            user: User {
                id: 1,
                username: None,
                first_name: None,
                last_name: None,
            },
            chat: Chat {
                id: 1,
                chat_type: "private".to_string(),
            },
            message_id: "10".to_string(),
            text: String::new(),
            reply_to: None,
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_command() {
        assert!(event(EventKind::Command("support".to_string())).is_command("support"));
        assert!(!event(EventKind::Command("start".to_string())).is_command("support"));
        assert!(!event(EventKind::Text).is_command("support"));
    }

    #[test]
    fn test_callback_data() {
        assert_eq!(
            event(EventKind::Callback("reply:42".to_string())).callback_data(),
            Some("reply:42")
        );
        assert_eq!(event(EventKind::Text).callback_data(), None);
    }
}
