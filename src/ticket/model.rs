//! Wire models for the remote ticket API.
//!
//! Field names and shapes follow the API's JSON exactly: tickets own an ordered
//! list of messages; messages carry their origin chat/message ids for reply
//! correlation and an optional list of attachment file references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::User;

/// Ticket lifecycle status. Tickets are never deleted, only closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// A support ticket as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: i64,
    pub status: TicketStatus,
    pub opened_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Opaque attachment file reference linked to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: String,
}

impl Attachment {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

/// One message inside a ticket. Immutable once created; append-only child of a [`Ticket`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: Uuid,
    pub text: String,
    pub ticket_id: Uuid,
    pub user_id: i64,
    pub is_staff: bool,
    /// Origin chat id in the chat platform, kept as an opaque string.
    pub chat_id: String,
    /// Origin message id in the chat platform.
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Ticket with its nested messages, as returned by `GET /ticket/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketWithMessages {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
}

/// Body of `POST /ticket/add`. The client generates the id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub id: Uuid,
    pub user_id: i64,
    pub status: TicketStatus,
    pub opened_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CreateTicketRequest {
    /// New open-ticket request for the given user, stamped with the current time.
    pub fn open_for(user: &User) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user.id,
            status: TicketStatus::Open,
            opened_at: now,
            updated_at: Some(now),
        }
    }
}

/// Body of `POST /ticket/{id}/messages/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub id: Uuid,
    pub text: String,
    pub ticket_id: Uuid,
    pub user_id: i64,
    pub is_staff: bool,
    pub chat_id: String,
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl CreateMessageRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticket_id: Uuid,
        user_id: i64,
        text: &str,
        chat_id: &str,
        msg_id: &str,
        is_staff: bool,
        attachments: &[Attachment],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            ticket_id,
            user_id,
            is_staff,
            chat_id: chat_id.to_string(),
            msg_id: msg_id.to_string(),
            created_at: Utc::now(),
            attachments: attachments.to_vec(),
        }
    }
}
