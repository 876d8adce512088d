//! In-process ticket store: the direct-storage alternate backend behind the
//! same [`TicketStore`] contract as the REST client. Also used by flow tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::{Result, SupportError, User};

use super::client::TicketStore;
use super::model::{Attachment, Ticket, TicketMessage, TicketStatus, TicketWithMessages};

#[derive(Default)]
struct Inner {
    tickets: HashMap<Uuid, Ticket>,
    /// Messages per ticket, in creation order.
    messages: HashMap<Uuid, Vec<TicketMessage>>,
}

/// Ticket store backed by process memory. Tickets are never deleted, only closed.
#[derive(Default)]
pub struct MemoryTicketStore {
    inner: Mutex<Inner>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open ticket for the given user, if any. Mirrors the lookup the REST API
    /// would serve; used when rebuilding sessions.
    pub async fn open_ticket_for(&self, user_id: i64) -> Option<Ticket> {
        let inner = self.inner.lock().await;
        inner
            .tickets
            .values()
            .find(|t| t.user_id == user_id && t.status == TicketStatus::Open)
            .cloned()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn create_ticket(
        &self,
        user: &User,
        initial_text: &str,
        origin_chat_id: &str,
        origin_msg_id: &str,
        attachments: &[Attachment],
    ) -> Result<Ticket> {
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: user.id,
            status: TicketStatus::Open,
            opened_at: now,
            updated_at: Some(now),
        };
        let message = TicketMessage {
            id: Uuid::new_v4(),
            text: initial_text.to_string(),
            ticket_id: ticket.id,
            user_id: user.id,
            is_staff: false,
            chat_id: origin_chat_id.to_string(),
            msg_id: origin_msg_id.to_string(),
            created_at: now,
            attachments: attachments.to_vec(),
        };

        let mut inner = self.inner.lock().await;
        inner.tickets.insert(ticket.id, ticket.clone());
        inner.messages.insert(ticket.id, vec![message]);
        Ok(ticket)
    }

    async fn append_message(
        &self,
        ticket_id: Uuid,
        author: &User,
        text: &str,
        origin_chat_id: &str,
        origin_msg_id: &str,
        is_staff: bool,
        attachments: &[Attachment],
    ) -> Result<TicketMessage> {
        let mut inner = self.inner.lock().await;
        if !inner.tickets.contains_key(&ticket_id) {
            // Same shape the REST client surfaces for an unknown ticket.
            return Err(SupportError::Remote {
                status: 404,
                body: format!("ticket {} not found", ticket_id),
            });
        }

        let message = TicketMessage {
            id: Uuid::new_v4(),
            text: text.to_string(),
            ticket_id,
            user_id: author.id,
            is_staff,
            chat_id: origin_chat_id.to_string(),
            msg_id: origin_msg_id.to_string(),
            created_at: Utc::now(),
            attachments: attachments.to_vec(),
        };
        inner
            .messages
            .entry(ticket_id)
            .or_default()
            .push(message.clone());
        if let Some(ticket) = inner.tickets.get_mut(&ticket_id) {
            ticket.updated_at = Some(message.created_at);
        }
        Ok(message)
    }

    async fn close_ticket(&self, ticket_id: Uuid, closed_by: i64) -> Result<Ticket> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        inner.messages.entry(ticket_id).or_default().push(TicketMessage {
            id: Uuid::new_v4(),
            text: format!("[system] ticket closed by {}", closed_by),
            ticket_id,
            user_id: closed_by,
            is_staff: true,
            chat_id: String::new(),
            msg_id: String::new(),
            created_at: now,
            attachments: Vec::new(),
        });

        match inner.tickets.get_mut(&ticket_id) {
            Some(ticket) => {
                ticket.status = TicketStatus::Closed;
                ticket.updated_at = Some(now);
                Ok(ticket.clone())
            }
            None => {
                inner.messages.remove(&ticket_id);
                Err(SupportError::Remote {
                    status: 404,
                    body: format!("ticket {} not found", ticket_id),
                })
            }
        }
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketWithMessages> {
        let inner = self.inner.lock().await;
        let ticket = inner.tickets.get(&ticket_id).ok_or(SupportError::Remote {
            status: 404,
            body: format!("ticket {} not found", ticket_id),
        })?;
        Ok(TicketWithMessages {
            ticket: ticket.clone(),
            messages: inner.messages.get(&ticket_id).cloned().unwrap_or_default(),
        })
    }
}
