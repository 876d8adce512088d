//! Support session state machine.
//!
//! Decides whether an inbound message starts a new ticket or appends to an open
//! one, relays it to the counterpart party, and keeps the conversation alive
//! when the ticket store is unreachable: every remote failure is logged and
//! downgraded to a "not saved" reference, never surfaced as a crash.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::core::{
    ChatTransport, Event, EventKind, InlineButton, InlineKeyboard, Result, SupportError,
};
use crate::relay::RelayRouter;
use crate::session::{ConversationState, Session, SessionMap};
use crate::ticket::{Attachment, TicketStore};

const SUPPORT_PROMPT: &str =
    "Support\n\nDescribe your problem or question and we will get back to you shortly.";
const CANCELLED_TEXT: &str = "Support request cancelled.";
const ACK_SAVED: &str = "Your message has been sent to support. We will reply shortly.";
const ACK_NOT_SAVED: &str =
    "Your message has been forwarded to support, but could not be saved. We will still get back to you.";
const REPLY_DELIVERED: &str = "Reply delivered to the user.";
const REPLY_NO_CHAT: &str = "Could not find the user's chat.";

/// Drives user- and staff-side message flow. All collaborators are injected;
/// the flow owns only the session map and correlation state.
pub struct SupportFlow {
    store: Arc<dyn TicketStore>,
    transport: Arc<dyn ChatTransport>,
    sessions: SessionMap,
    relay: RelayRouter,
}

impl SupportFlow {
    pub fn new(
        store: Arc<dyn TicketStore>,
        transport: Arc<dyn ChatTransport>,
        staff_chat_id: i64,
        session_capacity: usize,
    ) -> Self {
        Self {
            store,
            transport: transport.clone(),
            sessions: SessionMap::new(session_capacity),
            relay: RelayRouter::new(transport, staff_chat_id),
        }
    }

    /// Entry point for every inbound event. Remote-store failures never escape;
    /// only chat-transport errors propagate, for the dispatcher to log.
    #[instrument(skip(self, event), fields(user_id = event.user.id, chat_id = event.chat.id))]
    pub async fn handle_event(&self, event: &Event) -> Result<()> {
        if event.is_command("support") {
            return self.start_support(event).await;
        }
        if event.is_command("cancel") {
            return self.cancel(event).await;
        }
        match &event.kind {
            EventKind::Callback(data) => self.handle_callback(event, data.clone()).await,
            EventKind::Text => self.handle_text(event).await,
            // Commands this bot does not own.
            EventKind::Command(_) => Ok(()),
        }
    }

    async fn handle_callback(&self, event: &Event, data: String) -> Result<()> {
        if data == "support" {
            return self.start_support(event).await;
        }
        if data == "cancel" {
            return self.cancel(event).await;
        }
        if let Some(target) = parse_target(&data, "reply:") {
            return self.start_staff_reply(event, target).await;
        }
        if let Some(target) = parse_target(&data, "resolve:") {
            return self.resolve(event, target).await;
        }
        Ok(())
    }

    /// User entered the support flow. An open ticket recorded in the session or
    /// the correlation table is carried over so follow-ups append instead of
    /// opening a second ticket.
    async fn start_support(&self, event: &Event) -> Result<()> {
        let existing = match self.sessions.get(event.user.id).await.and_then(|s| s.ticket_id) {
            Some(ticket) => Some(ticket),
            None => self.relay.ticket_for(event.user.id).await,
        };
        self.sessions
            .set(
                event.user.id,
                Session {
                    state: ConversationState::AwaitingUserMessage,
                    ticket_id: existing,
                },
            )
            .await;
        info!(user_id = event.user.id, ticket_id = ?existing, "Support session opened");

        let keyboard =
            InlineKeyboard::single_column(vec![InlineButton::new("Cancel", "cancel")]);
        self.transport
            .send_message_with_keyboard(event.chat.id, SUPPORT_PROMPT, &keyboard)
            .await?;
        Ok(())
    }

    async fn cancel(&self, event: &Event) -> Result<()> {
        self.sessions.clear(event.user.id).await;
        info!(user_id = event.user.id, "Support session cancelled");
        self.transport
            .send_message(event.chat.id, CANCELLED_TEXT)
            .await?;
        Ok(())
    }

    async fn handle_text(&self, event: &Event) -> Result<()> {
        let session = self.sessions.get(event.user.id).await.unwrap_or_default();
        match session.state {
            ConversationState::AwaitingStaffReply { target_user_id } => {
                self.staff_reply(event, target_user_id).await
            }
            ConversationState::AwaitingUserMessage => {
                self.user_message(event, session.ticket_id).await
            }
            ConversationState::Idle => {
                // A plain reply to a message the relay sent re-enters the flow
                // without /support. Correlation is by message id, not text.
                if let Some(reply) = &event.reply_to {
                    if let Some(thread_user) = self
                        .relay
                        .thread_user_for(event.chat.id, &reply.message_id)
                        .await
                    {
                        if thread_user == event.user.id {
                            return self.user_message(event, session.ticket_id).await;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Saves the user's message (creating a ticket when none is open), relays it
    /// to the staff channel, acknowledges the user, and returns to Idle.
    async fn user_message(&self, event: &Event, session_ticket: Option<Uuid>) -> Result<()> {
        let attachments: Vec<Attachment> = event
            .attachments
            .iter()
            .map(|id| Attachment::new(id.clone()))
            .collect();
        let origin_chat = event.chat.id.to_string();

        let known_ticket = match session_ticket {
            Some(ticket) => Some(ticket),
            None => self.relay.ticket_for(event.user.id).await,
        };

        // saved: what the relay notice shows; kept: what the session remembers.
        let (saved, kept) = match known_ticket {
            Some(ticket) => {
                match self
                    .store
                    .append_message(
                        ticket,
                        &event.user,
                        &event.text,
                        &origin_chat,
                        &event.message_id,
                        false,
                        &attachments,
                    )
                    .await
                {
                    Ok(_) => (Some(ticket), Some(ticket)),
                    Err(e) => {
                        error!(error = %e, ticket_id = %ticket, user_id = event.user.id,
                            "Failed to append message; relaying unsaved");
                        (None, Some(ticket))
                    }
                }
            }
            None => {
                match self
                    .store
                    .create_ticket(
                        &event.user,
                        &event.text,
                        &origin_chat,
                        &event.message_id,
                        &attachments,
                    )
                    .await
                {
                    Ok(ticket) => (Some(ticket.id), Some(ticket.id)),
                    Err(e) => {
                        error!(error = %e, user_id = event.user.id,
                            "Failed to create ticket; relaying unsaved");
                        (None, None)
                    }
                }
            }
        };

        if let Err(e) = self
            .relay
            .notify_staff(
                &event.user,
                event.chat.id,
                &event.message_id,
                &event.text,
                saved,
            )
            .await
        {
            error!(error = %e, user_id = event.user.id, "Failed to notify staff channel");
        }

        let ack = if saved.is_some() { ACK_SAVED } else { ACK_NOT_SAVED };
        self.transport.send_message(event.chat.id, ack).await?;

        self.sessions
            .set(
                event.user.id,
                Session {
                    state: ConversationState::Idle,
                    ticket_id: kept,
                },
            )
            .await;
        Ok(())
    }

    /// Staff pressed "reply" on a relayed notice.
    async fn start_staff_reply(&self, event: &Event, target_user_id: i64) -> Result<()> {
        let name = self
            .relay
            .display_name(target_user_id)
            .await
            .unwrap_or_else(|| target_user_id.to_string());
        self.sessions
            .set(
                event.user.id,
                Session {
                    state: ConversationState::AwaitingStaffReply { target_user_id },
                    ticket_id: None,
                },
            )
            .await;
        self.transport
            .send_message(
                event.chat.id,
                &format!("Replying to {} (id {}). Type your answer:", name, target_user_id),
            )
            .await?;
        Ok(())
    }

    /// Staff typed the reply text: append it to the correlated ticket, deliver
    /// it to the user's chat, and return the staff session to Idle.
    async fn staff_reply(&self, event: &Event, target_user_id: i64) -> Result<()> {
        if let Some(ticket) = self.relay.ticket_for(target_user_id).await {
            if let Err(e) = self
                .store
                .append_message(
                    ticket,
                    &event.user,
                    &event.text,
                    &event.chat.id.to_string(),
                    &event.message_id,
                    true,
                    &[],
                )
                .await
            {
                error!(error = %e, ticket_id = %ticket, "Failed to save staff reply; delivering anyway");
            }
        } else {
            warn!(
                target_user_id = target_user_id,
                "No saved ticket for staff reply; delivering without persistence"
            );
        }

        match self.relay.deliver_to_user(target_user_id, &event.text).await {
            Ok(()) => {
                self.transport
                    .send_message(event.chat.id, REPLY_DELIVERED)
                    .await?;
            }
            Err(SupportError::CorrelationMissing(_)) => {
                warn!(target_user_id = target_user_id, "No correlation entry for staff reply");
                self.transport
                    .send_message(event.chat.id, REPLY_NO_CHAT)
                    .await?;
            }
            Err(e) => {
                error!(error = %e, target_user_id = target_user_id, "Failed to deliver staff reply");
                self.transport
                    .send_message(event.chat.id, "Failed to deliver the reply.")
                    .await?;
            }
        }

        self.sessions.clear(event.user.id).await;
        Ok(())
    }

    /// Staff pressed "resolve": close the correlated ticket. Idempotent from any
    /// state; no session transition.
    async fn resolve(&self, event: &Event, target_user_id: i64) -> Result<()> {
        match self.relay.ticket_for(target_user_id).await {
            Some(ticket) => match self.store.close_ticket(ticket, event.user.id).await {
                Ok(_) => {
                    info!(ticket_id = %ticket, target_user_id = target_user_id, "Ticket closed")
                }
                Err(e) => {
                    error!(error = %e, ticket_id = %ticket, "Failed to close ticket")
                }
            },
            None => {
                info!(target_user_id = target_user_id, "Resolve pressed with no saved ticket")
            }
        }
        self.transport
            .send_message(
                event.chat.id,
                &format!("Conversation with user {} marked as resolved.", target_user_id),
            )
            .await?;
        Ok(())
    }

    /// Session state for a user, for tests and diagnostics.
    pub async fn session_state(&self, user_id: i64) -> ConversationState {
        self.sessions
            .get(user_id)
            .await
            .map(|s| s.state)
            .unwrap_or_default()
    }
}

fn parse_target(data: &str, prefix: &str) -> Option<i64> {
    data.strip_prefix(prefix)?.parse().ok()
}
