//! Relay router: forwards user messages to the staff channel and staff replies
//! back to the originating chat, tracking correlation entries so replies thread
//! by message id instead of text matching.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::{
    ChatTransport, InlineButton, InlineKeyboard, Result, SupportError, User,
};

/// Most-recent correlation entries kept per user.
const ENTRIES_PER_USER: usize = 16;
/// Upper bound on the relayed-message index (oldest evicted first).
const RELAYED_INDEX_CAPACITY: usize = 4096;

/// Record linking a relayed message to the ticket and user it represents.
#[derive(Debug, Clone)]
pub struct CorrelationEntry {
    pub user_id: i64,
    pub user_chat_id: i64,
    pub origin_msg_id: String,
    pub relayed_msg_id: String,
    pub ticket_id: Option<Uuid>,
    pub display_name: String,
}

struct RelayedIndex {
    /// (chat id, message id) of a bot-sent relay message → user the thread belongs to.
    map: HashMap<(i64, String), i64>,
    order: VecDeque<(i64, String)>,
}

impl RelayedIndex {
    fn insert(&mut self, key: (i64, String), user_id: i64) {
        self.map.insert(key.clone(), user_id);
        self.order.push_back(key);
        while self.map.len() > RELAYED_INDEX_CAPACITY {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            }
        }
    }
}

/// Routes messages between user chats and the staff channel.
pub struct RelayRouter {
    transport: Arc<dyn ChatTransport>,
    staff_chat_id: i64,
    per_user: Mutex<HashMap<i64, VecDeque<CorrelationEntry>>>,
    relayed: Mutex<RelayedIndex>,
}

impl RelayRouter {
    pub fn new(transport: Arc<dyn ChatTransport>, staff_chat_id: i64) -> Self {
        Self {
            transport,
            staff_chat_id,
            per_user: Mutex::new(HashMap::new()),
            relayed: Mutex::new(RelayedIndex {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Formats and sends a new-ticket/new-message notice to the staff channel,
    /// then records the correlation entry keyed by the staff-side message id.
    /// `ticket_id` is `None` when the remote store did not accept the ticket.
    pub async fn notify_staff(
        &self,
        user: &User,
        user_chat_id: i64,
        origin_msg_id: &str,
        text: &str,
        ticket_id: Option<Uuid>,
    ) -> Result<()> {
        let ticket_ref = ticket_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "not saved".to_string());
        let notice = format!(
            "New support message\n\nFrom: {} (id {})\nTicket: {}\n\n{}",
            user.display_name(),
            user.id,
            ticket_ref,
            text,
        );
        let keyboard = InlineKeyboard::single_column(vec![
            InlineButton::new("Reply", format!("reply:{}", user.id)),
            InlineButton::new("Resolve", format!("resolve:{}", user.id)),
        ]);

        let relayed_msg_id = self
            .transport
            .send_message_with_keyboard(self.staff_chat_id, &notice, &keyboard)
            .await?;

        let entry = CorrelationEntry {
            user_id: user.id,
            user_chat_id,
            origin_msg_id: origin_msg_id.to_string(),
            relayed_msg_id: relayed_msg_id.clone(),
            ticket_id,
            display_name: user.display_name(),
        };
        info!(
            user_id = user.id,
            relayed_msg_id = %relayed_msg_id,
            ticket_id = ?ticket_id,
            "Relayed user message to staff channel"
        );

        let mut per_user = self.per_user.lock().await;
        let entries = per_user.entry(user.id).or_default();
        entries.push_back(entry);
        while entries.len() > ENTRIES_PER_USER {
            entries.pop_front();
        }
        drop(per_user);

        self.relayed
            .lock()
            .await
            .insert((self.staff_chat_id, relayed_msg_id), user.id);
        Ok(())
    }

    /// Sends a staff reply into the target user's chat, using the most recent
    /// correlation entry. Records the delivered message id so a plain reply from
    /// the user threads back into the same ticket.
    pub async fn deliver_to_user(&self, user_id: i64, text: &str) -> Result<()> {
        let entry = self
            .latest_entry(user_id)
            .await
            .ok_or(SupportError::CorrelationMissing(user_id))?;

        let body = format!(
            "Reply from support:\n\n{}\n\nReply to this message to continue the conversation.",
            text
        );
        let sent_id = self
            .transport
            .send_message(entry.user_chat_id, &body)
            .await?;
        info!(
            user_id = user_id,
            chat_id = entry.user_chat_id,
            "Delivered staff reply to user"
        );

        self.relayed
            .lock()
            .await
            .insert((entry.user_chat_id, sent_id), user_id);
        Ok(())
    }

    /// Ticket id from the most recent correlation entry that has one.
    pub async fn ticket_for(&self, user_id: i64) -> Option<Uuid> {
        let per_user = self.per_user.lock().await;
        per_user
            .get(&user_id)?
            .iter()
            .rev()
            .find_map(|e| e.ticket_id)
    }

    /// Display name recorded for the user, if any message was relayed.
    pub async fn display_name(&self, user_id: i64) -> Option<String> {
        let per_user = self.per_user.lock().await;
        per_user
            .get(&user_id)
            .and_then(|entries| entries.back())
            .map(|e| e.display_name.clone())
    }

    /// If the given (chat, message) was sent by the relay, returns the user the
    /// thread belongs to. This is how plain replies re-enter the support flow.
    pub async fn thread_user_for(&self, chat_id: i64, message_id: &str) -> Option<i64> {
        let relayed = self.relayed.lock().await;
        let user = relayed.map.get(&(chat_id, message_id.to_string())).copied();
        debug!(
            chat_id = chat_id,
            message_id = %message_id,
            user = ?user,
            "Correlation lookup for reply"
        );
        user
    }

    /// Most recent correlation entry for a user.
    async fn latest_entry(&self, user_id: i64) -> Option<CorrelationEntry> {
        let per_user = self.per_user.lock().await;
        per_user.get(&user_id).and_then(|e| e.back()).cloned()
    }
}
