//! Per-user conversation sessions, held only in process memory.
//!
//! The map is capacity-bounded with least-recently-written eviction so long-running
//! processes do not grow without limit. Sessions are lost on restart; new ones are
//! created as users re-enter the support flow.

use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Where a user (or staff member) is in the support conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    /// The user pressed /support and the next text message belongs to their ticket.
    AwaitingUserMessage,
    /// A staff member pressed "reply" and the next text message goes to this user.
    AwaitingStaffReply { target_user_id: i64 },
}

/// Transient per-user session: conversation state plus the active ticket, if one was saved.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: ConversationState,
    pub ticket_id: Option<Uuid>,
}

struct Inner {
    map: HashMap<i64, Session>,
    /// Write recency, oldest first. Evicted when over capacity.
    order: VecDeque<i64>,
}

/// Bounded map from user id to [`Session`]. Shared via `Arc`; the dispatcher
/// serializes events per chat, so read-modify-write per user stays ordered.
pub struct SessionMap {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl SessionMap {
    /// Creates a map holding at most `capacity` sessions.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, user_id: i64) -> Option<Session> {
        self.inner.lock().await.map.get(&user_id).cloned()
    }

    pub async fn set(&self, user_id: i64, session: Session) {
        let mut inner = self.inner.lock().await;
        inner.order.retain(|id| *id != user_id);
        inner.order.push_back(user_id);
        inner.map.insert(user_id, session);

        while inner.map.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.map.remove(&evicted);
                debug!(user_id = evicted, "Evicted oldest session");
            }
        }
    }

    pub async fn clear(&self, user_id: i64) {
        let mut inner = self.inner.lock().await;
        inner.map.remove(&user_id);
        inner.order.retain(|id| *id != user_id);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
