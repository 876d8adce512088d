//! # Support ticket relay bot
//!
//! Bridges a Telegram chat to a REST ticket store. Users open tickets with /support,
//! the bot mirrors every message into the remote store and relays it to a staff channel;
//! staff replies are routed back to the originating chat via correlation tracking.
//! Core (Event, ChatTransport, errors), ticket client, session map, relay router, and the
//! support state machine are transport-agnostic; telegram wires them to teloxide.

pub mod cli;
pub mod config;
pub mod core;
pub mod relay;
pub mod session;
pub mod support;
pub mod telegram;
pub mod ticket;

// Re-export CLI
pub use cli::{Cli, Commands};

// Re-export core
pub use crate::core::{
    init_tracing, parse_message_id, Chat, ChatTransport, Event, EventKind, InlineButton,
    InlineKeyboard, ReplyContext, Result, SupportError, ToCoreEvent, ToCoreUser, User,
};

pub use config::BotConfig;
pub use relay::{CorrelationEntry, RelayRouter};
pub use session::{ConversationState, Session, SessionMap};
pub use support::SupportFlow;
pub use telegram::{run_bot, TelegramCallbackWrapper, TelegramMessageWrapper, TelegramTransport};
pub use ticket::{
    Attachment, MemoryTicketStore, Ticket, TicketApiClient, TicketMessage, TicketStatus,
    TicketStore, TicketWithMessages,
};
