//! Core types and traits: Event, ChatTransport, error, logger.
//! Transport-agnostic; the telegram module adapts teloxide to these types.

pub mod error;
pub mod logger;
pub mod transport;
pub mod types;

pub use error::{Result, SupportError};
pub use logger::init_tracing;
pub use transport::{parse_message_id, ChatTransport, InlineButton, InlineKeyboard};
pub use types::{Chat, Event, EventKind, ReplyContext, ToCoreEvent, ToCoreUser, User};
