//! Core types: user, chat, inbound event, and transport conversion traits.
//!
//! Types are split into one file per main type for easier navigation and alignment with project conventions.

mod chat;
mod event;
mod user;

pub use chat::Chat;
pub use event::{Event, EventKind, ReplyContext, ToCoreEvent, ToCoreUser};
pub use user::User;
