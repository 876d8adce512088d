//! Telegram framework layer: adapters, ChatTransport implementation, dispatcher runner.

mod adapters;
mod runner;
mod transport;

pub use adapters::{TelegramCallbackWrapper, TelegramMessageWrapper, TelegramUserWrapper};
pub use runner::run_bot;
pub use transport::TelegramTransport;
