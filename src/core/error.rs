//! Error types for the bot core.
//!
//! [`SupportError`] is the top-level error; remote ticket-store failures map to
//! `Transport` / `Remote` / `Decode` so callers can distinguish network trouble
//! from API rejections and malformed bodies.

use thiserror::Error;

/// Top-level error (ticket store, chat transport, session, config, IO).
#[derive(Error, Debug)]
pub enum SupportError {
    /// Network-level failure reaching the ticket API (connect, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The ticket API answered with a non-2xx status.
    #[error("Remote error ({status}): {body}")]
    Remote { status: u16, body: String },

    /// The ticket API answered 2xx but the body did not parse.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An operation referenced a user or ticket with no live session.
    #[error("No session for user {0}")]
    SessionNotFound(i64),

    /// A staff reply could not be routed to a user chat.
    #[error("No correlation entry for user {0}")]
    CorrelationMissing(i64),

    /// Chat transport failure (sending or editing a message).
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupportError {
    /// True when the remote store rejected the request with the given status.
    pub fn is_remote_status(&self, status: u16) -> bool {
        matches!(self, SupportError::Remote { status: s, .. } if *s == status)
    }
}

/// Result type for core operations; uses [`SupportError`].
pub type Result<T> = std::result::Result<T, SupportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_predicate() {
        let err = SupportError::Remote {
            status: 404,
            body: "not found".to_string(),
        };
        assert!(err.is_remote_status(404));
        assert!(!err.is_remote_status(500));
        assert!(!SupportError::Transport("refused".to_string()).is_remote_status(404));
    }

    #[test]
    fn test_error_display() {
        let err = SupportError::Remote {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Remote error (500): boom");
        assert_eq!(
            SupportError::CorrelationMissing(42).to_string(),
            "No correlation entry for user 42"
        );
    }
}
