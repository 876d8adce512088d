//! Bot configuration, loaded from environment variables.
//!
//! One explicit structure resolved once at startup; required fields fail fast in
//! `validate()` instead of surfacing later as confusing runtime errors.

use anyhow::Result;
use std::env;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// Startup configuration for the support bot.
pub struct BotConfig {
    pub bot_token: String,
    /// Base URL of the remote ticket API, e.g. `http://tickets.local:8080`.
    pub ticket_api_url: String,
    /// Opaque Authorization header value for the ticket API.
    pub ticket_api_token: String,
    /// Chat that receives relayed support notices and hosts the reply buttons.
    pub staff_chat_id: i64,
    pub request_timeout_secs: u64,
    pub session_capacity: usize,
    pub log_file: String,
    /// Optional: Telegram Bot API base URL override (used by tests to point at a mock server).
    pub telegram_api_url: Option<String>,
}

impl BotConfig {
    /// Loads configuration from environment variables.
    /// If `token` is given it overrides `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").unwrap_or_default(),
        };
        let ticket_api_url = env::var("TICKET_API_URL").unwrap_or_default();
        let ticket_api_token = env::var("TICKET_API_TOKEN").unwrap_or_default();
        let staff_chat_id = env::var("STAFF_CHAT_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let request_timeout_secs = env::var("TICKET_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let session_capacity = env::var("SESSION_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SESSION_CAPACITY);
        let log_file = "logs/support-bot.log".to_string();
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();

        Ok(Self {
            bot_token,
            ticket_api_url,
            ticket_api_token,
            staff_chat_id,
            request_timeout_secs,
            session_capacity,
            log_file,
            telegram_api_url,
        })
    }

    /// Checks required fields and numeric ranges. Called once before the bot starts.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN is not set");
        }
        if self.ticket_api_url.is_empty() {
            anyhow::bail!("TICKET_API_URL is not set");
        }
        if self.ticket_api_token.is_empty() {
            anyhow::bail!("TICKET_API_TOKEN is not set");
        }
        if self.staff_chat_id == 0 {
            anyhow::bail!("STAFF_CHAT_ID is not set or not a valid chat id");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("TICKET_API_TIMEOUT_SECS must be at least 1");
        }
        if self.session_capacity == 0 {
            anyhow::bail!("SESSION_CAPACITY must be at least 1");
        }
        Ok(())
    }
}
