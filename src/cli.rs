//! Command-line interface for the support bot binary.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::BotConfig;

/// Support relay bot CLI.
#[derive(Parser)]
#[command(name = "support-bot", about = "Telegram support ticket relay bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (token from --token or the BOT_TOKEN env var).
    Run {
        #[arg(long)]
        token: Option<String>,
    },
}

/// Loads [`BotConfig`] with an optional token override from the CLI.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}
