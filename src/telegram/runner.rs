//! Dispatcher runner: wires teloxide updates (messages and callback queries) to
//! the support flow. Events are handled inline inside each update handler; the
//! dispatcher's default distribution runs updates from the same chat
//! sequentially, which preserves per-user arrival order.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::core::{init_tracing, ChatTransport, ToCoreEvent};
use crate::support::SupportFlow;
use crate::ticket::{TicketApiClient, TicketStore};

use super::adapters::{TelegramCallbackWrapper, TelegramMessageWrapper};
use super::transport::TelegramTransport;

/// Main entry: init logging, validate config, build the ticket client, relay,
/// and state machine, then run the dispatcher until shutdown.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;

    let bot = match &config.telegram_api_url {
        Some(url) => teloxide::Bot::new(&config.bot_token).set_api_url(url.parse()?),
        None => teloxide::Bot::new(&config.bot_token),
    };

    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));
    let store: Arc<dyn TicketStore> = Arc::new(TicketApiClient::new(
        &config.ticket_api_url,
        &config.ticket_api_token,
        Duration::from_secs(config.request_timeout_secs),
    )?);
    let flow = Arc::new(SupportFlow::new(
        store,
        transport,
        config.staff_chat_id,
        config.session_capacity,
    ));

    info!(
        staff_chat_id = config.staff_chat_id,
        ticket_api_url = %config.ticket_api_url,
        "Bot started successfully"
    );

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![flow])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Update handler failed",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn on_message(msg: teloxide::types::Message, flow: Arc<SupportFlow>) -> Result<()> {
    let event = TelegramMessageWrapper(&msg).to_core();
    info!(
        user_id = event.user.id,
        chat_id = event.chat.id,
        message_id = %event.message_id,
        "Received message"
    );
    if let Err(e) = flow.handle_event(&event).await {
        error!(error = %e, user_id = event.user.id, "Support flow failed");
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, flow: Arc<SupportFlow>) -> Result<()> {
    let event = TelegramCallbackWrapper(&q).to_core();
    info!(
        user_id = event.user.id,
        data = ?event.callback_data(),
        "Received callback"
    );
    if let Err(e) = flow.handle_event(&event).await {
        error!(error = %e, user_id = event.user.id, "Support flow failed");
    }
    if let Err(e) = bot.answer_callback_query(q.id).await {
        error!(error = %e, "Failed to answer callback query");
    }
    Ok(())
}
