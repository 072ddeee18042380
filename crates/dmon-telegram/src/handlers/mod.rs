//! Inbound Telegram update handlers.
//!
//! Only the configured chat is served; everything else is dropped silently.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::ListenerState;

mod commands;

pub async fn handle_message(
    bot: Bot,
    msg: Message,
    state: Arc<ListenerState>,
) -> ResponseResult<()> {
    if msg.chat.id.0 != state.chat_id.0 {
        tracing::debug!("Ignoring message from chat {}", msg.chat.id.0);
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !text.starts_with('/') {
        return Ok(());
    }

    commands::handle_command(bot, msg.chat.id, text, &state).await
}
