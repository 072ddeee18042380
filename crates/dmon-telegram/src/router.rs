use std::{path::PathBuf, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use dmon_core::{config::Config, domain::ChatId, stop_signal::StopSignal};

use crate::handlers;

/// Everything the inbound command handlers need.
pub struct ListenerState {
    pub chat_id: ChatId,
    pub image_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub tick_interval_secs: u64,
    pub stop: Arc<StopSignal>,
}

impl ListenerState {
    pub fn new(cfg: &Config, stop: Arc<StopSignal>) -> Self {
        Self {
            chat_id: cfg.chat_id,
            image_dir: cfg.image_dir.clone(),
            archive_dir: cfg.archive_dir.clone(),
            tick_interval_secs: cfg.tick_interval.as_secs(),
            stop,
        }
    }
}

/// Long-poll Telegram for commands until the task is dropped.
pub async fn run_polling(bot: Bot, state: Arc<ListenerState>) -> anyhow::Result<()> {
    match bot.get_me().await {
        Ok(me) => tracing::info!("Bot listener started: @{}", me.username()),
        Err(e) => tracing::warn!("Could not fetch bot identity: {e}"),
    }

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
