use teloxide::prelude::*;

use dmon_core::monitor::MSG_STOP_ISSUED;

use crate::router::ListenerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListenerCommand {
    Help,
    Status,
    Stop,
}

fn parse_command(text: &str) -> Option<ListenerCommand> {
    // Telegram may send `/cmd@botname arg1 ...`
    let first = text.split_whitespace().next().unwrap_or("");
    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    match cmd.as_str() {
        "start" | "help" => Some(ListenerCommand::Help),
        "status" => Some(ListenerCommand::Status),
        "stop" => Some(ListenerCommand::Stop),
        _ => None,
    }
}

fn help_text() -> String {
    [
        "Device monitor commands:",
        "/status - show monitored folders",
        "/stop - stop monitoring after the current tick",
    ]
    .join("\n")
}

fn status_text(state: &ListenerState) -> String {
    let stop_pending = if state.stop.is_raised() { "yes" } else { "no" };
    format!(
        "Monitoring is active.\nMedia folder: {}\nArchive folder: {}\nTick interval: {}s\nStop pending: {stop_pending}",
        state.image_dir.display(),
        state.archive_dir.display(),
        state.tick_interval_secs,
    )
}

fn stop_reply(state: &ListenerState) -> String {
    match state.stop.raise() {
        Ok(()) => MSG_STOP_ISSUED.to_string(),
        Err(e) => {
            tracing::error!("Failed to raise stop signal: {e}");
            format!("Could not issue stop signal: {e}")
        }
    }
}

pub(super) async fn handle_command(
    bot: Bot,
    chat: teloxide::types::ChatId,
    text: &str,
    state: &ListenerState,
) -> ResponseResult<()> {
    let Some(cmd) = parse_command(text) else {
        return Ok(());
    };

    let reply = match cmd {
        ListenerCommand::Help => help_text(),
        ListenerCommand::Status => status_text(state),
        ListenerCommand::Stop => {
            tracing::info!("Stop requested from chat {}", chat.0);
            stop_reply(state)
        }
    };

    bot.send_message(chat, reply).await?;
    Ok(())
}
