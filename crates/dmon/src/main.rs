mod cli;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use teloxide::Bot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use dmon_core::{
    config::Config,
    domain::ChatId,
    events::SimulatedEventSource,
    logging::{MonitorLog, TracingLog},
    messaging::port::MessagingPort,
    monitor::{Monitor, MonitorSettings, MSG_STOP_ISSUED},
    notifier::Notifier,
    stop_signal::StopSignal,
};
use dmon_telegram::{
    router::{self, ListenerState},
    TelegramMessenger,
};

use crate::cli::Invocation;

const MSG_ACTIVE: &str = "Monitoring is now active.";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let invocation = match cli::parse(std::env::args_os()) {
        Ok(v) => v,
        Err(e) => e.exit(),
    };

    dmon_core::config::load_dotenv();
    dmon_core::logging::init("dmon")?;

    match invocation {
        Invocation::Stop => issue_stop(),
        Invocation::Run { token, chat_id } => run(token, chat_id).await,
    }
}

/// Leave the marker for a running monitor; it is noticed on its next tick.
fn issue_stop() -> anyhow::Result<()> {
    let path = Config::stop_file_path()?;
    let stop = StopSignal::new(path, Arc::new(TracingLog::new("stop")));
    stop.raise()?;
    println!("Stop signal issued. Monitoring will be stopped soon.");
    Ok(())
}

/// Run the listener and the monitor until interrupted.
///
/// The process also exits, and drops the listener, once the monitor stops
/// on its own, e.g. after `dmon -stop` from another invocation.
async fn run(token: String, chat_id: ChatId) -> anyhow::Result<()> {
    let cfg = Config::load(token, chat_id).context("failed to load configuration")?;
    let log: Arc<dyn MonitorLog> = Arc::new(TracingLog::new("monitor"));

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let notifier = Arc::new(Notifier::new(messenger, cfg.chat_id, log.clone()));
    let stop = Arc::new(StopSignal::new(cfg.stop_file.clone(), log.clone()));

    let mut monitor = Monitor::new(
        MonitorSettings::from(&cfg),
        notifier.clone(),
        stop.clone(),
        Box::new(SimulatedEventSource),
        log.clone(),
    )
    .context("failed to prepare monitor folders")?;

    tracing::info!(
        "Watching {} (archive: {}, every {}s)",
        cfg.image_dir.display(),
        cfg.archive_dir.display(),
        cfg.tick_interval.as_secs()
    );

    let listener_state = Arc::new(ListenerState::new(&cfg, stop.clone()));
    let listener = tokio::spawn(async move {
        if let Err(e) = router::run_polling(bot, listener_state).await {
            tracing::error!("Bot listener failed: {e}");
        }
    });

    let cancel = CancellationToken::new();
    let monitor_cancel = cancel.clone();
    let mut monitor_task = tokio::spawn(async move { monitor.run(monitor_cancel).await });

    notifier.send_message(MSG_ACTIVE).await;

    // Either we are interrupted, or another invocation stopped the loop.
    let finished = tokio::select! {
        _ = shutdown_signal() => None,
        res = &mut monitor_task => Some(res),
    };

    let outcome = match finished {
        Some(res) => Some(res),
        None => {
            if let Err(e) = stop.raise() {
                tracing::error!("Failed to raise stop signal: {e}");
            }
            notifier.send_message(MSG_STOP_ISSUED).await;
            cancel.cancel();

            wait_for_monitor(&mut monitor_task, shutdown_wait(cfg.tick_interval), &stop).await
        }
    };

    match outcome {
        Some(Ok(Ok(ticks))) => tracing::info!("Monitoring stopped after {ticks} ticks"),
        Some(Ok(Err(e))) => tracing::error!("Monitor failed: {e}"),
        Some(Err(e)) => tracing::error!("Monitor task failed: {e}"),
        None => {}
    }

    listener.abort();
    Ok(())
}

type MonitorOutcome = Result<dmon_core::Result<u64>, tokio::task::JoinError>;

fn shutdown_wait(tick_interval: Duration) -> Duration {
    tick_interval.saturating_add(SHUTDOWN_GRACE)
}

/// Wait up to `wait` for the loop to notice the stop. On timeout the task is
/// aborted and the marker it never consumed is removed.
async fn wait_for_monitor(
    task: &mut JoinHandle<dmon_core::Result<u64>>,
    wait: Duration,
    stop: &StopSignal,
) -> Option<MonitorOutcome> {
    match tokio::time::timeout(wait, &mut *task).await {
        Ok(res) => Some(res),
        Err(_) => {
            tracing::warn!("Monitor did not stop within {}s; aborting", wait.as_secs());
            task.abort();
            stop.check_and_consume();
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = ctrl_c => tracing::info!("Received SIGINT, stopping monitor"),
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, stopping monitor"),
            },
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {e}");
                let _ = ctrl_c.await;
                tracing::info!("Received SIGINT, stopping monitor");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("Received SIGINT, stopping monitor");
    }
}
