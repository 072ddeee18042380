use std::sync::Mutex;

use crate::{Error, Result};

/// Initialize the global tracing subscriber for the binary.
///
/// Components never log through globals directly; they receive a
/// [`MonitorLog`] handle. The production handle forwards here.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,dmon=info,dmon_core=info,dmon_telegram=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::External(format!("failed to install logger: {e}")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Logging collaborator handed to each monitor component.
pub trait MonitorLog: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Forwards to `tracing`, tagging every line with the owning component.
#[derive(Clone, Debug)]
pub struct TracingLog {
    component: &'static str,
}

impl TracingLog {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl MonitorLog for TracingLog {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(component = self.component, "{message}"),
            LogLevel::Warn => tracing::warn!(component = self.component, "{message}"),
            LogLevel::Error => tracing::error!(component = self.component, "{message}"),
        }
    }
}

/// In-memory log that keeps every entry. Used by tests and embedders that
/// want to inspect what the monitor reported.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl MonitorLog for MemoryLog {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}
