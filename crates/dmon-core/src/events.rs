//! Event records produced each tick, and the source of call/SMS activity.

use std::{fmt, path::Path};

use chrono::{DateTime, Local};

/// Extensions (lowercase, no dot) that count as new media.
pub const MEDIA_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "mp4", "avi", "mkv"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Per-tick timestamp, also used in log file names.
pub fn tick_timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Case-insensitive suffix match against [`MEDIA_EXTENSIONS`].
///
/// Matches on the whole file name, so a bare `.jpg` counts as media.
pub fn is_media_file(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let lower = name.to_string_lossy().to_ascii_lowercase();
    MEDIA_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Call,
    Sms,
    Media,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Call => "call",
            EventKind::Sms => "sms",
            EventKind::Media => "media",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventDetails {
    Call { caller: String, duration: String },
    Sms { sender: String, message: String },
    Media { filename: String },
}

/// One unit of device activity, formatted for a log file and the chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub timestamp: String,
    pub details: EventDetails,
}

impl EventRecord {
    pub fn call(caller: &str, duration: &str, timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            details: EventDetails::Call {
                caller: caller.to_string(),
                duration: duration.to_string(),
            },
        }
    }

    pub fn sms(sender: &str, message: &str, timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            details: EventDetails::Sms {
                sender: sender.to_string(),
                message: message.to_string(),
            },
        }
    }

    pub fn media(filename: &str, timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            details: EventDetails::Media {
                filename: filename.to_string(),
            },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.details {
            EventDetails::Call { .. } => EventKind::Call,
            EventDetails::Sms { .. } => EventKind::Sms,
            EventDetails::Media { .. } => EventKind::Media,
        }
    }

    /// Text written to the log file and sent as the attachment body.
    pub fn render(&self) -> String {
        let ts = &self.timestamp;
        match &self.details {
            EventDetails::Call { caller, duration } => {
                format!("Call Log:\nCaller: {caller}\nDuration: {duration}\nTimestamp: {ts}")
            }
            EventDetails::Sms { sender, message } => {
                format!("SMS Log:\nSender: {sender}\nMessage: {message}\nTimestamp: {ts}")
            }
            EventDetails::Media { filename } => {
                format!("New Media Detected:\nFilename: {filename}\nTimestamp: {ts}")
            }
        }
    }

    /// `{kind}_log_{ts}.txt`; media records also carry the source filename so
    /// several files found in one tick never share a log file.
    pub fn log_file_name(&self) -> String {
        match &self.details {
            EventDetails::Media { filename } => {
                format!(
                    "{}_log_{}_{}.txt",
                    self.kind(),
                    self.timestamp,
                    sanitize_file_component(filename)
                )
            }
            _ => format!("{}_log_{}.txt", self.kind(), self.timestamp),
        }
    }
}

fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Source of call and SMS activity for a tick.
///
/// Media is discovered by scanning the filesystem and does not go through
/// this trait.
pub trait EventSource: Send + Sync {
    fn collect(&self, timestamp: &str) -> Vec<EventRecord>;
}

/// Fixed fake activity: one call and one SMS per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedEventSource;

impl EventSource for SimulatedEventSource {
    fn collect(&self, timestamp: &str) -> Vec<EventRecord> {
        vec![
            EventRecord::call("+1234567890", "5 minutes", timestamp),
            EventRecord::sms("+0987654321", "Hello, this is a test SMS.", timestamp),
        ]
    }
}
