use std::{path::Path, sync::Arc};

use crate::{domain::ChatId, logging::MonitorLog, messaging::port::MessagingPort};

/// Sends text and files to the one configured chat.
///
/// Transport failures are logged and dropped. Every method reports whether
/// the send went through, but callers are free to ignore it.
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
    log: Arc<dyn MonitorLog>,
}

impl Notifier {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        chat_id: ChatId,
        log: Arc<dyn MonitorLog>,
    ) -> Self {
        Self {
            messenger,
            chat_id,
            log,
        }
    }

    pub async fn send_message(&self, text: &str) -> bool {
        match self.messenger.send_text(self.chat_id, text).await {
            Ok(_) => {
                self.log.info(&format!("Sent message: {text}"));
                true
            }
            Err(e) => {
                self.log.error(&format!("Failed to send message: {e}"));
                false
            }
        }
    }

    /// Upload `path` as a document. A missing file is a warning, not a send.
    pub async fn send_file(&self, path: &Path) -> bool {
        if !path.exists() {
            self.log.warn(&format!("File not found: {}", path.display()));
            return false;
        }

        match self.messenger.send_document(self.chat_id, path).await {
            Ok(_) => {
                self.log.info(&format!("Sent file: {}", path.display()));
                true
            }
            Err(e) => {
                self.log
                    .error(&format!("Error sending file {}: {e}", path.display()));
                false
            }
        }
    }
}
