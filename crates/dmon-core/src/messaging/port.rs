use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound messenger port.
///
/// Implementations only move bytes; logging and error swallowing live in
/// [`crate::notifier::Notifier`].
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Upload the file at `path` as a document attachment.
    async fn send_document(&self, chat_id: ChatId, path: &Path) -> Result<MessageRef>;
}
