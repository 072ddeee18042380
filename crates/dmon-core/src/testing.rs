use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::port::MessagingPort,
    Error, Result,
};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh, empty directory under `/tmp`.
pub(crate) fn tmp_dir(prefix: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = PathBuf::from(format!("/tmp/{prefix}-{}-{ts}-{n}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Records every call. Documents are read at send time so tests can check
/// what was actually uploaded.
#[derive(Default)]
pub(crate) struct FakeMessenger {
    fail: bool,
    next_id: Mutex<i32>,
    texts: Mutex<Vec<String>>,
    documents: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeMessenger {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub(crate) fn documents(&self) -> Vec<(PathBuf, String)> {
        self.documents.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.texts().len() + self.documents().len()
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::External("telegram error: network down".into()));
        }
        Ok(self.alloc(chat_id))
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path) -> Result<MessageRef> {
        let body = fs::read_to_string(path).unwrap_or_default();
        self.documents
            .lock()
            .unwrap()
            .push((path.to_path_buf(), body));
        if self.fail {
            return Err(Error::External("telegram error: network down".into()));
        }
        Ok(self.alloc(chat_id))
    }
}
