//! File-marker stop signal shared between invocations.
//!
//! The marker's presence means "stop". Any process may raise it; the running
//! monitor consumes it on its next tick, so the latency is one tick interval.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{logging::MonitorLog, Error, Result};

const MARKER_CONTENT: &str = "stop";

pub struct StopSignal {
    path: PathBuf,
    log: Arc<dyn MonitorLog>,
}

impl StopSignal {
    pub fn new(path: PathBuf, log: Arc<dyn MonitorLog>) -> Self {
        Self { path, log }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the marker. Raising an already raised signal is a no-op.
    pub fn raise(&self) -> Result<()> {
        fs::write(&self.path, MARKER_CONTENT).map_err(|e| Error::InvalidPath {
            path: self.path.clone(),
            reason: format!("failed to write stop marker: {e}"),
        })
    }

    pub fn is_raised(&self) -> bool {
        self.path.exists()
    }

    /// True if the marker was present; the marker is removed either way.
    ///
    /// A failed delete is logged but still counts as an observed stop.
    pub fn check_and_consume(&self) -> bool {
        if !self.path.exists() {
            return false;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            self.log.error(&format!(
                "Failed to remove stop marker {}: {e}",
                self.path.display()
            ));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use crate::testing::tmp_dir;

    fn signal(dir: &Path) -> StopSignal {
        StopSignal::new(dir.join("stop.signal"), Arc::new(MemoryLog::new()))
    }

    #[test]
    fn raise_then_consume_once() {
        let dir = tmp_dir("dmon-stop");
        let s = signal(&dir);

        assert!(!s.check_and_consume());
        s.raise().unwrap();
        assert!(s.is_raised());
        assert_eq!(fs::read_to_string(s.path()).unwrap(), "stop");

        assert!(s.check_and_consume());
        assert!(!s.path().exists());
        assert!(!s.check_and_consume());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn raising_twice_is_same_as_once() {
        let dir = tmp_dir("dmon-stop-twice");
        let s = signal(&dir);

        s.raise().unwrap();
        s.raise().unwrap();

        assert!(s.check_and_consume());
        assert!(!s.check_and_consume());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn raise_into_missing_dir_fails() {
        let dir = tmp_dir("dmon-stop-missing");
        let s = StopSignal::new(
            dir.join("gone").join("stop.signal"),
            Arc::new(MemoryLog::new()),
        );
        assert!(matches!(s.raise(), Err(Error::InvalidPath { .. })));
        let _ = fs::remove_dir_all(&dir);
    }
}
