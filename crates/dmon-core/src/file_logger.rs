use std::{fs, path::Path};

use crate::{Error, Result};

/// Create or truncate `path` and write `content` into it.
pub fn write_log(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: format!("failed to write log: {e}"),
    })
}

/// Create `dir` (and parents) if missing. Returns true when it was created.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tmp_dir;

    #[test]
    fn write_log_truncates_existing_content() {
        let dir = tmp_dir("dmon-flog");
        let path = dir.join("call_log_x.txt");

        write_log(&path, "a much longer first body").unwrap();
        write_log(&path, "short").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_log_reports_missing_parent() {
        let dir = tmp_dir("dmon-flog-missing");
        let path = dir.join("nope").join("x.txt");

        let err = write_log(&path, "x").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tmp_dir("dmon-flog-ensure").join("logs");
        assert!(ensure_dir(&dir).unwrap());
        assert!(!ensure_dir(&dir).unwrap());
        let _ = fs::remove_dir_all(dir.parent().unwrap());
    }
}
