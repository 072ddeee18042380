use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::ChatId, errors::Error, Result};

/// Default media folder on an Android device.
pub const DEFAULT_IMAGE_DIR: &str = "/storage/emulated/0/DCIM/Camera";
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
pub const MAX_TICK_INTERVAL_SECS: u64 = 86_400;

const DEFAULT_ARCHIVE_DIR: &str = "archive";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_STOP_FILE: &str = "stop.signal";

/// Typed configuration for a monitor process.
///
/// Credentials come from the command line; everything else from the
/// environment (optionally seeded by a `.env` file) with fixed defaults.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub chat_id: ChatId,

    // Filesystem layout
    pub image_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub log_dir: PathBuf,
    pub stop_file: PathBuf,

    // Loop cadence
    pub tick_interval: Duration,
}

impl Config {
    pub fn load(telegram_bot_token: String, chat_id: ChatId) -> Result<Self> {
        load_dotenv();
        let cwd = env::current_dir()?;
        Self::build(telegram_bot_token, chat_id, &cwd, env_str)
    }

    /// Resolve the configuration from an arbitrary variable lookup.
    ///
    /// Relative paths are resolved against `cwd`.
    pub fn build(
        telegram_bot_token: String,
        chat_id: ChatId,
        cwd: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config("telegram bot token is required".to_string()));
        }

        let image_dir = lookup("DMON_IMAGE_DIR")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR));
        let archive_dir = path_or_default(&lookup, "DMON_ARCHIVE_DIR", cwd, DEFAULT_ARCHIVE_DIR);
        let log_dir = path_or_default(&lookup, "DMON_LOG_DIR", cwd, DEFAULT_LOG_DIR);
        let stop_file = path_or_default(&lookup, "DMON_STOP_FILE", cwd, DEFAULT_STOP_FILE);

        let tick_secs = match lookup("DMON_TICK_INTERVAL_SECS").and_then(non_empty) {
            None => DEFAULT_TICK_INTERVAL_SECS,
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("DMON_TICK_INTERVAL_SECS is not a number: {raw}"))
            })?,
        };
        let tick_interval = Duration::from_secs(tick_secs.clamp(1, MAX_TICK_INTERVAL_SECS));

        Ok(Self {
            telegram_bot_token,
            chat_id,
            image_dir,
            archive_dir,
            log_dir,
            stop_file,
            tick_interval,
        })
    }

    /// Where the stop marker lives, without requiring credentials.
    ///
    /// `dmon -stop` only needs this path.
    pub fn stop_file_path() -> Result<PathBuf> {
        load_dotenv();
        let cwd = env::current_dir()?;
        Ok(path_or_default(
            &env_str,
            "DMON_STOP_FILE",
            &cwd,
            DEFAULT_STOP_FILE,
        ))
    }
}

fn path_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    cwd: &Path,
    default: &str,
) -> PathBuf {
    let raw = lookup(key)
        .and_then(non_empty)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default));
    if raw.is_absolute() {
        raw
    } else {
        cwd.join(raw)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Seed the environment from `./.env` without overriding existing variables.
///
/// Call before `logging::init` so a `RUST_LOG` set there takes effect.
pub fn load_dotenv() {
    load_dotenv_if_present(Path::new(".env"));
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_resolve_against_cwd() {
        let cwd = Path::new("/srv/dmon");
        let cfg = Config::build("tok".into(), ChatId(42), cwd, lookup_from(&[])).unwrap();

        assert_eq!(cfg.image_dir, PathBuf::from(DEFAULT_IMAGE_DIR));
        assert_eq!(cfg.archive_dir, PathBuf::from("/srv/dmon/archive"));
        assert_eq!(cfg.log_dir, PathBuf::from("/srv/dmon/logs"));
        assert_eq!(cfg.stop_file, PathBuf::from("/srv/dmon/stop.signal"));
        assert_eq!(cfg.tick_interval, Duration::from_secs(10));
        assert_eq!(cfg.chat_id, ChatId(42));
    }

    #[test]
    fn overrides_are_applied() {
        let cwd = Path::new("/srv/dmon");
        let cfg = Config::build(
            "tok".into(),
            ChatId(1),
            cwd,
            lookup_from(&[
                ("DMON_IMAGE_DIR", "/data/pics"),
                ("DMON_ARCHIVE_DIR", "seen"),
                ("DMON_TICK_INTERVAL_SECS", "0"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.image_dir, PathBuf::from("/data/pics"));
        assert_eq!(cfg.archive_dir, PathBuf::from("/srv/dmon/seen"));
        // Clamped so the loop never spins.
        assert_eq!(cfg.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn rejects_blank_token_and_bad_interval() {
        let cwd = Path::new("/srv");
        assert!(matches!(
            Config::build("  ".into(), ChatId(1), cwd, lookup_from(&[])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::build(
                "tok".into(),
                ChatId(1),
                cwd,
                lookup_from(&[("DMON_TICK_INTERVAL_SECS", "soon")])
            ),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn huge_interval_is_capped() {
        let cfg = Config::build(
            "tok".into(),
            ChatId(1),
            Path::new("/srv"),
            lookup_from(&[("DMON_TICK_INTERVAL_SECS", "18446744073709551615")]),
        )
        .unwrap();
        assert_eq!(cfg.tick_interval, Duration::from_secs(MAX_TICK_INTERVAL_SECS));
        assert!(cfg.tick_interval.checked_add(Duration::from_secs(60)).is_some());
    }

    #[test]
    fn dotenv_fills_missing_vars_only() {
        let pid = std::process::id();
        let dir = PathBuf::from(format!("/tmp/dmon-dotenv-{pid}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let fresh = format!("DMON_TEST_FRESH_{pid}");
        let preset = format!("DMON_TEST_PRESET_{pid}");
        env::set_var(&preset, "from-env");
        let path = dir.join(".env");
        fs::write(
            &path,
            format!("# comment\n{fresh}=\"debug,dmon=trace\"\n{preset}=from-file\n"),
        )
        .unwrap();

        load_dotenv_if_present(&path);

        assert_eq!(env::var(&fresh).unwrap(), "debug,dmon=trace");
        assert_eq!(env::var(&preset).unwrap(), "from-env");

        env::remove_var(&fresh);
        env::remove_var(&preset);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn strip_quotes_handles_both_styles() {
        assert_eq!(strip_quotes("\"a b\""), "a b");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\"unbalanced"), "\"unbalanced");
    }
}
