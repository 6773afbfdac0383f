//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve database path, workspace timezone and logging settings from the
//!   process environment (or any key lookup).
//!
//! # Invariants
//! - The workspace timezone always resolves; blank or unknown names fall back
//!   to UTC with a warning.
//! - Resolution has no side effects beyond logging.

use crate::logging::{default_log_level, normalize_level};
use crate::schedule::timezone::{resolve_timezone, FALLBACK_TIMEZONE};
use chrono_tz::Tz;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKBOARD_DB_PATH";
pub const TIMEZONE_ENV: &str = "WORKSPACE_TIMEZONE";
pub const LOG_LEVEL_ENV: &str = "TASKBOARD_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKBOARD_LOG_DIR";

/// Configuration resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required key is unset or blank.
    Missing(&'static str),
    /// Key is set to an unusable value.
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "{key} is not set"),
            Self::Invalid { key, message } => write!(f, "{key} is invalid: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Process-wide settings threaded into services at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub db_path: PathBuf,
    pub workspace_timezone: Tz,
    pub log_level: &'static str,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a key to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(DB_PATH_ENV))?;

        let timezone_name = read(TIMEZONE_ENV);
        let workspace_timezone = resolve_timezone(timezone_name.as_deref());
        if let Some(name) = timezone_name.as_deref() {
            if workspace_timezone == FALLBACK_TIMEZONE && name != FALLBACK_TIMEZONE.name() {
                warn!(
                    "event=config_resolve module=config status=fallback key={} fallback={}",
                    TIMEZONE_ENV,
                    FALLBACK_TIMEZONE.name()
                );
            }
        }

        let log_level = match read(LOG_LEVEL_ENV) {
            Some(level) => normalize_level(&level).map_err(|err| ConfigError::Invalid {
                key: LOG_LEVEL_ENV,
                message: err.to_string(),
            })?,
            None => default_log_level(),
        };

        let log_dir = read(LOG_DIR_ENV).map(PathBuf::from);
        if let Some(dir) = log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid {
                    key: LOG_DIR_ENV,
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
        }

        Ok(Self {
            db_path,
            workspace_timezone,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RuntimeConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use chrono_tz::Tz;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn resolves_full_configuration() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("TASKBOARD_DB_PATH", " /var/lib/taskboard.db "),
            ("WORKSPACE_TIMEZONE", "Asia/Tokyo"),
            ("TASKBOARD_LOG_LEVEL", "WARNING"),
            ("TASKBOARD_LOG_DIR", "/var/log/taskboard"),
        ]))
        .expect("configuration should resolve");

        assert_eq!(config.db_path.to_str(), Some("/var/lib/taskboard.db"));
        assert_eq!(config.workspace_timezone, Tz::Asia__Tokyo);
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.log_dir.as_deref().and_then(|p| p.to_str()),
            Some("/var/log/taskboard")
        );
    }

    #[test]
    fn missing_or_invalid_timezone_falls_back_to_utc() {
        let unset = RuntimeConfig::from_lookup(lookup(&[("TASKBOARD_DB_PATH", "a.db")])).unwrap();
        assert_eq!(unset.workspace_timezone, Tz::UTC);
        assert_eq!(unset.log_dir, None);

        let invalid = RuntimeConfig::from_lookup(lookup(&[
            ("TASKBOARD_DB_PATH", "a.db"),
            ("WORKSPACE_TIMEZONE", "Not/AZone"),
        ]))
        .unwrap();
        assert_eq!(invalid.workspace_timezone, Tz::UTC);
    }

    #[test]
    fn database_path_is_required() {
        let err = RuntimeConfig::from_lookup(lookup(&[("TASKBOARD_DB_PATH", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(DB_PATH_ENV));
    }

    #[test]
    fn rejects_bad_log_settings() {
        let level = RuntimeConfig::from_lookup(lookup(&[
            ("TASKBOARD_DB_PATH", "a.db"),
            ("TASKBOARD_LOG_LEVEL", "loud"),
        ]))
        .unwrap_err();
        assert!(matches!(level, ConfigError::Invalid { key, .. } if key == LOG_LEVEL_ENV));

        let dir = RuntimeConfig::from_lookup(lookup(&[
            ("TASKBOARD_DB_PATH", "a.db"),
            ("TASKBOARD_LOG_DIR", "relative/logs"),
        ]))
        .unwrap_err();
        assert!(matches!(dir, ConfigError::Invalid { key, .. } if key == LOG_DIR_ENV));
    }
}
