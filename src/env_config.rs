//! Environment overrides.
//!
//! | variable      | effect                                        |
//! |---------------|-----------------------------------------------|
//! | `ULOG_CONFIG` | TOML file loaded as the base configuration    |
//! | `ULOG_LEVEL`  | stdout output level (`warn`, `W`, `3`, ...)   |
//! | `ULOG_COLOR`  | `color` switch (`1/0`, `true/false`, `on/off`) |
//! | `ULOG_TIME`   | `time` switch                                 |

use crate::config::{load_config_from_file, validate_config, LoggerConfig};
use crate::error::{Result, UlogError};
use std::env;
use std::path::PathBuf;

pub const ENV_CONFIG: &str = "ULOG_CONFIG";
pub const ENV_LEVEL: &str = "ULOG_LEVEL";
pub const ENV_COLOR: &str = "ULOG_COLOR";
pub const ENV_TIME: &str = "ULOG_TIME";

/// Reader of the `ULOG_*` environment variables.
pub struct EnvConfig;

impl EnvConfig {
    pub fn config_path() -> Option<PathBuf> {
        Self::var(ENV_CONFIG).map(PathBuf::from)
    }

    pub fn level() -> Option<String> {
        Self::var(ENV_LEVEL)
    }

    pub fn color() -> Result<Option<bool>> {
        Self::flag(ENV_COLOR)
    }

    pub fn time() -> Result<Option<bool>> {
        Self::flag(ENV_TIME)
    }

    /// Applies level, color and time overrides found in the environment.
    pub fn apply(config: &mut LoggerConfig) -> Result<()> {
        let overrides = Overrides {
            level: Self::level(),
            color: Self::color()?,
            time: Self::time()?,
        };
        overrides.apply(config);
        Ok(())
    }

    fn var(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }

    fn flag(name: &str) -> Result<Option<bool>> {
        match Self::var(name) {
            None => Ok(None),
            Some(value) => parse_bool(&value).map(Some).ok_or_else(|| {
                UlogError::config(format!("{} must be a boolean, got '{}'", name, value))
            }),
        }
    }
}

/// Override values, independent of where they were read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub level: Option<String>,
    pub color: Option<bool>,
    pub time: Option<bool>,
}

impl Overrides {
    pub fn apply(&self, config: &mut LoggerConfig) {
        if let Some(level) = &self.level {
            config.stdout_level = level.clone();
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if let Some(time) = self.time {
            config.time = time;
        }
    }
}

/// Lenient boolean parsing for environment values.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration from the environment: the `ULOG_CONFIG` file (or the
/// defaults) with the variable overrides applied, validated.
pub fn config_from_env() -> Result<LoggerConfig> {
    let mut config = match EnvConfig::config_path() {
        Some(path) => {
            tracing::debug!(target: "ulog", path = %path.display(), "loading configuration");
            load_config_from_file(&path)?
        }
        None => LoggerConfig::default(),
    };
    EnvConfig::apply(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}
