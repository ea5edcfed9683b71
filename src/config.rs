//! Logger configuration.
//!
//! One structure describes the whole capability matrix. Every field is always
//! present; a logger built with `dynamic_config = false` treats the feature
//! switches as constants, one built with `dynamic_config = true` lets them be
//! toggled at runtime.

use crate::core::level::{Level, LevelDescriptor, LevelStyle};
use crate::error::{Result, UlogError};
use serde::Deserialize;

/// Extra outputs available when `dynamic_config` is on.
pub const DYNAMIC_EXTRA_OUTPUTS: usize = 8;
/// Prefix buffer size when `dynamic_config` is on.
pub const DYNAMIC_PREFIX_SIZE: usize = 64;

/// Upper bounds accepted by [`validate_config`].
pub const MAX_EXTRA_OUTPUTS: usize = 255;
pub const MAX_TOPICS_STATIC_NUM: usize = 4096;
pub const MAX_PREFIX_SIZE: usize = 4096;

// --- default value helpers ---
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_stdout_level() -> String {
    "TRACE".to_string()
}

/// How topics are stored, if at all.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicsMode {
    /// Topics are not available; topic calls return `Disabled`.
    #[default]
    Off,
    /// Fixed array of `topics_static_num` slots.
    Static,
    /// Unbounded, allocated per topic.
    Dynamic,
}

/// Top level logger configuration.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// ANSI colors on outputs that ask for them
    #[serde(default = "default_false")]
    pub color: bool,
    /// Prefix buffer size in bytes; 0 disables the prefix callback
    #[serde(default)]
    pub prefix_size: usize,
    /// Number of output slots besides the stdout output
    #[serde(default)]
    pub extra_outputs: usize,
    /// `file:line: ` on outputs that include source location
    #[serde(default = "default_true")]
    pub source_location: bool,
    #[serde(default)]
    pub level_style: LevelStyle,
    /// Timestamps in rendered lines
    #[serde(default = "default_false")]
    pub time: bool,
    #[serde(default)]
    pub topics_mode: TopicsMode,
    /// Slot count for `TopicsMode::Static`
    #[serde(default)]
    pub topics_static_num: usize,
    /// Allows runtime toggles; implies the full feature set
    #[serde(default = "default_false")]
    pub dynamic_config: bool,
    /// Emit a WARN line when a disabled capability is used
    #[serde(default = "default_true")]
    pub warn_not_enabled: bool,
    /// Initial threshold of the stdout output
    #[serde(default = "default_stdout_level")]
    pub stdout_level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            color: default_false(),
            prefix_size: 0,
            extra_outputs: 0,
            source_location: default_true(),
            level_style: LevelStyle::default(),
            time: default_false(),
            topics_mode: TopicsMode::default(),
            topics_static_num: 0,
            dynamic_config: default_false(),
            warn_not_enabled: default_true(),
            stdout_level: default_stdout_level(),
        }
    }
}

impl LoggerConfig {
    /// Full feature set with every switch adjustable at runtime.
    pub fn dynamic() -> Self {
        Self {
            dynamic_config: true,
            ..Self::default()
        }
        .effective()
    }

    /// The configuration a logger actually runs with: `dynamic_config`
    /// switches every capability on, sizes outputs and prefix, selects
    /// dynamic topics and silences disabled-feature warnings.
    pub fn effective(&self) -> Self {
        if !self.dynamic_config {
            return self.clone();
        }
        Self {
            color: true,
            prefix_size: self.prefix_size.max(DYNAMIC_PREFIX_SIZE),
            extra_outputs: self.extra_outputs.max(DYNAMIC_EXTRA_OUTPUTS),
            source_location: true,
            level_style: self.level_style,
            time: true,
            topics_mode: TopicsMode::Dynamic,
            topics_static_num: 0,
            dynamic_config: true,
            warn_not_enabled: false,
            stdout_level: self.stdout_level.clone(),
        }
    }

    /// Threshold of the stdout output as a level.
    pub fn stdout_level(&self) -> Result<Level> {
        self.stdout_level.parse()
    }
}

/// Runtime switches consulted by the pipeline and renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeFlags {
    pub color: bool,
    pub prefix: bool,
    pub time: bool,
    pub topics: bool,
    pub source_location: bool,
    pub level_style: LevelStyle,
}

impl RuntimeFlags {
    /// Initial switch values for an (effective) configuration.
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            color: config.color,
            prefix: config.prefix_size > 0,
            time: config.time,
            topics: config.topics_mode != TopicsMode::Off,
            source_location: config.source_location,
            level_style: config.level_style,
        }
    }
}

/// Loads a `LoggerConfig` from a TOML file.
pub fn load_config_from_file(path: &std::path::Path) -> Result<LoggerConfig> {
    use std::fs;

    if !path.exists() {
        return Err(UlogError::ConfigFileMissing(
            path.to_string_lossy().into_owned(),
        ));
    }

    let config_str = fs::read_to_string(path)?;
    load_config_from_str(&config_str)
}

/// Loads a `LoggerConfig` from a TOML string.
pub fn load_config_from_str(config_str: &str) -> Result<LoggerConfig> {
    let config: LoggerConfig = toml::from_str(config_str)?;
    Ok(config)
}

/// Checks a configuration for values no logger can be built from.
pub fn validate_config(config: &LoggerConfig) -> Result<()> {
    let stdout_level = config.stdout_level()?;
    let levels = LevelDescriptor::for_style(config.level_style);
    if !levels.is_valid(stdout_level) {
        return Err(UlogError::config(format!(
            "stdout_level {} above max level {}",
            stdout_level.value(),
            levels.max_level().value()
        )));
    }

    check_bound("extra_outputs", config.extra_outputs, MAX_EXTRA_OUTPUTS)?;
    check_bound("topics_static_num", config.topics_static_num, MAX_TOPICS_STATIC_NUM)?;
    check_bound("prefix_size", config.prefix_size, MAX_PREFIX_SIZE)?;

    if config.topics_mode == TopicsMode::Static && config.topics_static_num == 0 {
        return Err(UlogError::config(
            "topics_static_num must be greater than 0 in Static topics mode",
        ));
    }

    if config.topics_mode != TopicsMode::Static && config.topics_static_num > 0 {
        tracing::warn!(
            target: "ulog",
            "topics_static_num = {} ignored in {:?} topics mode",
            config.topics_static_num,
            config.topics_mode
        );
    }

    Ok(())
}

fn check_bound(name: &str, value: usize, max: usize) -> Result<()> {
    if value > max {
        return Err(UlogError::config(format!("{} = {} exceeds {}", name, value, max)));
    }
    Ok(())
}
