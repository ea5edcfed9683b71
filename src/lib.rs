//! ulog - embeddable leveled logging engine
//!
//! Callers emit events (level, optional topic, source location, formatted
//! message) that are filtered and rendered to independently configured
//! outputs. Everything runs synchronously on the caller's thread, behind one
//! lock gate.
//!
//! # Quick start
//!
//! ```rust
//! use ulog::{ulog_info, ulog_warn};
//!
//! ulog_info!("service started on port {}", 8080);
//! ulog_warn!("cache at {}%", 93);
//! ```
//!
//! # Custom configuration
//!
//! ```rust
//! use ulog::{Event, Level, LineStyle, Logger, LoggerConfig, OutputTarget, TopicsMode};
//!
//! # fn main() -> ulog::Result<()> {
//! let logger = Logger::with_config(LoggerConfig {
//!     extra_outputs: 2,
//!     topics_mode: TopicsMode::Dynamic,
//!     time: true,
//!     ..Default::default()
//! })?;
//!
//! logger.add_output(
//!     |event: &Event<'_>| eprintln!("{}", event.to_line(LineStyle::PLAIN)),
//!     Level::WARN,
//! )?;
//! logger.add_topic_with_level("net", OutputTarget::All, Level::INFO)?;
//!
//! ulog::ulog_warn!(logger: &logger, topic: "net", "link {} down", "eth0");
//! # Ok(())
//! # }
//! ```
//!
//! # tracing integration
//!
//! ```rust
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let subscriber = tracing_subscriber::registry().with(ulog::UlogLayer::global());
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!("forwarded to the global logger");
//! });
//! ```

mod macros;

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod env_config;
pub mod error;
pub mod sinks;

pub use config::{
    load_config_from_file, load_config_from_str, validate_config, LoggerConfig, RuntimeFlags,
    TopicsMode,
};
pub use diagnostics::DiagnosticsSnapshot;
pub use error::{Result, UlogError};

pub use crate::core::event::{Event, LineStyle};
pub use crate::core::layers::UlogLayer;
pub use crate::core::level::{is_allowed, Level, LevelDescriptor, LevelStyle};
pub use crate::core::lock::LockFn;
pub use crate::core::logger::{Logger, PrefixFn};
pub use crate::core::print::{BufferTarget, StreamTarget};
pub use crate::core::topics::{Topic, TopicId};
pub use sinks::{FileOutput, OutputHandler, OutputId, OutputTarget, StdoutOutput, WriterOutput};

use once_cell::sync::OnceCell;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process-wide logger.
static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Initializes the process-wide logger with `config`.
///
/// Fails with [`UlogError::InitializationError`] when the global logger
/// already exists (explicitly initialized, or created on first use by
/// [`global`]).
pub fn init(config: LoggerConfig) -> Result<()> {
    let logger = Logger::with_config(config)?;
    GLOBAL_LOGGER
        .set(logger)
        .map_err(|_| UlogError::InitializationError("global logger already initialized".to_string()))?;
    tracing::debug!(target: "ulog", "global logger initialized");
    Ok(())
}

/// Initializes the process-wide logger from the `ULOG_*` environment.
pub fn init_from_env() -> Result<()> {
    init(env_config::config_from_env()?)
}

/// The process-wide logger; created with the default configuration on first
/// use when [`init`] was never called.
pub fn global() -> &'static Logger {
    GLOBAL_LOGGER.get_or_init(Logger::new)
}

/// `true` once the process-wide logger exists.
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}
