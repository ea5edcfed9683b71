//! Error types for ulog
//!
//! Administrative calls (output/topic/level registration, runtime toggles,
//! configuration loading) report failures through [`UlogError`]. The logging
//! hot path never returns errors: a busy gate, a filtered topic or a filtered
//! level simply produces no output.

use thiserror::Error;

/// Main error type for ulog operations
#[derive(Error, Debug)]
pub enum UlogError {
    /// An argument was rejected before any state was touched
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The lock gate could not be acquired; nothing was changed
    #[error("Lock gate is busy")]
    Busy,

    /// The targeted output or topic does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not permitted (full table, permanent output, ...)
    #[error("Operation failed: {0}")]
    Error(String),

    /// The capability is not enabled in the logger configuration
    #[error("Feature disabled: {0}")]
    Disabled(&'static str),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigFileMissing(String),

    /// Invalid log level name
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Initialization errors
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// I/O errors (configuration files, writer outputs)
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// TOML parsing errors
    #[error("TOML parsing error: {source}")]
    TomlError {
        #[from]
        source: toml::de::Error,
    },
}

/// Result type alias for ulog operations
pub type Result<T> = std::result::Result<T, UlogError>;

impl UlogError {
    /// Create a new invalid-argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new generic operation error
    pub fn error<S: Into<String>>(msg: S) -> Self {
        Self::Error(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if this error was caused by lock contention
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Get the error category for logging purposes
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Busy => "busy",
            Self::NotFound(_) => "not_found",
            Self::Error(_) => "error",
            Self::Disabled(_) => "disabled",
            Self::ConfigError(_)
            | Self::ConfigFileMissing(_)
            | Self::InvalidLogLevel(_) => "config",
            Self::InitializationError(_) => "initialization",
            Self::IoError { .. } => "io",
            Self::TomlError { .. } => "toml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let err = UlogError::invalid_argument("level 9 out of range");
        assert!(matches!(err, UlogError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Invalid argument: level 9 out of range");

        let err = UlogError::not_found("topic 'ghost'");
        assert_eq!(err.to_string(), "Not found: topic 'ghost'");

        assert_eq!(UlogError::Busy.to_string(), "Lock gate is busy");
        assert_eq!(
            UlogError::Disabled("EXTRA_OUTPUTS").to_string(),
            "Feature disabled: EXTRA_OUTPUTS"
        );
    }

    #[test]
    fn test_error_from_conversions() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: UlogError = io_error.into();
        assert!(matches!(err, UlogError::IoError { .. }));

        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: UlogError = toml_error.into();
        assert!(matches!(err, UlogError::TomlError { .. }));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(UlogError::invalid_argument("x").category(), "invalid_argument");
        assert_eq!(UlogError::Busy.category(), "busy");
        assert_eq!(UlogError::not_found("x").category(), "not_found");
        assert_eq!(UlogError::error("x").category(), "error");
        assert_eq!(UlogError::Disabled("TOPICS").category(), "disabled");
        assert_eq!(UlogError::config("x").category(), "config");
        assert_eq!(
            UlogError::InvalidLogLevel("LOUD".into()).category(),
            "config"
        );
    }

    #[test]
    fn test_is_busy() {
        assert!(UlogError::Busy.is_busy());
        assert!(!UlogError::error("full").is_busy());
    }

    #[test]
    fn test_error_debug_format() {
        let err = UlogError::config("test error");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("ConfigError"));
        assert!(debug_str.contains("test error"));
    }
}
