//! Logging macros
//!
//! The macros capture `file!()`, `line!()` and the format arguments and call
//! [`Logger::log`](crate::Logger::log). Without a `logger:` argument they log
//! to the process-wide logger.
//!
//! ```rust
//! use ulog::{ulog, ulog_info, ulog_warn, Level, Logger};
//!
//! let logger = Logger::new();
//! ulog_info!(logger: &logger, "listening on {}", 8080);
//! ulog_warn!("{} retries left", 2);
//! ulog!(Level::ERROR, "raw level");
//! ```
//!
//! | macro         | level   |
//! |---------------|---------|
//! | `ulog_trace!` | `TRACE` |
//! | `ulog_debug!` | `DEBUG` |
//! | `ulog_info!`  | `INFO`  |
//! | `ulog_warn!`  | `WARN`  |
//! | `ulog_error!` | `ERROR` |
//! | `ulog_fatal!` | `FATAL` |

/// Logs at an explicit level.
///
/// Forms: `ulog!(level, fmt...)`, `ulog!(topic: t, level, fmt...)`,
/// `ulog!(logger: l, level, fmt...)`, `ulog!(logger: l, topic: t, level, fmt...)`.
#[macro_export]
macro_rules! ulog {
    (logger: $logger:expr, topic: $topic:expr, $level:expr, $($arg:tt)+) => {
        $logger.log(
            $level,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            ::core::option::Option::Some($topic),
            ::core::option::Option::Some(::core::format_args!($($arg)+)),
        )
    };
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log(
            $level,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            ::core::option::Option::None,
            ::core::option::Option::Some(::core::format_args!($($arg)+)),
        )
    };
    (topic: $topic:expr, $level:expr, $($arg:tt)+) => {
        $crate::ulog!(logger: $crate::global(), topic: $topic, $level, $($arg)+)
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::ulog!(logger: $crate::global(), $level, $($arg)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ulog_level {
    ($level:expr; logger: $logger:expr, topic: $topic:expr, $($arg:tt)+) => {
        $crate::ulog!(logger: $logger, topic: $topic, $level, $($arg)+)
    };
    ($level:expr; logger: $logger:expr, $($arg:tt)+) => {
        $crate::ulog!(logger: $logger, $level, $($arg)+)
    };
    ($level:expr; topic: $topic:expr, $($arg:tt)+) => {
        $crate::ulog!(topic: $topic, $level, $($arg)+)
    };
    ($level:expr; $($arg:tt)+) => {
        $crate::ulog!($level, $($arg)+)
    };
}

#[macro_export]
macro_rules! ulog_trace {
    ($($arg:tt)+) => { $crate::__ulog_level!($crate::Level::TRACE; $($arg)+) };
}

#[macro_export]
macro_rules! ulog_debug {
    ($($arg:tt)+) => { $crate::__ulog_level!($crate::Level::DEBUG; $($arg)+) };
}

#[macro_export]
macro_rules! ulog_info {
    ($($arg:tt)+) => { $crate::__ulog_level!($crate::Level::INFO; $($arg)+) };
}

#[macro_export]
macro_rules! ulog_warn {
    ($($arg:tt)+) => { $crate::__ulog_level!($crate::Level::WARN; $($arg)+) };
}

#[macro_export]
macro_rules! ulog_error {
    ($($arg:tt)+) => { $crate::__ulog_level!($crate::Level::ERROR; $($arg)+) };
}

#[macro_export]
macro_rules! ulog_fatal {
    ($($arg:tt)+) => { $crate::__ulog_level!($crate::Level::FATAL; $($arg)+) };
}

#[cfg(test)]
mod tests {
    use crate::{Event, Level, LineStyle, Logger, LoggerConfig, OutputId, TopicsMode};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_macros_capture_location_and_topic() {
        let logger = Logger::with_config(LoggerConfig {
            extra_outputs: 1,
            topics_mode: TopicsMode::Dynamic,
            ..Default::default()
        })
        .unwrap();
        logger.set_output_level(OutputId::STDOUT, Level::FATAL).unwrap();
        logger.add_topic("db", crate::OutputTarget::All).unwrap();

        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        logger
            .add_output(
                move |event: &Event<'_>| sink.lock().unwrap().push(event.to_line(LineStyle::PLAIN)),
                Level::TRACE,
            )
            .unwrap();

        let line = line!() + 1;
        crate::ulog_info!(logger: &logger, "n={}", 3);
        crate::ulog_error!(logger: &logger, topic: "db", "down");
        crate::ulog!(logger: &logger, Level::DEBUG, "plain");

        let lines = lines.lock().unwrap();
        assert_eq!(lines[0], format!("INFO  {}:{}: n=3", file!(), line));
        assert_eq!(lines[1], format!("ERROR [db] {}:{}: down", file!(), line + 1));
        assert!(lines[2].starts_with("DEBUG "));
        assert!(lines[2].ends_with(": plain"));
    }
}
