//! Bridge from the `tracing` ecosystem into a [`Logger`].
//!
//! [`UlogLayer`] turns each `tracing` event into one logger call: the
//! `message` field becomes the message body, other fields are appended as
//! ` key=value`. Events with the crate's own `ulog` target are skipped so
//! internal diagnostics never loop back.

use crate::core::level::Level;
use crate::core::logger::Logger;
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

const INTERNAL_TARGET: &str = "ulog";

#[derive(Clone)]
enum LoggerRef {
    Global,
    Shared(Arc<Logger>),
}

/// `tracing_subscriber` layer forwarding events to a logger.
#[derive(Clone)]
pub struct UlogLayer {
    logger: LoggerRef,
    topic_from_target: bool,
}

impl UlogLayer {
    /// Layer feeding the process-wide logger.
    pub fn global() -> Self {
        Self {
            logger: LoggerRef::Global,
            topic_from_target: false,
        }
    }

    /// Layer feeding `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger: LoggerRef::Shared(logger),
            topic_from_target: false,
        }
    }

    /// Uses the event target as topic name. Events whose target is not a
    /// registered topic are then dropped by the logger.
    pub fn with_topic_from_target(mut self, enabled: bool) -> Self {
        self.topic_from_target = enabled;
        self
    }

    fn logger(&self) -> &Logger {
        match &self.logger {
            LoggerRef::Global => crate::global(),
            LoggerRef::Shared(logger) => logger,
        }
    }
}

/// Maps `tracing` levels onto the built-in scale.
pub fn map_level(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => Level::TRACE,
        tracing::Level::DEBUG => Level::DEBUG,
        tracing::Level::INFO => Level::INFO,
        tracing::Level::WARN => Level::WARN,
        tracing::Level::ERROR => Level::ERROR,
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: String,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for UlogLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if target == INTERNAL_TARGET {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let topic = self.topic_from_target.then_some(target);
        self.logger().log(
            map_level(metadata.level()),
            metadata.file(),
            metadata.line().unwrap_or(0),
            topic,
            Some(format_args!("{}{}", visitor.message, visitor.fields)),
        );
    }
}
