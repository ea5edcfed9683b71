//! The logger: registries, runtime switches and the emit pipeline.
//!
//! Every mutation and every logging call goes through one lock gate. A call
//! that finds the gate busy changes nothing: administrative calls return
//! [`UlogError::Busy`], logging calls are dropped.
//!
//! The emit pipeline, under the gate:
//!
//! 1. resolve the topic (unknown or filtered topic drops the event),
//! 2. capture the time,
//! 3. refresh the prefix text,
//! 4. hand the event to each selected output whose level lets it through.

use super::event::{Event, RenderContext};
use super::level::{Level, LevelDescriptor, LevelStyle};
use super::lock::{Gate, LockFn};
use super::print::BufferTarget;
use super::topics::{Topic, TopicId, TopicRegistry};
use crate::config::{validate_config, LoggerConfig, RuntimeFlags, TopicsMode};
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::error::{Result, UlogError};
use crate::sinks::file::WriterOutput;
use crate::sinks::registry::OutputRegistry;
use crate::sinks::stdout::StdoutOutput;
use crate::sinks::traits::{OutputHandler, OutputId, OutputTarget};
use chrono::Local;
use std::cell::Cell;
use std::fmt;
use std::io;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

const FEATURE_EXTRA_OUTPUTS: &str = "EXTRA_OUTPUTS";
const FEATURE_TOPICS: &str = "TOPICS";
const FEATURE_PREFIX: &str = "PREFIX";
const FEATURE_DYNAMIC_CONFIG: &str = "DYNAMIC_CONFIG";

thread_local! {
    // set while this thread emits a disabled-feature warning
    static WARNING_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Prefix callback: writes per-event text placed before the level name.
///
/// The target is bounded by the configured `prefix_size`; longer text is
/// clipped.
pub trait PrefixFn: Send + Sync {
    fn fill(&self, event: &Event<'_>, out: &mut BufferTarget<'_>);
}

impl<F> PrefixFn for F
where
    F: Fn(&Event<'_>, &mut BufferTarget<'_>) + Send + Sync,
{
    fn fill(&self, event: &Event<'_>, out: &mut BufferTarget<'_>) {
        self(event, out)
    }
}

struct PrefixState {
    function: Option<Arc<dyn PrefixFn>>,
    buffer: Vec<u8>,
}

impl PrefixState {
    fn text(&self) -> &str {
        let end = self
            .buffer
            .iter()
            .position(|byte| *byte == 0)
            .unwrap_or(self.buffer.len());
        std::str::from_utf8(&self.buffer[..end]).unwrap_or("")
    }

    fn clear(&mut self) {
        self.function = None;
        self.buffer.fill(0);
    }
}

struct State {
    levels: LevelDescriptor,
    outputs: OutputRegistry,
    topics: Option<TopicRegistry>,
    flags: RuntimeFlags,
    prefix: PrefixState,
}

pub struct Logger {
    config: LoggerConfig,
    stdout_level: Level,
    gate: Gate<State>,
    diagnostics: Diagnostics,
}

impl Logger {
    /// Logger with the default configuration: stdout only, long level names,
    /// source location on, everything else off.
    pub fn new() -> Self {
        Self::build(LoggerConfig::default())
    }

    /// Validates `config` and builds a logger from its effective form.
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self::build(config))
    }

    fn build(config: LoggerConfig) -> Self {
        let config = config.effective();
        let stdout_level = config.stdout_level().unwrap_or(Level::TRACE);
        let topics = match config.topics_mode {
            TopicsMode::Off => None,
            TopicsMode::Static => Some(TopicRegistry::fixed(config.topics_static_num)),
            TopicsMode::Dynamic => Some(TopicRegistry::dynamic()),
        };
        let state = State {
            levels: LevelDescriptor::for_style(config.level_style),
            outputs: OutputRegistry::new(
                Arc::new(StdoutOutput::new()),
                stdout_level,
                config.extra_outputs,
            ),
            topics,
            flags: RuntimeFlags::from_config(&config),
            prefix: PrefixState {
                function: None,
                buffer: vec![0; config.prefix_size],
            },
        };

        tracing::debug!(
            target: "ulog",
            extra_outputs = config.extra_outputs,
            topics = ?config.topics_mode,
            dynamic = config.dynamic_config,
            "logger created"
        );

        Self {
            config,
            stdout_level,
            gate: Gate::new(state),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The effective configuration this logger runs with.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    // --- emit pipeline ---

    /// Logs one event.
    ///
    /// `file`/`line` are kept only when source location capture is enabled.
    /// An empty `topic` is the same as none. A `topic` that is unknown, filtered by its level, or given while
    /// topics are off drops the event. A missing or empty message renders
    /// as `null`. Never fails: a busy gate drops the event.
    pub fn log(
        &self,
        level: Level,
        file: Option<&str>,
        line: u32,
        topic: Option<&str>,
        message: Option<fmt::Arguments<'_>>,
    ) {
        let mut guard = match self.gate.acquire() {
            Ok(guard) => guard,
            Err(_) => {
                self.diagnostics.increment_dropped_busy();
                return;
            }
        };
        let State {
            levels,
            outputs,
            topics,
            flags,
            prefix,
        } = &mut *guard;
        let flags = *flags;

        let mut target = OutputTarget::All;
        let mut topic_id = None;
        if let Some(name) = topic.filter(|name| !name.is_empty()) {
            let route = topics
                .as_ref()
                .filter(|_| flags.topics)
                .and_then(|registry| registry.resolve(name, level));
            match route {
                Some(route) => {
                    topic_id = Some(route.id);
                    target = route.output;
                }
                None => {
                    self.diagnostics.increment_dropped_topic();
                    return;
                }
            }
        }

        let time = flags.time.then(Local::now);
        let file = file.filter(|_| self.config.source_location);
        let levels = &*levels;
        let topics = topics.as_ref();

        let prefix_active = flags.prefix && prefix.function.is_some();
        if let Some(function) = prefix.function.as_ref().filter(|_| prefix_active) {
            let context = RenderContext {
                levels,
                topics,
                prefix: None,
                flags,
            };
            let event = Event::new(&context, level, message, topic_id, file, line, time);
            function.fill(&event, &mut BufferTarget::new(&mut prefix.buffer));
        }

        let context = RenderContext {
            levels,
            topics,
            prefix: if prefix_active { Some(prefix.text()) } else { None },
            flags,
        };
        let event = Event::new(&context, level, message, topic_id, file, line, time);
        let invoked = outputs.dispatch(&event, target);
        self.diagnostics.record_emitted(invoked);
    }

    // --- lock ---

    /// Installs the lock callback guarding every logger call.
    pub fn set_lock<F: LockFn + 'static>(&self, lock: F) {
        self.gate.set_lock(Some(Arc::new(lock)));
    }

    pub fn clear_lock(&self) {
        self.gate.set_lock(None);
    }

    pub fn has_lock(&self) -> bool {
        self.gate.has_lock()
    }

    // --- levels ---

    /// Name of `level` in the current table; `"?"` when out of range or
    /// when the gate is busy.
    pub fn level_name(&self, level: Level) -> String {
        match self.gate.acquire() {
            Ok(state) => state.levels.name(level).to_string(),
            Err(_) => "?".to_string(),
        }
    }

    /// Replaces the level table. Invalid tables are rejected untouched.
    pub fn set_levels(&self, levels: LevelDescriptor) -> Result<()> {
        levels.validate()?;
        let mut state = self.gate.acquire()?;
        state.levels = levels;
        Ok(())
    }

    /// Restores the built-in table of the current level style.
    pub fn reset_levels(&self) -> Result<()> {
        let mut state = self.gate.acquire()?;
        let builtin = LevelDescriptor::for_style(state.flags.level_style);
        state.levels = builtin;
        Ok(())
    }

    // --- outputs ---

    /// Registers an output in the lowest free extra slot.
    #[track_caller]
    pub fn add_output<H: OutputHandler + 'static>(&self, handler: H, level: Level) -> Result<OutputId> {
        self.add_output_shared(Arc::new(handler), level)
    }

    /// Registers an output the caller keeps a handle to.
    #[track_caller]
    pub fn add_output_shared(&self, handler: Arc<dyn OutputHandler>, level: Level) -> Result<OutputId> {
        self.require_outputs("add_output")?;
        let mut state = self.gate.acquire()?;
        check_level(&state.levels, level)?;
        let name = handler.name();
        let id = state.outputs.add(handler, level)?;
        tracing::debug!(target: "ulog", output = id.value(), name, "output added");
        Ok(id)
    }

    /// Registers an output rendering file-style lines into `writer`.
    #[track_caller]
    pub fn add_output_writer<W>(&self, writer: W, level: Level) -> Result<OutputId>
    where
        W: io::Write + Send + 'static,
    {
        self.add_output(WriterOutput::new(writer), level)
    }

    /// Opens `path` for appending and registers it as an output.
    #[track_caller]
    pub fn add_output_file<P: AsRef<Path>>(&self, path: P, level: Level) -> Result<OutputId> {
        self.require_outputs("add_output_file")?;
        let output = WriterOutput::open(path)?;
        self.add_output(output, level)
    }

    /// Unregisters an extra output. Slot 0 (stdout) cannot be removed.
    #[track_caller]
    pub fn remove_output(&self, id: OutputId) -> Result<()> {
        self.require_outputs("remove_output")?;
        let mut state = self.gate.acquire()?;
        state.outputs.remove(id)?;
        tracing::debug!(target: "ulog", output = id.value(), "output removed");
        Ok(())
    }

    pub fn set_output_level(&self, id: OutputId, level: Level) -> Result<()> {
        let mut state = self.gate.acquire()?;
        check_level(&state.levels, level)?;
        state.outputs.set_level(id, level)
    }

    /// Sets the level of every registered output.
    pub fn set_output_level_all(&self, level: Level) -> Result<()> {
        let mut state = self.gate.acquire()?;
        check_level(&state.levels, level)?;
        state.outputs.set_level_all(level);
        Ok(())
    }

    pub fn output_level(&self, id: OutputId) -> Option<Level> {
        self.gate.acquire().ok()?.outputs.level(id)
    }

    // --- topics ---

    /// Registers topic `name` routed to `output`, at the default topic
    /// level. An existing topic keeps its id, level and route.
    #[track_caller]
    pub fn add_topic(&self, name: &str, output: impl Into<OutputTarget>) -> Result<TopicId> {
        self.require_topics("add_topic")?;
        self.register_topic(name, output.into(), None)
    }

    /// Like [`Logger::add_topic`], then sets the topic's level.
    #[track_caller]
    pub fn add_topic_with_level(
        &self,
        name: &str,
        output: impl Into<OutputTarget>,
        level: Level,
    ) -> Result<TopicId> {
        self.require_topics("add_topic_with_level")?;
        self.register_topic(name, output.into(), Some(level))
    }

    fn register_topic(&self, name: &str, output: OutputTarget, level: Option<Level>) -> Result<TopicId> {
        let mut state = self.gate.acquire()?;
        let State { levels, topics, .. } = &mut *state;
        if let Some(level) = level {
            check_level(levels, level)?;
        }
        let topics = topics.as_mut().ok_or(UlogError::Disabled(FEATURE_TOPICS))?;
        let id = topics.add(name, output)?;
        if let Some(level) = level {
            topics.set_level(id, level)?;
        }
        Ok(id)
    }

    /// Id of topic `name`, if registered.
    #[track_caller]
    pub fn topic_id(&self, name: &str) -> Option<TopicId> {
        self.require_topics("topic_id").ok()?;
        let state = self.gate.acquire().ok()?;
        state.topics.as_ref()?.id_of(name)
    }

    /// Snapshot of topic `name`.
    #[track_caller]
    pub fn topic(&self, name: &str) -> Option<Topic> {
        self.require_topics("topic").ok()?;
        let state = self.gate.acquire().ok()?;
        let topics = state.topics.as_ref()?;
        topics.id_of(name).and_then(|id| topics.get(id)).cloned()
    }

    #[track_caller]
    pub fn set_topic_level(&self, name: &str, level: Level) -> Result<()> {
        self.require_topics("set_topic_level")?;
        self.with_topics(level, |topics| {
            let id = topics
                .id_of(name)
                .ok_or_else(|| UlogError::not_found(format!("topic '{}'", name)))?;
            topics.set_level(id, level)
        })
    }

    #[track_caller]
    pub fn set_topic_level_by_id(&self, id: TopicId, level: Level) -> Result<()> {
        self.require_topics("set_topic_level_by_id")?;
        self.with_topics(level, |topics| topics.set_level(id, level))
    }

    #[track_caller]
    pub fn remove_topic(&self, name: &str) -> Result<()> {
        self.require_topics("remove_topic")?;
        let mut state = self.gate.acquire()?;
        let topics = state
            .topics
            .as_mut()
            .ok_or(UlogError::Disabled(FEATURE_TOPICS))?;
        topics.remove(name)
    }

    fn with_topics<T>(
        &self,
        level: Level,
        apply: impl FnOnce(&mut TopicRegistry) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.gate.acquire()?;
        let State { levels, topics, .. } = &mut *state;
        check_level(levels, level)?;
        let topics = topics.as_mut().ok_or(UlogError::Disabled(FEATURE_TOPICS))?;
        apply(topics)
    }

    // --- prefix ---

    /// Installs the prefix callback, replacing any previous one.
    #[track_caller]
    pub fn set_prefix_fn<F: PrefixFn + 'static>(&self, prefix: F) -> Result<()> {
        self.require_prefix("set_prefix_fn")?;
        let mut state = self.gate.acquire()?;
        state.prefix.clear();
        state.prefix.function = Some(Arc::new(prefix));
        Ok(())
    }

    #[track_caller]
    pub fn clear_prefix_fn(&self) -> Result<()> {
        self.require_prefix("clear_prefix_fn")?;
        let mut state = self.gate.acquire()?;
        state.prefix.clear();
        Ok(())
    }

    // --- runtime switches ---

    /// Current runtime switches.
    pub fn runtime_flags(&self) -> Result<RuntimeFlags> {
        Ok(self.gate.acquire()?.flags)
    }

    #[track_caller]
    pub fn set_color_enabled(&self, enabled: bool) -> Result<()> {
        self.toggle("set_color_enabled", |state| state.flags.color = enabled)
    }

    #[track_caller]
    pub fn set_prefix_enabled(&self, enabled: bool) -> Result<()> {
        self.toggle("set_prefix_enabled", |state| state.flags.prefix = enabled)
    }

    #[track_caller]
    pub fn set_time_enabled(&self, enabled: bool) -> Result<()> {
        self.toggle("set_time_enabled", |state| state.flags.time = enabled)
    }

    #[track_caller]
    pub fn set_topics_enabled(&self, enabled: bool) -> Result<()> {
        self.toggle("set_topics_enabled", |state| state.flags.topics = enabled)
    }

    #[track_caller]
    pub fn set_source_location_enabled(&self, enabled: bool) -> Result<()> {
        self.toggle("set_source_location_enabled", |state| {
            state.flags.source_location = enabled
        })
    }

    /// Switches the level style. A built-in level table follows the style;
    /// a custom table set with [`Logger::set_levels`] stays.
    #[track_caller]
    pub fn set_level_style(&self, style: LevelStyle) -> Result<()> {
        self.toggle("set_level_style", |state| {
            let builtin = LevelDescriptor::for_style(state.flags.level_style);
            if state.levels == builtin {
                state.levels = LevelDescriptor::for_style(style);
            }
            state.flags.level_style = style;
        })
    }

    #[track_caller]
    fn toggle(&self, function: &'static str, apply: impl FnOnce(&mut State)) -> Result<()> {
        if !self.config.dynamic_config {
            return Err(self.disabled(function, FEATURE_DYNAMIC_CONFIG));
        }
        let mut state = self.gate.acquire()?;
        apply(&mut *state);
        Ok(())
    }

    // --- teardown ---

    /// Drops every topic and extra output, puts stdout back at its
    /// configured level and removes the prefix callback. Levels, switches
    /// and the lock callback are kept.
    pub fn cleanup(&self) -> Result<()> {
        let mut state = self.gate.acquire()?;
        if let Some(topics) = state.topics.as_mut() {
            topics.clear();
        }
        state.outputs.reset(self.stdout_level);
        state.prefix.clear();
        tracing::debug!(target: "ulog", "logger cleaned up");
        Ok(())
    }

    // --- capability checks ---

    #[track_caller]
    fn require_outputs(&self, function: &'static str) -> Result<()> {
        if self.config.extra_outputs == 0 {
            return Err(self.disabled(function, FEATURE_EXTRA_OUTPUTS));
        }
        Ok(())
    }

    #[track_caller]
    fn require_topics(&self, function: &'static str) -> Result<()> {
        if self.config.topics_mode == TopicsMode::Off {
            return Err(self.disabled(function, FEATURE_TOPICS));
        }
        Ok(())
    }

    #[track_caller]
    fn require_prefix(&self, function: &'static str) -> Result<()> {
        if self.config.prefix_size == 0 {
            return Err(self.disabled(function, FEATURE_PREFIX));
        }
        Ok(())
    }

    /// Builds the `Disabled` error and, when configured, logs a WARN line
    /// pointing at the caller. Must be called outside the gate.
    #[track_caller]
    fn disabled(&self, function: &'static str, feature: &'static str) -> UlogError {
        self.diagnostics.increment_disabled_calls();
        if self.config.warn_not_enabled {
            let location = Location::caller();
            let first = WARNING_ACTIVE.with(|active| !active.replace(true));
            if first {
                self.log(
                    Level::WARN,
                    Some(location.file()),
                    location.line(),
                    None,
                    Some(format_args!("'{}' called with {} disabled", function, feature)),
                );
                WARNING_ACTIVE.with(|active| active.set(false));
            }
        }
        UlogError::Disabled(feature)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("has_lock", &self.gate.has_lock())
            .finish_non_exhaustive()
    }
}

fn check_level(levels: &LevelDescriptor, level: Level) -> Result<()> {
    if levels.is_valid(level) {
        return Ok(());
    }
    Err(UlogError::invalid_argument(format!(
        "level {} above max level {}",
        level.value(),
        levels.max_level().value()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;
    use std::sync::Mutex;

    fn capture(logger: &Logger, level: Level) -> (OutputId, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let id = logger
            .add_output(
                move |event: &Event<'_>| {
                    sink.lock()
                        .unwrap()
                        .push(event.to_line(crate::LineStyle::PLAIN))
                },
                level,
            )
            .unwrap();
        (id, lines)
    }

    fn quiet(config: LoggerConfig) -> Logger {
        let logger = Logger::with_config(config).unwrap();
        logger.set_output_level(OutputId::STDOUT, Level::FATAL).unwrap();
        logger
    }

    #[test]
    fn test_output_level_filters() {
        let logger = quiet(LoggerConfig {
            extra_outputs: 1,
            ..Default::default()
        });
        let (_, lines) = capture(&logger, Level::WARN);

        logger.log(Level::INFO, None, 0, None, Some(format_args!("info")));
        logger.log(Level::ERROR, None, 0, None, Some(format_args!("error")));

        assert_eq!(*lines.lock().unwrap(), vec!["ERROR error".to_string()]);
    }

    #[test]
    fn test_prefix_callback() {
        let logger = quiet(LoggerConfig::dynamic());
        logger.set_time_enabled(false).unwrap();
        let (_, lines) = capture(&logger, Level::TRACE);
        logger
            .set_prefix_fn(|event: &Event<'_>, out: &mut BufferTarget<'_>| {
                let _ = write!(out, "<{}> ", event.level().value());
            })
            .unwrap();

        logger.log(Level::INFO, Some("p.rs"), 3, None, Some(format_args!("ready")));
        assert_eq!(lines.lock().unwrap()[0], "<2> INFO  p.rs:3: ready");
    }

    #[test]
    fn test_prefix_is_clipped_to_buffer() {
        let logger = quiet(LoggerConfig {
            prefix_size: 4,
            extra_outputs: 1,
            ..Default::default()
        });
        let (_, lines) = capture(&logger, Level::TRACE);
        logger
            .set_prefix_fn(|_: &Event<'_>, out: &mut BufferTarget<'_>| {
                let _ = out.write_str("abcdef");
            })
            .unwrap();

        logger.log(Level::INFO, None, 0, None, Some(format_args!("m")));
        assert_eq!(lines.lock().unwrap()[0], "abcINFO  m");
    }

    #[test]
    fn test_handler_logging_into_same_logger_is_dropped() {
        let logger = Arc::new(quiet(LoggerConfig {
            extra_outputs: 1,
            ..Default::default()
        }));
        let inner = Arc::downgrade(&logger);
        logger
            .add_output(
                move |_: &Event<'_>| {
                    if let Some(logger) = inner.upgrade() {
                        logger.log(Level::INFO, None, 0, None, Some(format_args!("nested")));
                    }
                },
                Level::TRACE,
            )
            .unwrap();

        logger.log(Level::INFO, None, 0, None, Some(format_args!("outer")));
        let snapshot = logger.diagnostics();
        assert_eq!(snapshot.events_emitted, 1);
        assert_eq!(snapshot.events_dropped_busy, 1);
    }

    #[test]
    fn test_level_style_switch_follows_builtin_table() {
        let logger = quiet(LoggerConfig::dynamic());
        logger.set_level_style(LevelStyle::Short).unwrap();
        assert_eq!(logger.level_name(Level::ERROR), "E");

        let custom = LevelDescriptor::new(Level::LEVEL_1, ["LOW", "HIGH"]);
        logger.set_levels(custom).unwrap();
        logger.set_level_style(LevelStyle::Long).unwrap();
        assert_eq!(logger.level_name(Level::LEVEL_1), "HIGH");

        logger.reset_levels().unwrap();
        assert_eq!(logger.level_name(Level::LEVEL_1), "DEBUG");
    }

    #[test]
    fn test_disabled_warning_points_at_caller() {
        let logger = Logger::with_config(LoggerConfig {
            extra_outputs: 1,
            ..Default::default()
        })
        .unwrap();
        logger.set_output_level(OutputId::STDOUT, Level::FATAL).unwrap();
        let (_, lines) = capture(&logger, Level::TRACE);

        let line = line!() + 1;
        let result = logger.set_color_enabled(true);
        assert!(matches!(result, Err(UlogError::Disabled("DYNAMIC_CONFIG"))));

        let expected = format!(
            "WARN  {}:{}: 'set_color_enabled' called with DYNAMIC_CONFIG disabled",
            file!(),
            line
        );
        assert_eq!(*lines.lock().unwrap(), vec![expected]);
        assert_eq!(logger.diagnostics().disabled_calls, 1);
    }
}
