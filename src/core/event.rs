//! Log events and line rendering.
//!
//! An [`Event`] lives only for the duration of one logging call. It borrows
//! the caller's format arguments and the logger's render state, and is handed
//! by reference to each output that accepts it. Outputs pick a [`LineStyle`]
//! and render through any [`fmt::Write`] target.
//!
//! A rendered line is, in order: color start, time, prefix, level name,
//! `[topic] `, `file:line: `, message, color end, newline. Each part is
//! present only when its switch is on and the style asks for it.

use super::level::{Level, LevelDescriptor};
use super::print::BufferTarget;
use super::topics::{TopicId, TopicRegistry};
use crate::config::RuntimeFlags;
use crate::error::{Result, UlogError};
use chrono::{DateTime, Local};
use std::fmt::{self, Write};

/// ANSI color per level; levels above 7 use the first entry.
const LEVEL_COLORS: [&str; 8] = [
    "\x1b[m",
    "\x1b[36m",
    "\x1b[32m",
    "\x1b[33m",
    "\x1b[31m",
    "\x1b[31m\x1b[47m",
    "\x1b[43m\x1b[31m",
    "\x1b[41m\x1b[97m",
];
const COLOR_TERMINATOR: &str = "\x1b[0m";

const NULL_MESSAGE: &str = "null";
const INVALID_TIME: &str = "INVALID_TIME";
const SHORT_TIME_FORMAT: &str = "%H:%M:%S";
const FULL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-output choice of optional line parts.
///
/// A part also needs its logger switch to be on: `color: true` renders
/// nothing when the logger has color off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    /// Date and time instead of time only
    pub full_time: bool,
    pub color: bool,
    pub source_location: bool,
    pub new_line: bool,
}

impl LineStyle {
    /// Terminal output: short time, color, no location.
    pub const CONSOLE: LineStyle = LineStyle {
        full_time: false,
        color: true,
        source_location: false,
        new_line: true,
    };

    /// File output: full time, no color, with location.
    pub const FILE: LineStyle = LineStyle {
        full_time: true,
        color: false,
        source_location: true,
        new_line: true,
    };

    /// Single line capture: short time, no color, with location, no newline.
    pub const PLAIN: LineStyle = LineStyle {
        full_time: false,
        color: false,
        source_location: true,
        new_line: false,
    };
}

/// Logger state an event needs to render itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderContext<'a> {
    pub(crate) levels: &'a LevelDescriptor,
    pub(crate) topics: Option<&'a TopicRegistry>,
    /// Text produced by the prefix callback for this event
    pub(crate) prefix: Option<&'a str>,
    pub(crate) flags: RuntimeFlags,
}

/// One log record, valid for the duration of the logging call.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    message: Option<fmt::Arguments<'a>>,
    level: Level,
    topic: Option<TopicId>,
    file: Option<&'a str>,
    line: u32,
    time: Option<DateTime<Local>>,
    context: &'a RenderContext<'a>,
}

impl<'a> Event<'a> {
    pub(crate) fn new(
        context: &'a RenderContext<'a>,
        level: Level,
        message: Option<fmt::Arguments<'a>>,
        topic: Option<TopicId>,
        file: Option<&'a str>,
        line: u32,
        time: Option<DateTime<Local>>,
    ) -> Self {
        Self {
            message,
            level,
            topic,
            file,
            line,
            time,
            context,
        }
    }

    /// The unformatted message, if one was given.
    pub fn message(&self) -> Option<fmt::Arguments<'a>> {
        self.message
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Name of the level in the logger's current level table.
    pub fn level_name(&self) -> &'a str {
        let levels: &'a LevelDescriptor = self.context.levels;
        levels.name(self.level)
    }

    /// Source file, when source location capture is enabled.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// Source line, present together with [`Event::file`].
    pub fn line(&self) -> Option<u32> {
        self.file.map(|_| self.line)
    }

    /// Capture time, when timestamps are enabled.
    pub fn time(&self) -> Option<DateTime<Local>> {
        self.time
    }

    pub fn topic(&self) -> Option<TopicId> {
        self.topic
    }

    pub fn topic_name(&self) -> Option<&'a str> {
        let id = self.topic?;
        let topics: &'a TopicRegistry = self.context.topics?;
        topics.name_of(id)
    }

    /// Prefix text computed for this event.
    pub fn prefix(&self) -> Option<&'a str> {
        self.context.prefix
    }

    /// Writes a full line in `style` to `out`.
    ///
    /// Write failures of the target are ignored; the line may be truncated.
    pub fn render(&self, out: &mut dyn fmt::Write, style: LineStyle) {
        let _ = self.write_line(out, style);
    }

    /// Writes the message body alone, or `null` when it is missing or empty.
    pub fn write_message(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.message {
            Some(args) if args.as_str() != Some("") => out.write_fmt(args),
            _ => out.write_str(NULL_MESSAGE),
        }
    }

    /// Formats the message body into `buf` (NUL terminated, clipped).
    /// Returns the number of visible bytes written.
    pub fn message_to_buf(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(UlogError::invalid_argument("message buffer is empty"));
        }
        let mut target = BufferTarget::new(buf);
        let _ = self.write_message(&mut target);
        Ok(target.len())
    }

    /// Formats a [`LineStyle::PLAIN`] line into `buf` (NUL terminated,
    /// clipped). Returns the number of visible bytes written.
    pub fn to_buf(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(UlogError::invalid_argument("line buffer is empty"));
        }
        let mut target = BufferTarget::new(buf);
        self.render(&mut target, LineStyle::PLAIN);
        Ok(target.len())
    }

    /// The message body as an owned string.
    pub fn message_string(&self) -> String {
        let mut out = String::new();
        let _ = self.write_message(&mut out);
        out
    }

    /// A full line in `style` as an owned string.
    pub fn to_line(&self, style: LineStyle) -> String {
        let mut out = String::new();
        self.render(&mut out, style);
        out
    }

    fn write_line(&self, out: &mut dyn fmt::Write, style: LineStyle) -> fmt::Result {
        let flags = &self.context.flags;
        let color = style.color && flags.color;

        if color {
            out.write_str(self.color_code())?;
        }
        self.write_time(out, style.full_time)?;
        if let Some(prefix) = self.context.prefix {
            out.write_str(prefix)?;
        }
        write!(out, "{} ", self.level_name())?;
        if flags.topics {
            if let Some(topic) = self.topic_name() {
                write!(out, "[{}] ", topic)?;
            }
        }
        if style.source_location && flags.source_location {
            if let Some(file) = self.file {
                write!(out, "{}:{}: ", file, self.line)?;
            }
        }
        self.write_message(out)?;
        if color {
            out.write_str(COLOR_TERMINATOR)?;
        }
        if style.new_line {
            out.write_char('\n')?;
        }
        Ok(())
    }

    fn write_time(&self, out: &mut dyn fmt::Write, full: bool) -> fmt::Result {
        if !self.context.flags.time {
            return Ok(());
        }
        match self.time {
            Some(time) => {
                let format = if full { FULL_TIME_FORMAT } else { SHORT_TIME_FORMAT };
                write!(out, "{}", time.format(format))?;
            }
            None => out.write_str(INVALID_TIME)?,
        }
        // the prefix supplies its own separator
        if self.context.prefix.is_none() {
            out.write_char(' ')?;
        }
        Ok(())
    }

    fn color_code(&self) -> &'static str {
        LEVEL_COLORS
            .get(self.level.index())
            .copied()
            .unwrap_or(LEVEL_COLORS[0])
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_line(f, LineStyle::PLAIN)
    }
}
