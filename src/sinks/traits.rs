//! Output handler interface.
//!
//! An output is anything that can consume a fully formed [`Event`]. The
//! logger owns the slot table; handlers only see events that already passed
//! topic, level and output filtering.
//!
//! ```rust
//! use ulog::{Event, Level, LineStyle, Logger, LoggerConfig};
//! use std::sync::{Arc, Mutex};
//!
//! let logger = Logger::with_config(LoggerConfig {
//!     extra_outputs: 1,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let lines = Arc::new(Mutex::new(Vec::new()));
//! let sink = lines.clone();
//! logger
//!     .add_output(
//!         move |event: &Event<'_>| sink.lock().unwrap().push(event.to_line(LineStyle::PLAIN)),
//!         Level::INFO,
//!     )
//!     .unwrap();
//! ```

use crate::core::event::Event;
use std::fmt;

/// Slot index of an output. Slot 0 is the built-in stdout output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputId(usize);

impl OutputId {
    /// The permanent stdout output.
    pub const STDOUT: OutputId = OutputId(0);

    pub const fn new(value: usize) -> Self {
        OutputId(value)
    }

    pub const fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an event is delivered: every output, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    All,
    Id(OutputId),
}

impl OutputTarget {
    /// `true` when `id` is selected by this target.
    pub fn includes(self, id: OutputId) -> bool {
        match self {
            OutputTarget::All => true,
            OutputTarget::Id(target) => target == id,
        }
    }
}

impl From<OutputId> for OutputTarget {
    fn from(id: OutputId) -> Self {
        OutputTarget::Id(id)
    }
}

/// Consumer of log events.
///
/// Handlers run inside the logger's critical section: they must not block
/// for long, and a handler that logs into the same logger has its events
/// dropped as busy.
pub trait OutputHandler: Send + Sync {
    fn handle(&self, event: &Event<'_>);

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> OutputHandler for F
where
    F: Fn(&Event<'_>) + Send + Sync,
{
    fn handle(&self, event: &Event<'_>) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_target_selection() {
        let first = OutputId::new(1);
        let second = OutputId::new(2);
        assert!(OutputTarget::All.includes(OutputId::STDOUT));
        assert!(OutputTarget::from(first).includes(first));
        assert!(!OutputTarget::from(first).includes(second));
        assert_eq!(OutputTarget::default(), OutputTarget::All);
    }
}
