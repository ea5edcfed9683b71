use crate::core::event::{Event, LineStyle};
use crate::core::print::StreamTarget;
use crate::sinks::traits::OutputHandler;
use std::io;

/// The built-in output in slot 0: renders to standard output.
#[derive(Debug, Clone, Copy)]
pub struct StdoutOutput {
    style: LineStyle,
}

impl StdoutOutput {
    /// Console style: short time, color, no location, newline.
    pub fn new() -> Self {
        Self {
            style: LineStyle::CONSOLE,
        }
    }

    /// Stdout output with a custom line style.
    pub fn with_style(style: LineStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }
}

impl Default for StdoutOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputHandler for StdoutOutput {
    fn handle(&self, event: &Event<'_>) {
        let stdout = io::stdout();
        let mut target = StreamTarget::new(stdout.lock());
        event.render(&mut target, self.style);
        target.flush();
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
