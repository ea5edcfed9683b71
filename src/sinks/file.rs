//! Writer-backed output.
//!
//! [`WriterOutput`] renders each accepted event into any [`io::Write`]
//! stream, flushing after every line. The usual case is a log file opened
//! with [`WriterOutput::open`].

use crate::core::event::{Event, LineStyle};
use crate::core::print::StreamTarget;
use crate::error::Result;
use crate::sinks::traits::OutputHandler;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Output writing rendered lines to a stream.
#[derive(Debug)]
pub struct WriterOutput<W> {
    writer: Mutex<W>,
    style: LineStyle,
}

/// Output appending to a file.
pub type FileOutput = WriterOutput<File>;

impl<W: io::Write + Send> WriterOutput<W> {
    /// File style: full time, no color, with location, newline.
    pub fn new(writer: W) -> Self {
        Self::with_style(writer, LineStyle::FILE)
    }

    pub fn with_style(writer: W, style: LineStyle) -> Self {
        Self {
            writer: Mutex::new(writer),
            style,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterOutput<File> {
    /// Opens `path` for appending, creating it and missing parent
    /// directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: io::Write + Send> OutputHandler for WriterOutput<W> {
    fn handle(&self, event: &Event<'_>) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut target = StreamTarget::new(&mut *writer);
        event.render(&mut target, self.style);
        target.flush();
    }

    fn name(&self) -> &'static str {
        "writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, Logger, LoggerConfig};
    use std::sync::Arc;

    #[test]
    fn test_file_output_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("app.log");

        let logger = Logger::with_config(LoggerConfig {
            extra_outputs: 1,
            ..Default::default()
        })
        .unwrap();
        logger.set_output_level(crate::OutputId::STDOUT, Level::FATAL).unwrap();
        logger
            .add_output(WriterOutput::open(&path).unwrap(), Level::INFO)
            .unwrap();

        logger.log(Level::DEBUG, Some("a.rs"), 1, None, Some(format_args!("hidden")));
        logger.log(Level::WARN, Some("a.rs"), 7, None, Some(format_args!("disk at {}%", 91)));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "WARN  a.rs:7: disk at 91%\n");
    }

    #[test]
    fn test_writer_output_into_inner() {
        let output = Arc::new(WriterOutput::with_style(Vec::new(), LineStyle::PLAIN));
        let logger = Logger::with_config(LoggerConfig {
            extra_outputs: 1,
            ..Default::default()
        })
        .unwrap();
        logger.set_output_level(crate::OutputId::STDOUT, Level::FATAL).unwrap();
        logger.add_output_shared(output.clone(), Level::TRACE).unwrap();
        logger.log(Level::INFO, None, 0, None, Some(format_args!("one")));
        logger.log(Level::INFO, None, 0, None, Some(format_args!("two")));
        logger.cleanup().unwrap();

        let output = Arc::try_unwrap(output).unwrap();
        assert_eq!(output.into_inner(), b"INFO  oneINFO  two".to_vec());
    }
}
