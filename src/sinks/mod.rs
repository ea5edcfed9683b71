//! ulog outputs
//!
//! The output slot table and the built-in output handlers.
//!
//! - `stdout`: slot 0, console style lines on standard output
//! - `file`: any `io::Write` stream, usually an appended log file
//! - custom handlers: any type implementing [`OutputHandler`], including
//!   closures taking `&Event`

pub mod file;
pub mod registry;
pub mod stdout;
pub mod traits;

pub use file::{FileOutput, WriterOutput};
pub use registry::OutputRegistry;
pub use stdout::StdoutOutput;
pub use traits::{OutputHandler, OutputId, OutputTarget};
