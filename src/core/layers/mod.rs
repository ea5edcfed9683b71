//! `tracing` integration layers.

pub mod tracing_bridge;

pub use tracing_bridge::{map_level, UlogLayer};
