//! ulog core
//!
//! Levels, print targets, the lock gate, topics, events and the logger that
//! ties them together.

pub mod event;
pub mod layers;
pub mod level;
pub mod lock;
pub mod logger;
pub mod print;
pub mod topics;

pub use event::{Event, LineStyle};
pub use level::{is_allowed, Level, LevelDescriptor, LevelStyle, MAX_LEVELS};
pub use lock::LockFn;
pub use logger::{Logger, PrefixFn};
pub use print::{BufferTarget, StreamTarget};
pub use topics::{Topic, TopicId, TopicRegistry, TOPIC_DEFAULT_LEVEL};

pub use layers::UlogLayer;
