//! Severity levels and swappable level name tables.
//!
//! A level is a small integer on an ordered scale `0..=max_level` with at most
//! [`MAX_LEVELS`] entries. Filtering is always `level >= threshold`.

use crate::error::{Result, UlogError};
use std::borrow::Cow;
use std::str::FromStr;

/// Maximum number of levels a descriptor may define.
pub const MAX_LEVELS: usize = 8;

/// Ordered severity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(u8);

impl Level {
    pub const LEVEL_0: Level = Level(0);
    pub const LEVEL_1: Level = Level(1);
    pub const LEVEL_2: Level = Level(2);
    pub const LEVEL_3: Level = Level(3);
    pub const LEVEL_4: Level = Level(4);
    pub const LEVEL_5: Level = Level(5);
    pub const LEVEL_6: Level = Level(6);
    pub const LEVEL_7: Level = Level(7);

    pub const TRACE: Level = Level::LEVEL_0;
    pub const DEBUG: Level = Level::LEVEL_1;
    pub const INFO: Level = Level::LEVEL_2;
    pub const WARN: Level = Level::LEVEL_3;
    pub const ERROR: Level = Level::LEVEL_4;
    pub const FATAL: Level = Level::LEVEL_5;

    /// Creates a level from its raw value. Range is checked against the
    /// active descriptor where it matters, not here.
    pub const fn new(value: u8) -> Self {
        Level(value)
    }

    /// Raw numeric value of the level.
    pub const fn value(self) -> u8 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Level(value)
    }
}

impl FromStr for Level {
    type Err = UlogError;

    /// Parses a built-in level name (`"warn"`, `"WARN"`, `"W"`) or a raw
    /// number (`"3"`).
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if let Ok(value) = name.parse::<u8>() {
            if (value as usize) < MAX_LEVELS {
                return Ok(Level(value));
            }
            return Err(UlogError::InvalidLogLevel(s.to_string()));
        }
        let upper = name.to_uppercase();
        LONG_NAMES
            .iter()
            .zip(SHORT_NAMES.iter())
            .position(|(long, short)| long.trim_end() == upper || *short == upper)
            .map(|i| Level(i as u8))
            .ok_or_else(|| UlogError::InvalidLogLevel(s.to_string()))
    }
}

/// `true` when an event at `level` passes a `threshold`.
#[inline]
pub fn is_allowed(level: Level, threshold: Level) -> bool {
    level >= threshold
}

const LONG_NAMES: [&str; 6] = ["TRACE", "DEBUG", "INFO ", "WARN ", "ERROR", "FATAL"];
const SHORT_NAMES: [&str; 6] = ["T", "D", "I", "W", "E", "F"];

/// Level name style of the built-in tables.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelStyle {
    /// `TRACE`, `DEBUG`, `INFO `, ... padded to a common width
    #[default]
    Long,
    /// `T`, `D`, `I`, ...
    Short,
}

/// A level scale: the highest valid level and a display name per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDescriptor {
    max_level: Level,
    names: Vec<Cow<'static, str>>,
}

impl LevelDescriptor {
    /// Builds a descriptor. Use [`LevelDescriptor::validate`] (or
    /// `Logger::set_levels`, which validates) before relying on it.
    pub fn new<I, S>(max_level: Level, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            max_level,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Built-in six level table, long names.
    pub fn long() -> Self {
        Self::new(Level::FATAL, LONG_NAMES)
    }

    /// Built-in six level table, single letter names.
    pub fn short() -> Self {
        Self::new(Level::FATAL, SHORT_NAMES)
    }

    /// Built-in table for a style.
    pub fn for_style(style: LevelStyle) -> Self {
        match style {
            LevelStyle::Long => Self::long(),
            LevelStyle::Short => Self::short(),
        }
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }

    /// Display name of `level`, or `"?"` when it is outside the scale.
    pub fn name(&self, level: Level) -> &str {
        if !self.is_valid(level) {
            return "?";
        }
        self.names
            .get(level.index())
            .map(|name| name.as_ref())
            .unwrap_or("?")
    }

    /// `true` when `level` lies within `0..=max_level`.
    pub fn is_valid(&self, level: Level) -> bool {
        level <= self.max_level
    }

    pub fn validate(&self) -> Result<()> {
        if self.names.first().map_or(true, |name| name.trim().is_empty()) {
            return Err(UlogError::invalid_argument("level table has no first name"));
        }
        if self.max_level.value() == 0 {
            return Err(UlogError::invalid_argument("max_level must be greater than 0"));
        }
        if self.max_level.index() >= MAX_LEVELS {
            return Err(UlogError::invalid_argument(format!(
                "max_level {} exceeds the {} level limit",
                self.max_level.value(),
                MAX_LEVELS
            )));
        }
        if self.names.len() <= self.max_level.index() {
            return Err(UlogError::invalid_argument(format!(
                "{} names given for max_level {}",
                self.names.len(),
                self.max_level.value()
            )));
        }
        Ok(())
    }
}

impl Default for LevelDescriptor {
    fn default() -> Self {
        Self::long()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_builtin_names() {
        let long = LevelDescriptor::long();
        assert_eq!(long.name(Level::TRACE), "TRACE");
        assert_eq!(long.name(Level::WARN), "WARN ");
        assert_eq!(long.name(Level::FATAL), "FATAL");
        assert_eq!(long.name(Level::LEVEL_6), "?");

        let short = LevelDescriptor::short();
        assert_eq!(short.name(Level::ERROR), "E");
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        assert!(LevelDescriptor::long().validate().is_ok());

        let no_first = LevelDescriptor::new(Level::LEVEL_1, ["", "LOUD"]);
        assert!(matches!(no_first.validate(), Err(UlogError::InvalidArgument(_))));

        let zero_max = LevelDescriptor::new(Level::LEVEL_0, ["ONLY"]);
        assert!(matches!(zero_max.validate(), Err(UlogError::InvalidArgument(_))));

        let too_few = LevelDescriptor::new(Level::LEVEL_3, ["A", "B"]);
        assert!(matches!(too_few.validate(), Err(UlogError::InvalidArgument(_))));

        let too_high = LevelDescriptor::new(Level::new(8), vec!["X"; 9]);
        assert!(matches!(too_high.validate(), Err(UlogError::InvalidArgument(_))));
    }

    #[test]
    fn test_custom_table() {
        let table = LevelDescriptor::new(
            Level::LEVEL_2,
            ["QUIET".to_string(), "NORMAL".to_string(), "LOUD".to_string()],
        );
        assert!(table.validate().is_ok());
        assert_eq!(table.name(Level::LEVEL_2), "LOUD");
        assert_eq!(table.name(Level::LEVEL_3), "?");
        assert!(!table.is_valid(Level::LEVEL_3));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::WARN);
        assert_eq!(" INFO ".parse::<Level>().unwrap(), Level::INFO);
        assert_eq!("F".parse::<Level>().unwrap(), Level::FATAL);
        assert_eq!("7".parse::<Level>().unwrap(), Level::LEVEL_7);
        assert!("8".parse::<Level>().is_err());
        assert!("verbose".parse::<Level>().is_err());
    }

    proptest! {
        #[test]
        fn prop_is_allowed_is_greater_or_equal(level in 0u8..8, threshold in 0u8..8) {
            prop_assert_eq!(
                is_allowed(Level::new(level), Level::new(threshold)),
                level >= threshold
            );
        }
    }
}
