//! Log level definitions
//!
//! Levels are ordered by severity: a lower numeric value is more severe.
//! A message at level `L` passes a threshold `T` when `L <= T`.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Fatal = 0,
    Error = 1,
    Warning = 2,
    #[default]
    Info = 3,
    Debug = 4,
    /// Non-filtering sentinel; never attached to an emitted message by the facade itself
    None = 5,
}

impl LogLevel {
    /// Every real severity, most severe first
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::None => "unknown",
        }
    }

    /// Parse a level name, falling back to [`LogLevel::None`] when the name is unknown.
    pub fn parse_or_none(name: &str) -> Self {
        name.parse().unwrap_or(LogLevel::None)
    }

    /// Returns true when `self` is strictly more severe than `other`
    #[inline]
    pub fn is_more_severe_than(&self, other: LogLevel) -> bool {
        *self < other
    }

    /// Returns true when a message at `self` passes the given threshold
    #[inline]
    pub fn passes(&self, threshold: LogLevel) -> bool {
        *self <= threshold
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> Option<colored::Color> {
        use colored::Color::*;
        match self {
            LogLevel::Fatal | LogLevel::Error => Some(Red),
            LogLevel::Warning => Some(Yellow),
            LogLevel::Info => Some(Green),
            LogLevel::Debug => Some(Cyan),
            LogLevel::None => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(LoggerError::config(
                "log_level",
                format!("Invalid log level: '{}'", s),
            )),
        }
    }
}
