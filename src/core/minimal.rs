//! The minimal logging capability every layer implements
//!
//! Base adapters, replay journals and rollup buffers each implement
//! [`MinimalLogger`]; the five-severity convenience surface lives once on
//! [`Logger`](super::logger::Logger), which wraps any implementation.

use super::{error::Result, fields::Fields, log_level::LogLevel, message::LogMessage};
use std::sync::Arc;

pub trait MinimalLogger: Send + Sync {
    /// A view of this logger that adds `fields` to every message.
    ///
    /// An empty field set must return `self` unchanged.
    fn with_fields(self: Arc<Self>, fields: Fields) -> Arc<dyn MinimalLogger>;

    /// Emit one message; `fields` already carries the `caller` field.
    fn log_with_fields(&self, level: LogLevel, fields: Fields, message: LogMessage)
        -> Result<()>;

    /// Whether a message at `level` would reach a sink through this logger
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }

    /// Flush buffered output and report deferred failures
    fn sync(&self) -> Result<()>;
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NilLogger;

impl MinimalLogger for NilLogger {
    fn with_fields(self: Arc<Self>, _fields: Fields) -> Arc<dyn MinimalLogger> {
        self
    }

    fn log_with_fields(&self, _: LogLevel, _: Fields, _: LogMessage) -> Result<()> {
        Ok(())
    }

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
