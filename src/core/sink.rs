//! Sink trait for log output destinations

use super::{error::Result, fields::Fields, log_level::LogLevel};
use chrono::{DateTime, Utc};

/// Terminal consumer of fully formatted records.
///
/// Implementations receive each accepted record exactly once and must be
/// safe to call from several threads at the same time.
pub trait Sink: Send + Sync {
    fn log(
        &self,
        timestamp: DateTime<Utc>,
        level: LogLevel,
        fields: &Fields,
        message: &str,
    ) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
