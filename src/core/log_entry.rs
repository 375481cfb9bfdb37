//! Log record structure

use super::fields::Fields;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One fully formatted record, as handed to a sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub fields: Fields,
    pub message: String,
}

impl LogRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        level: LogLevel,
        fields: Fields,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            fields,
            message: message.into(),
        }
    }

    /// Sequence number assigned by the base adapter, if present
    pub fn sequence_number(&self) -> Option<u64> {
        self.fields
            .get(super::fields::FIELD_SEQUENCE_NUMBER)
            .and_then(|v| v.as_u64())
    }

    /// Caller location attached by the adapter, if present
    pub fn caller(&self) -> Option<&str> {
        self.fields
            .get(super::fields::FIELD_CALLER)
            .and_then(|v| v.as_str())
    }
}
