//! JSON lines sink
//!
//! Each record is one JSON object: the fields plus `message`, `timestamp`
//! and `level`. Those three keys can be renamed.

use crate::core::{
    timestamp::format_field_time, Fields, LogLevel, LoggerError, Result, Sink,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};

/// Names of the keys the sink adds to every object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFieldNames {
    pub message: String,
    pub timestamp: String,
    pub level: String,
}

impl JsonFieldNames {
    /// Keys that may be renamed
    pub const RENAMEABLE: [&'static str; 3] = ["message", "timestamp", "level"];

    /// Apply renames; only `message`, `timestamp` and `level` are accepted.
    pub fn from_renames(renames: &HashMap<String, String>) -> Result<Self> {
        let mut names = Self::default();
        for (name, renamed) in renames {
            match name.as_str() {
                "message" => names.message = renamed.clone(),
                "timestamp" => names.timestamp = renamed.clone(),
                "level" => names.level = renamed.clone(),
                other => {
                    return Err(LoggerError::config(
                        "log_json_field_names",
                        format!("unknown JSON field name {}", other),
                    ))
                }
            }
        }
        Ok(names)
    }
}

impl Default for JsonFieldNames {
    fn default() -> Self {
        Self {
            message: "message".to_string(),
            timestamp: "timestamp".to_string(),
            level: "level".to_string(),
        }
    }
}

pub struct JsonSink {
    writer: Mutex<Box<dyn Write + Send>>,
    names: JsonFieldNames,
}

impl JsonSink {
    /// Write to stderr
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            names: JsonFieldNames::default(),
        }
    }

    #[must_use]
    pub fn with_field_names(mut self, names: JsonFieldNames) -> Self {
        self.names = names;
        self
    }

    fn to_json(
        &self,
        timestamp: &DateTime<Utc>,
        level: LogLevel,
        fields: &Fields,
        message: &str,
    ) -> Result<String> {
        let mut object: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json_value()))
            .collect();

        object.insert(self.names.message.clone(), message.into());
        object.insert(
            self.names.timestamp.clone(),
            format_field_time(&timestamp.fixed_offset()).into(),
        );
        object.insert(self.names.level.clone(), level.to_str().into());

        Ok(serde_json::to_string(&object)?)
    }
}

impl Default for JsonSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for JsonSink {
    fn log(
        &self,
        timestamp: DateTime<Utc>,
        level: LogLevel,
        fields: &Fields,
        message: &str,
    ) -> Result<()> {
        let json = self.to_json(&timestamp, level, fields, message)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing", "json sink writer", e))
    }

    fn name(&self) -> &str {
        "json"
    }
}
