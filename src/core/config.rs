//! Logger configuration
//!
//! [`LoggerConfig`] deserializes from any serde format, with every key
//! optional. Loading it from the environment or a file is left to the
//! application.
//!
//! # Example
//! ```
//! use rust_log_facade::core::LoggerConfig;
//!
//! let config = LoggerConfig::from_json_str(r#"{"log_level": "DEBUG", "log_encoding": "json"}"#)?;
//! let logger = config.build()?;
//! logger.debug("configured");
//! # Ok::<(), rust_log_facade::LoggerError>(())
//! ```

use super::{
    error::{LoggerError, Result},
    fields::Fields,
    log_level::LogLevel,
    logger::{Logger, LoggerBuilder},
};
use crate::sinks::{ConsoleSink, JsonFieldNames, JsonSink};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output encodings
pub const ENCODINGS: [&str; 2] = ["console", "json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub log_level: String,
    pub log_encoding: String,
    pub log_colorize: bool,
    pub log_json_field_names: HashMap<String, String>,
    pub log_initial_fields: Fields,
    pub log_short_time: bool,
    pub log_display_fields: bool,
    pub log_display_multiline_fields: bool,
    pub log_field_blacklist: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_encoding: "console".to_string(),
            log_colorize: true,
            log_json_field_names: HashMap::new(),
            log_initial_fields: Fields::new(),
            log_short_time: false,
            log_display_fields: true,
            log_display_multiline_fields: false,
            log_field_blacklist: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Normalize case and reject unknown values
    pub fn validate(&mut self) -> Result<()> {
        self.log_level = self.log_level.to_lowercase();
        if self.log_level.parse::<LogLevel>().is_err() {
            return Err(LoggerError::config(
                "log_level",
                format!("illegal log level {:?}", self.log_level),
            ));
        }

        if !ENCODINGS.contains(&self.log_encoding.as_str()) {
            return Err(LoggerError::config(
                "log_encoding",
                format!("illegal log encoding {:?}", self.log_encoding),
            ));
        }

        for name in self.log_json_field_names.keys() {
            if !JsonFieldNames::RENAMEABLE.contains(&name.as_str()) {
                return Err(LoggerError::config(
                    "log_json_field_names",
                    format!("unknown JSON field name {}", name),
                ));
            }
        }

        for name in &mut self.log_field_blacklist {
            *name = name.to_lowercase();
        }

        Ok(())
    }

    /// Threshold named by `log_level`; unknown names log nothing
    pub fn level(&self) -> LogLevel {
        LogLevel::parse_or_none(&self.log_level)
    }

    /// A builder with the configured sink, threshold and initial fields
    pub fn builder(&self) -> Result<LoggerBuilder> {
        let mut config = self.clone();
        config.validate()?;

        let builder = Logger::builder()
            .min_level(config.level())
            .fields(config.log_initial_fields.clone());

        let builder = if config.log_encoding == "json" {
            builder.sink(
                JsonSink::new()
                    .with_field_names(JsonFieldNames::from_renames(&config.log_json_field_names)?),
            )
        } else {
            builder.sink(
                ConsoleSink::new()
                    .with_colors(config.log_colorize)
                    .with_short_time(config.log_short_time)
                    .with_display_fields(config.log_display_fields)
                    .with_multiline_fields(config.log_display_multiline_fields)
                    .with_blacklist(config.log_field_blacklist),
            )
        };

        Ok(builder)
    }

    pub fn build(&self) -> Result<Logger> {
        Ok(self.builder()?.build())
    }
}
