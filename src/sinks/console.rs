//! Human-readable console sink
//!
//! Lines look like `[I] [2017/08/28 17:04:41.000] message key=value`. The
//! level letter, timestamp and message are colored per level when color is
//! enabled; fields follow uncolored, sorted by key.

use crate::core::{Fields, LogLevel, LoggerError, Result, Sink, TimestampFormat};
use chrono::{DateTime, Utc};
#[cfg(feature = "console")]
use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, Write};

pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    display_fields: bool,
    multiline_fields: bool,
    blacklist: Vec<String>,
}

impl ConsoleSink {
    /// Colored output to stderr with full timestamps and inline fields
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            use_colors: true,
            timestamp_format: TimestampFormat::Console,
            display_fields: true,
            multiline_fields: false,
            blacklist: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Show only the time of day
    #[must_use]
    pub fn with_short_time(mut self, short: bool) -> Self {
        self.timestamp_format = if short {
            TimestampFormat::ConsoleShort
        } else {
            TimestampFormat::Console
        };
        self
    }

    #[must_use]
    pub fn with_display_fields(mut self, display: bool) -> Self {
        self.display_fields = display;
        self
    }

    /// Put each field on its own indented line
    #[must_use]
    pub fn with_multiline_fields(mut self, multiline: bool) -> Self {
        self.multiline_fields = multiline;
        self
    }

    /// Field names never displayed
    #[must_use]
    pub fn with_blacklist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = names.into_iter().map(Into::into).collect();
        self
    }

    fn format_line(
        &self,
        timestamp: &DateTime<Utc>,
        level: LogLevel,
        fields: &Fields,
        message: &str,
    ) -> String {
        let letter = level
            .to_str()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?');
        let head = format!(
            "[{}] [{}] {}",
            letter,
            self.timestamp_format.format(timestamp),
            message
        );

        let mut line = self.paint(level, head);
        if self.display_fields {
            line.push_str(&self.format_fields(fields));
        }
        line
    }

    fn format_fields(&self, fields: &Fields) -> String {
        if fields.is_empty() {
            return String::new();
        }

        let (prefix, padding, suffix) = if self.multiline_fields {
            ("\n    ", " ", "\n")
        } else {
            (" ", "", "")
        };

        let mut out = String::new();
        for (key, value) in fields.sorted() {
            if self.blacklist.iter().any(|b| b == key) {
                continue;
            }
            out.push_str(&format!("{}{}{}={}{}", prefix, key, padding, padding, value));
        }
        out.push_str(suffix);
        out
    }

    #[cfg(feature = "console")]
    fn paint(&self, level: LogLevel, text: String) -> String {
        if !self.use_colors {
            return text;
        }
        match level.color_code() {
            Some(color) if level == LogLevel::Fatal => text.color(color).bold().to_string(),
            Some(color) => text.color(color).to_string(),
            None => text,
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, _level: LogLevel, text: String) -> String {
        text
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn log(
        &self,
        timestamp: DateTime<Utc>,
        level: LogLevel,
        fields: &Fields,
        message: &str,
    ) -> Result<()> {
        let line = self.format_line(&timestamp, level, fields, message);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing", "console sink writer", e))
    }

    fn name(&self) -> &str {
        "console"
    }
}
