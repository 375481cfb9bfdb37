//! Timestamp formatting utilities
//!
//! Every time value that leaves the core is rendered with one of the
//! formats below. Field values and JSON timestamps always carry
//! millisecond precision and an explicit UTC offset so they can be parsed
//! back into the same instant.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

/// Format used for time-valued fields and JSON timestamps: `2025-01-08T10:30:45.123+0000`
pub const FIELD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Console timestamp format: `2025/01/08 10:30:45.123`
pub const CONSOLE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Short console timestamp format: `10:30:45`
pub const CONSOLE_SHORT_TIME_FORMAT: &str = "%H:%M:%S";

/// Timestamp format selection for sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds and offset, see [`FIELD_TIME_FORMAT`]
    #[default]
    Iso8601Offset,

    /// Full console date and time, see [`CONSOLE_TIME_FORMAT`]
    Console,

    /// Time of day only, see [`CONSOLE_SHORT_TIME_FORMAT`]
    ConsoleShort,
}

impl TimestampFormat {
    /// The strftime pattern behind this format
    #[must_use]
    pub fn pattern(&self) -> &'static str {
        match self {
            TimestampFormat::Iso8601Offset => FIELD_TIME_FORMAT,
            TimestampFormat::Console => CONSOLE_TIME_FORMAT,
            TimestampFormat::ConsoleShort => CONSOLE_SHORT_TIME_FORMAT,
        }
    }

    /// Format any timezone-aware timestamp according to this format
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        datetime.format(self.pattern()).to_string()
    }
}

/// Render a time value the way it appears in a field
#[must_use]
pub fn format_field_time(datetime: &DateTime<FixedOffset>) -> String {
    TimestampFormat::Iso8601Offset.format(datetime)
}

/// Parse a string previously produced by [`format_field_time`]
pub fn parse_field_time(value: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, FIELD_TIME_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + Duration::microseconds(123456)
    }

    #[test]
    fn test_field_format() {
        let result = TimestampFormat::Iso8601Offset.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123+0000");
    }

    #[test]
    fn test_field_format_keeps_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let local = fixed_datetime().with_timezone(&offset);
        assert_eq!(format_field_time(&local), "2025-01-08T05:30:45.123-0500");
    }

    #[test]
    fn test_console_formats() {
        assert_eq!(
            TimestampFormat::Console.format(&fixed_datetime()),
            "2025/01/08 10:30:45.123"
        );
        assert_eq!(
            TimestampFormat::ConsoleShort.format(&fixed_datetime()),
            "10:30:45"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let original = Utc.timestamp_millis_opt(1_503_939_881_250).single().expect("valid");
        let rendered = format_field_time(&original.fixed_offset());
        let parsed = parse_field_time(&rendered).expect("parse");
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_default_is_field_format() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Iso8601Offset);
    }
}
