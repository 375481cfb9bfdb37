//! Logging macros
//!
//! Arguments are kept as typed [`FieldValue`](crate::FieldValue)s and only
//! rendered into the `{}` placeholders when the record reaches a sink.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{fields, info, warning};
//!
//! let logger = Logger::builder().sink(MemorySink::new()).build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! warning!(logger, fields! { "attempt" => 3 }; "Retry {} of {}", 3, 5);
//! ```

/// Build a [`LogMessage`](crate::LogMessage) from a format string and arguments.
///
/// ```
/// use rust_log_facade::msg;
///
/// let message = msg!("user {} logged in from {}", 42, "10.0.0.1");
/// assert_eq!(message.render(), "user 42 logged in from 10.0.0.1");
/// ```
#[macro_export]
macro_rules! msg {
    ($format:expr) => {
        $crate::LogMessage::new($format)
    };
    ($format:expr, $($arg:expr),+ $(,)?) => {
        $crate::LogMessage::with_args(
            $format,
            vec![$($crate::FieldValue::from($arg)),+],
        )
    };
}

/// Build a [`Fields`](crate::Fields) set.
///
/// ```
/// use rust_log_facade::fields;
///
/// let fields = fields! { "user" => "bob", "attempt" => 2 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Fields::new()$(.with_field($key, $value))+
    };
}

/// Log at a given level, optionally with fields before a `;`.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::nil();
/// use rust_log_facade::{fields, log};
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Error, fields! { "code" => 500 }; "request failed");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fields:expr; $($arg:tt)+) => {
        $logger.log_with_fields($level, $fields, $crate::msg!($($arg)+))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_with_fields($level, $crate::Fields::new(), $crate::msg!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        {
            let _ = $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+);
        }
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        {
            let _ = $crate::log!($logger, $crate::LogLevel::Info, $($arg)+);
        }
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        {
            let _ = $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+);
        }
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        {
            let _ = $crate::log!($logger, $crate::LogLevel::Error, $($arg)+);
        }
    };
}

/// Log a fatal-level message. The exit hook runs afterwards.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        {
            let _ = $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+);
        }
    };
}
