//! # Rust Log Facade
//!
//! A structured logging facade: leveled, field-annotated messages pass
//! through a chain of composable loggers before reaching a swappable sink.
//!
//! ## Features
//!
//! - **Structured fields**: scoped views merge their fields under call-site fields
//! - **Caller attribution**: every record names the line that logged it
//! - **Replay**: journal low-severity messages and re-emit them at a higher level
//! - **Rollup**: collapse duplicate messages into one summary per time window
//! - **Swappable sinks**: colored console lines, JSON lines, or in-memory records
//!
//! ```
//! use rust_log_facade::prelude::*;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Debug)
//!     .sink(sink.clone())
//!     .build()
//!     .with_fields(Fields::new().with_field("request", "abc123"));
//!
//! logger.info_with_fields(Fields::new().with_field("status", 200), "served");
//! assert_eq!(sink.records()[0].sequence_number(), Some(1));
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        from_context, with_logger, Clock, Context, FieldValue, Fields, LogLevel, LogMessage,
        LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, MinimalLogger, MockClock,
        ReplayLogger, Result, RollupLogger, Sink, SystemClock,
    };
    pub use crate::sinks::{ConsoleSink, JsonSink, MemorySink};
}

pub use self::core::{
    from_context, with_logger, BaseLogger, Clock, Context, FieldValue, Fields, LogLevel,
    LogMessage, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, MinimalLogger,
    MockClock, NilLogger, ReplayLogger, Result, RollupLogger, Sink, SystemClock,
};
pub use sinks::{ConsoleSink, JsonSink, MemorySink};
