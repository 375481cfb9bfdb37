//! Core logger types and traits

pub mod base;
pub mod caller;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod fields;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod minimal;
pub mod replay;
pub mod rollup;
pub mod sink;
pub mod timestamp;

pub use base::{process_exit_hook, BaseLogger, ExitHook};
pub use caller::CallSite;
pub use clock::{Clock, MockClock, SystemClock};
pub use config::LoggerConfig;
pub use context::{from_context, with_logger, Context};
pub use error::{LoggerError, Result};
pub use fields::{
    FieldValue, Fields, FIELD_CALLER, FIELD_REPLAY, FIELD_ROLLUP, FIELD_SEQUENCE_NUMBER,
};
pub use log_entry::LogRecord;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use message::LogMessage;
pub use minimal::{MinimalLogger, NilLogger};
pub use replay::ReplayLogger;
pub use rollup::RollupLogger;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
