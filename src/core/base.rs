//! Base adapter: the layer directly in front of a sink
//!
//! Applies the severity threshold, assigns sequence numbers, merges scoped
//! fields under call-site fields, stamps the record with the clock's UTC
//! time and hands it to the sink. Fatal messages run the exit hook once
//! the sink call has returned.

use super::{
    clock::{Clock, SystemClock},
    error::{LoggerError, Result},
    fields::{Fields, FIELD_SEQUENCE_NUMBER},
    log_level::LogLevel,
    message::LogMessage,
    minimal::MinimalLogger,
    sink::Sink,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Invoked after a fatal message has been written
pub type ExitHook = Arc<dyn Fn() + Send + Sync>;

/// Terminates the process with status 1
pub fn process_exit_hook() -> ExitHook {
    Arc::new(|| std::process::exit(1))
}

struct BaseCore {
    sink: Arc<dyn Sink>,
    level: LogLevel,
    clock: Arc<dyn Clock>,
    exit_hook: ExitHook,
    sequence: AtomicU64,
    /// Last write failure, reported by the next `sync`
    deferred_error: Mutex<Option<LoggerError>>,
}

/// Shared by every field-scoped view derived from it
pub struct BaseLogger {
    core: Arc<BaseCore>,
    fields: Fields,
}

impl BaseLogger {
    /// A base adapter on the system clock whose fatal hook exits the process
    pub fn new(sink: Arc<dyn Sink>, level: LogLevel, initial_fields: Fields) -> Self {
        Self::with_parts(
            sink,
            level,
            initial_fields,
            Arc::new(SystemClock),
            process_exit_hook(),
        )
    }

    pub fn with_parts(
        sink: Arc<dyn Sink>,
        level: LogLevel,
        initial_fields: Fields,
        clock: Arc<dyn Clock>,
        exit_hook: ExitHook,
    ) -> Self {
        Self {
            core: Arc::new(BaseCore {
                sink,
                level,
                clock,
                exit_hook,
                sequence: AtomicU64::new(0),
                deferred_error: Mutex::new(None),
            }),
            fields: initial_fields.normalize_time_values(),
        }
    }

    /// Configured severity threshold
    pub fn level(&self) -> LogLevel {
        self.core.level
    }

    /// Number of messages accepted so far, across all views
    pub fn sequence(&self) -> u64 {
        self.core.sequence.load(Ordering::SeqCst)
    }
}

impl MinimalLogger for BaseLogger {
    fn with_fields(self: Arc<Self>, fields: Fields) -> Arc<dyn MinimalLogger> {
        if fields.is_empty() {
            return self;
        }

        Arc::new(BaseLogger {
            core: Arc::clone(&self.core),
            fields: self.fields.concat(&fields.normalize_time_values()),
        })
    }

    fn log_with_fields(
        &self,
        level: LogLevel,
        fields: Fields,
        message: LogMessage,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let core = &self.core;
        let sequence = core.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let mut fields = fields.normalize_time_values();
        fields.insert(FIELD_SEQUENCE_NUMBER, sequence);
        let merged = self.fields.concat(&fields);

        let result = core
            .sink
            .log(core.clock.now(), level, &merged, &message.render());

        if let Err(ref err) = result {
            *core.deferred_error.lock() =
                Some(LoggerError::sink_write(core.sink.name(), err.to_string()));
        }

        if level == LogLevel::Fatal {
            (core.exit_hook)();
        }

        result
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level.passes(self.core.level)
    }

    /// Flushes the sink. An earlier write failure takes precedence over a
    /// flush failure.
    fn sync(&self) -> Result<()> {
        let flushed = self.core.sink.flush();
        match self.core.deferred_error.lock().take() {
            Some(err) => Err(err),
            None => flushed,
        }
    }
}
