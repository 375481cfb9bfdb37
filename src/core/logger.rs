//! The logger handle and its convenience surface

use super::{
    base::{process_exit_hook, BaseLogger, ExitHook},
    caller,
    clock::{Clock, SystemClock},
    error::{LoggerError, Result},
    fields::{Fields, FIELD_CALLER},
    log_level::LogLevel,
    message::LogMessage,
    minimal::{MinimalLogger, NilLogger},
    sink::Sink,
};
use std::fmt;
use std::sync::Arc;

/// Cheaply clonable handle over any [`MinimalLogger`].
///
/// Every entry point attaches the `caller` field before handing the
/// message down the chain. Entry points are `#[track_caller]`, so the
/// location is the line that called the logger, or a frame further up
/// when built with [`Logger::with_indirect_caller`].
#[derive(Clone)]
pub struct Logger {
    inner: Arc<dyn MinimalLogger>,
    depth: usize,
}

impl Logger {
    pub fn from_minimal<M: MinimalLogger + 'static>(logger: M) -> Self {
        Self::from_arc(Arc::new(logger))
    }

    pub fn from_arc(inner: Arc<dyn MinimalLogger>) -> Self {
        Self { inner, depth: 0 }
    }

    /// A logger that accepts everything and emits nothing
    pub fn nil() -> Self {
        Self::from_minimal(NilLogger)
    }

    /// Create a builder for a sink-backed logger
    ///
    /// # Example
    /// ```
    /// use rust_log_facade::prelude::*;
    ///
    /// let sink = MemorySink::new();
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .sink(sink.clone())
    ///     .build();
    ///
    /// logger.debug("hello");
    /// assert_eq!(sink.len(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// A view that adds `fields` to every message.
    ///
    /// An empty set returns a handle to the same underlying logger.
    #[must_use]
    pub fn with_fields(&self, fields: Fields) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }

        Logger {
            inner: Arc::clone(&self.inner).with_fields(fields),
            depth: self.depth,
        }
    }

    /// Attribute messages `frames` call frames further up the stack.
    ///
    /// Intended for logging helpers: a helper that calls the logger
    /// directly uses `with_indirect_caller(1)` so records name the
    /// helper's caller. Depths accumulate across repeated calls.
    pub fn with_indirect_caller(&self, frames: usize) -> Result<Logger> {
        if frames == 0 {
            return Err(LoggerError::invalid_argument(
                "frames",
                "indirect caller frame count must be greater than zero",
            ));
        }

        Ok(Logger {
            inner: Arc::clone(&self.inner),
            depth: self.depth + frames,
        })
    }

    /// Whether a message at `level` would reach a sink
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    /// True when both handles share the same underlying logger and depth
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&a.inner), Arc::as_ptr(&b.inner)) && a.depth == b.depth
    }

    /// Canonical entry point; every convenience method delegates here.
    #[track_caller]
    pub fn log_with_fields(
        &self,
        level: LogLevel,
        fields: Fields,
        message: impl Into<LogMessage>,
    ) -> Result<()> {
        let mut fields = fields;
        fields.insert(FIELD_CALLER, caller::capture(self.depth).to_field());
        self.forward(level, fields, message.into())
    }

    /// Same caller depth over a different chain
    pub(crate) fn with_inner(&self, inner: Arc<dyn MinimalLogger>) -> Logger {
        Logger {
            inner,
            depth: self.depth,
        }
    }

    /// Pass an already attributed message down the chain
    pub(crate) fn forward(&self, level: LogLevel, fields: Fields, message: LogMessage) -> Result<()> {
        self.inner.log_with_fields(level, fields, message)
    }

    pub fn sync(&self) -> Result<()> {
        self.inner.sync()
    }

    // Convenience methods discard the write result; the base adapter holds
    // the failure for the next `sync`.

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(level, Fields::new(), message);
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Debug, Fields::new(), message);
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Info, Fields::new(), message);
    }

    #[track_caller]
    #[inline]
    pub fn warning(&self, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Warning, Fields::new(), message);
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Error, Fields::new(), message);
    }

    #[track_caller]
    #[inline]
    pub fn fatal(&self, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Fatal, Fields::new(), message);
    }

    #[track_caller]
    pub fn debug_with_fields(&self, fields: Fields, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Debug, fields, message);
    }

    #[track_caller]
    pub fn info_with_fields(&self, fields: Fields, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Info, fields, message);
    }

    #[track_caller]
    pub fn warning_with_fields(&self, fields: Fields, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Warning, fields, message);
    }

    #[track_caller]
    pub fn error_with_fields(&self, fields: Fields, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Error, fields, message);
    }

    #[track_caller]
    pub fn fatal_with_fields(&self, fields: Fields, message: impl Into<LogMessage>) {
        let _ = self.log_with_fields(LogLevel::Fatal, fields, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("inner", &Arc::as_ptr(&self.inner))
            .field("depth", &self.depth)
            .finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::nil()
    }
}

/// Builder for a sink-backed [`Logger`]
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .sink(ConsoleSink::new())
///     .fields(Fields::new().with_field("service", "api"))
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    sink: Option<Arc<dyn Sink>>,
    fields: Fields,
    clock: Arc<dyn Clock>,
    exit_hook: ExitHook,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            sink: None,
            fields: Fields::new(),
            clock: Arc::new(SystemClock),
            exit_hook: process_exit_hook(),
        }
    }

    /// Set the severity threshold
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the sink records are written to
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Set a shared sink
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Fields attached to every record
    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Replace the time source
    #[must_use = "builder methods return a new value"]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the hook run after a fatal message (default: exit with status 1)
    #[must_use = "builder methods return a new value"]
    pub fn exit_hook<F: Fn() + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.exit_hook = Arc::new(hook);
        self
    }

    /// Build the Logger
    ///
    /// Without a sink, records go to a [`ConsoleSink`](crate::sinks::ConsoleSink) on stderr.
    pub fn build(self) -> Logger {
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(crate::sinks::ConsoleSink::new()));

        Logger::from_minimal(BaseLogger::with_parts(
            sink,
            self.min_level,
            self.fields,
            self.clock,
            self.exit_hook,
        ))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::MockClock;
    use crate::core::fields::FieldValue;
    use crate::sinks::MemorySink;

    fn test_logger(level: LogLevel) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .min_level(level)
            .sink(sink.clone())
            .clock(MockClock::new())
            .exit_hook(|| {})
            .build();
        (logger, sink)
    }

    #[test]
    fn test_convenience_levels() {
        let (logger, sink) = test_logger(LogLevel::Debug);
        logger.debug("d");
        logger.info("i");
        logger.warning("w");
        logger.error("e");
        logger.fatal("f");

        let levels: Vec<_> = sink.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Debug,
                LogLevel::Info,
                LogLevel::Warning,
                LogLevel::Error,
                LogLevel::Fatal
            ]
        );
    }

    #[test]
    fn test_convenience_with_fields() {
        let (logger, sink) = test_logger(LogLevel::Debug);
        let fields = Fields::new().with_field("k", "v");
        logger.debug_with_fields(fields.clone(), "d");
        logger.info_with_fields(fields.clone(), "i");
        logger.warning_with_fields(fields.clone(), "w");
        logger.error_with_fields(fields.clone(), "e");
        logger.fatal_with_fields(fields, "f");

        for record in sink.records() {
            assert_eq!(record.fields.get("k"), Some(&FieldValue::from("v")));
        }
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_caller_is_call_site() {
        let (logger, sink) = test_logger(LogLevel::Debug);
        logger.info("here");
        let line = line!() - 1;

        assert_eq!(
            sink.records()[0].caller(),
            Some(format!("core/logger.rs:{}", line).as_str())
        );
    }

    #[test]
    fn test_with_empty_fields_returns_same_logger() {
        let (logger, _sink) = test_logger(LogLevel::Debug);
        let same = logger.with_fields(Fields::new());
        assert!(Logger::ptr_eq(&logger, &same));

        let scoped = logger.with_fields(Fields::new().with_field("a", 1));
        assert!(!Logger::ptr_eq(&logger, &scoped));
    }

    #[test]
    fn test_indirect_caller_rejects_zero() {
        let (logger, _sink) = test_logger(LogLevel::Debug);
        let err = logger.with_indirect_caller(0).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidArgument { .. }));
        assert!(logger.with_indirect_caller(1).is_ok());
    }

    #[test]
    fn test_enabled_follows_threshold() {
        let (logger, _sink) = test_logger(LogLevel::Warning);
        assert!(logger.enabled(LogLevel::Error));
        assert!(logger.enabled(LogLevel::Warning));
        assert!(!logger.enabled(LogLevel::Info));
    }

    #[test]
    fn test_nil_logger() {
        let logger = Logger::nil();
        logger.info("dropped");
        assert!(logger.log_with_fields(LogLevel::Error, Fields::new(), "x").is_ok());
        assert!(logger.sync().is_ok());
        assert!(!logger.enabled(LogLevel::Fatal));
    }

    #[test]
    fn test_builder_default_threshold_is_info() {
        let sink = MemorySink::new();
        let logger = LoggerBuilder::default().sink(sink.clone()).build();
        logger.debug("hidden");
        logger.info("shown");
        assert_eq!(sink.len(), 1);
    }
}
