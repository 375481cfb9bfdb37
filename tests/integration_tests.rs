//! Integration tests for the logging facade
//!
//! These tests verify:
//! - Caller attribution, direct and through helper functions
//! - Composition of field views, replay and rollup
//! - Threshold filtering versus replay journaling
//! - Context propagation
//! - Configured sinks end to end

use rust_log_facade::core::{FIELD_CALLER, FIELD_REPLAY, FIELD_ROLLUP, FIELD_SEQUENCE_NUMBER};
use rust_log_facade::prelude::*;
use rust_log_facade::sinks::SharedBuffer;
use rust_log_facade::{fields, info, msg};
use std::time::Duration;

fn memory_logger(level: LogLevel) -> (Logger, MemorySink, MockClock) {
    let sink = MemorySink::new();
    let clock = MockClock::new();
    let logger = Logger::builder()
        .min_level(level)
        .sink(sink.clone())
        .clock(clock.clone())
        .exit_hook(|| {})
        .build();
    (logger, sink, clock)
}

fn caller_of(record: &LogRecord) -> String {
    record.caller().unwrap_or_default().to_string()
}

// ============================================================================
// Caller attribution
// ============================================================================

#[test]
fn test_caller_direct() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    logger.info("direct");
    let line = line!() - 1;

    assert_eq!(
        caller_of(&sink.records()[0]),
        format!("tests/integration_tests.rs:{}", line)
    );
}

#[test]
fn test_caller_through_field_views() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    let scoped = logger
        .with_fields(fields! { "a" => 1 })
        .with_fields(fields! { "b" => 2 });
    scoped.warning("nested");
    let line = line!() - 1;

    let record = &sink.records()[0];
    assert_eq!(caller_of(record), format!("tests/integration_tests.rs:{}", line));
    assert_eq!(record.fields.get("a"), Some(&FieldValue::Int(1)));
    assert_eq!(record.fields.get("b"), Some(&FieldValue::Int(2)));
}

#[inline(never)]
fn log_via_helper(logger: &Logger, message: &str) {
    if let Ok(indirect) = logger.with_indirect_caller(1) {
        indirect.info(message.to_string());
    }
}

#[inline(never)]
fn log_via_two_helpers(logger: &Logger, message: &str) {
    log_via_helper_twice_removed(logger, message);
}

#[inline(never)]
fn log_via_helper_twice_removed(logger: &Logger, message: &str) {
    if let Ok(indirect) = logger.with_indirect_caller(2) {
        indirect.info(message.to_string());
    }
}

#[test]
fn test_caller_indirect() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    log_via_helper(&logger, "one up");
    let line = line!() - 1;

    let caller = caller_of(&sink.records()[0]);
    assert!(caller.ends_with(&format!("integration_tests.rs:{}", line)), "{}", caller);
}

#[test]
fn test_caller_indirect_two_frames() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    log_via_two_helpers(&logger, "two up");
    let line = line!() - 1;

    let caller = caller_of(&sink.records()[0]);
    assert!(caller.ends_with(&format!("integration_tests.rs:{}", line)), "{}", caller);
}

#[test]
fn test_indirect_caller_must_be_positive() {
    let (logger, _sink, _clock) = memory_logger(LogLevel::Debug);
    match logger.with_indirect_caller(0) {
        Err(LoggerError::InvalidArgument { argument, .. }) => assert_eq!(argument, "frames"),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_caller_through_replay_and_rollup() {
    let (base, sink, clock) = memory_logger(LogLevel::Debug);
    let rollup = RollupLogger::with_clock(base, Duration::from_secs(1), clock).unwrap().into_logger();
    let replay = ReplayLogger::new(rollup, &[LogLevel::Debug]);

    replay.debug("through everything");
    let line = line!() - 1;
    replay.replay(LogLevel::Error);

    let records = sink.records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(caller_of(record), format!("tests/integration_tests.rs:{}", line));
    }
}

// ============================================================================
// Fields and sequence numbers
// ============================================================================

#[test]
fn test_field_merge_precedence() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    let scoped = logger.with_fields(fields! { "a" => 1, "keep" => "yes" });
    scoped.info_with_fields(fields! { "a" => 2 }, "x");

    let record = &sink.records()[0];
    assert_eq!(record.fields.get("a"), Some(&FieldValue::Int(2)));
    assert_eq!(record.fields.get("keep"), Some(&FieldValue::from("yes")));
}

#[test]
fn test_reserved_fields_always_present() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    logger.info_with_fields(
        fields! { FIELD_SEQUENCE_NUMBER => "forged", FIELD_CALLER => "forged" },
        "x",
    );

    let record = &sink.records()[0];
    assert_eq!(record.sequence_number(), Some(1));
    assert_ne!(record.caller(), Some("forged"));
    assert!(!record.fields.contains_key(FIELD_REPLAY));
    assert!(!record.fields.contains_key(FIELD_ROLLUP));
}

#[test]
fn test_views_share_sequence() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    let a = logger.with_fields(fields! { "view" => "a" });
    let b = logger.with_fields(fields! { "view" => "b" });
    a.info("1");
    b.info("2");
    logger.info("3");

    let sequence: Vec<_> = sink.records().iter().filter_map(|r| r.sequence_number()).collect();
    assert_eq!(sequence, vec![1, 2, 3]);
}

#[test]
fn test_message_arguments_rendered_at_sink() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    logger.info(msg!("{} of {} ({{literal}})", 3, 5));
    info!(logger, "user {} from {}", "bob", "10.0.0.1");

    assert_eq!(
        sink.messages(),
        vec!["3 of 5 ({literal})", "user bob from 10.0.0.1"]
    );
}

#[test]
fn test_time_fields_normalized_at_sink() {
    let (logger, sink, clock) = memory_logger(LogLevel::Debug);
    let now = clock.now();
    logger.info_with_fields(fields! { "at" => now }, "x");

    let value = sink.records()[0].fields.get("at").cloned();
    let rendered = value.as_ref().and_then(FieldValue::as_str).unwrap_or_default().to_string();
    let parsed = rust_log_facade::core::timestamp::parse_field_time(&rendered).unwrap();
    assert_eq!(parsed.timestamp_millis(), now.timestamp_millis());
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn test_threshold_filtered_message_never_replayed() {
    let (base, sink, _clock) = memory_logger(LogLevel::Info);
    let logger = ReplayLogger::new(base, &[LogLevel::Debug]);

    logger.debug("x");
    logger.replay(LogLevel::Error);

    assert!(sink.is_empty());
    assert_eq!(logger.journaled_len(), 0);
}

#[test]
fn test_replay_escalation_only() {
    let (base, sink, _clock) = memory_logger(LogLevel::Debug);
    let logger = ReplayLogger::new(base, &[LogLevel::Debug, LogLevel::Info]);
    logger.debug("a");
    logger.info("b");

    logger.replay(LogLevel::Warning);
    assert_eq!(sink.len(), 4);
    logger.replay(LogLevel::Info);
    assert_eq!(sink.len(), 4);
    logger.replay(LogLevel::Error);
    assert_eq!(sink.len(), 6);

    let replayed: Vec<_> = sink
        .records()
        .into_iter()
        .skip(2)
        .map(|r| (r.level, r.fields.get(FIELD_REPLAY).cloned()))
        .collect();
    assert_eq!(
        replayed,
        vec![
            (LogLevel::Warning, Some(FieldValue::from("debug"))),
            (LogLevel::Warning, Some(FieldValue::from("info"))),
            (LogLevel::Error, Some(FieldValue::from("debug"))),
            (LogLevel::Error, Some(FieldValue::from("info"))),
        ]
    );
}

#[test]
fn test_replay_on_error_pattern() {
    let (base, sink, _clock) = memory_logger(LogLevel::Debug);
    let request = ReplayLogger::new(base, &[LogLevel::Debug]).with_fields(fields! { "request" => 7 });

    request.debug("parsing body");
    request.debug("querying store");
    request.error("store unavailable");
    request.replay(LogLevel::Error);

    let records = sink.records();
    assert_eq!(records.len(), 5);
    assert_eq!(records[3].message, "parsing body");
    assert_eq!(records[3].level, LogLevel::Error);
    assert_eq!(records[3].fields.get("request"), Some(&FieldValue::Int(7)));
    assert!(records[3].sequence_number() > records[2].sequence_number());
}

// ============================================================================
// Rollup
// ============================================================================

#[test]
fn test_rollup_coalescing() {
    let (base, sink, clock) = memory_logger(LogLevel::Debug);
    let logger = RollupLogger::with_clock(base, Duration::from_secs(1), clock.clone()).unwrap().into_logger();

    for _ in 0..3 {
        logger.info("a");
    }
    clock.advance(Duration::from_secs(1));
    logger.sync().unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].fields.get(FIELD_ROLLUP), Some(&FieldValue::UInt(2)));
}

#[test]
fn test_rollup_distinctness() {
    let (base, sink, clock) = memory_logger(LogLevel::Debug);
    let logger = RollupLogger::with_clock(base, Duration::from_secs(1), clock).unwrap().into_logger();

    for _ in 0..10 {
        logger.info("a");
        logger.info("b");
        logger.info("c");
    }
    assert_eq!(sink.len(), 3);
}

#[test]
fn test_replay_over_rollup_replays_summaries_too() {
    let (base, sink, clock) = memory_logger(LogLevel::Debug);
    let replay = ReplayLogger::new(base, &[LogLevel::Debug]);
    let logger =
        RollupLogger::with_clock(replay.logger().clone(), Duration::from_secs(1), clock).unwrap().into_logger();

    logger.debug("noisy");
    logger.debug("noisy");
    logger.sync().unwrap();
    assert_eq!(sink.len(), 2);
    assert_eq!(replay.journaled_len(), 2);

    replay.replay(LogLevel::Warning);
    let records = sink.records();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].fields.get(FIELD_ROLLUP), Some(&FieldValue::UInt(1)));
    assert_eq!(records[3].fields.get(FIELD_REPLAY), Some(&FieldValue::from("debug")));
}

// ============================================================================
// Context and configuration
// ============================================================================

#[test]
fn test_context_propagation() {
    let (logger, sink, _clock) = memory_logger(LogLevel::Debug);
    let ctx = with_logger(&Context::new(), logger.with_fields(fields! { "request" => "r1" }));

    fn handler(ctx: &Context) {
        from_context(ctx).info("handled");
    }
    handler(&ctx);
    handler(&Context::new());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields.get("request"), Some(&FieldValue::from("r1")));
}

#[test]
fn test_configured_json_sink() {
    let config = LoggerConfig::from_json_str(
        r#"{"log_level": "debug", "log_encoding": "json", "log_initial_fields": {"service": "api"}}"#,
    )
    .unwrap();

    let buffer = SharedBuffer::new();
    let logger = config
        .builder()
        .unwrap()
        .sink(JsonSink::with_writer(buffer.clone()))
        .exit_hook(|| {})
        .build();
    logger.debug_with_fields(fields! { "n" => 1 }, "hello");
    logger.sync().unwrap();

    let parsed: serde_json::Value = serde_json::from_str(buffer.lines()[0].as_str()).unwrap();
    assert_eq!(parsed["message"], "hello");
    assert_eq!(parsed["level"], "debug");
    assert_eq!(parsed["service"], "api");
    assert_eq!(parsed["n"], 1);
    assert_eq!(parsed[FIELD_SEQUENCE_NUMBER], 1);
    assert!(parsed[FIELD_CALLER].as_str().unwrap().starts_with("tests/integration_tests.rs:"));
}

#[test]
fn test_console_sink_end_to_end() {
    let buffer = SharedBuffer::new();
    let logger = Logger::builder()
        .sink(
            ConsoleSink::with_writer(buffer.clone())
                .with_colors(false)
                .with_blacklist(["caller"]),
        )
        .clock(MockClock::at(
            chrono::DateTime::from_timestamp(1_503_939_881, 0).unwrap(),
        ))
        .build();

    logger.warning_with_fields(fields! { "disk" => "/dev/sda" }, "low space");
    assert_eq!(
        buffer.contents(),
        "[W] [2017/08/28 17:04:41.000] low space disk=/dev/sda sequenceNumber=1\n"
    );
}

// ============================================================================
// Sink failures
// ============================================================================

struct BrokenSink;

impl Sink for BrokenSink {
    fn log(
        &self,
        _timestamp: chrono::DateTime<chrono::Utc>,
        _level: LogLevel,
        _fields: &Fields,
        _message: &str,
    ) -> Result<()> {
        Err(LoggerError::other("cannot render"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[test]
fn test_sink_failure_surfaces_through_decorators() {
    let base = Logger::builder().sink(BrokenSink).exit_hook(|| {}).build();
    let replay = ReplayLogger::new(base, &[LogLevel::Info]);

    assert!(replay.log_with_fields(LogLevel::Info, Fields::new(), "x").is_err());
    assert!(replay.try_replay(LogLevel::Error).is_err());

    let err = replay.sync().unwrap_err();
    assert!(matches!(err, LoggerError::SinkWrite { ref sink, .. } if sink == "broken"));
}

#[test]
fn test_fatal_runs_hook_even_when_write_fails() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let exited = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&exited);
    let logger = Logger::builder()
        .sink(BrokenSink)
        .exit_hook(move || flag.store(true, Ordering::SeqCst))
        .build();
    let logger = RollupLogger::new(logger, Duration::from_secs(60)).unwrap().into_logger();

    logger.fatal("going down");
    assert!(exited.load(Ordering::SeqCst));
}
