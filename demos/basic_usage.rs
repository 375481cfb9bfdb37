//! Basic logger usage example
//!
//! Demonstrates console and JSON output, scoped fields and level filtering.
//!
//! Run with: cargo run --example basic_usage

use rust_log_facade::prelude::*;
use rust_log_facade::{fields, info, warning};

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .min_level(LogLevel::Debug)
        .sink(ConsoleSink::new())
        .fields(fields! { "service" => "demo" })
        .build();

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");

    println!("\n2. Scoped fields and formatted arguments:");
    let request = logger.with_fields(fields! { "request_id" => "abc123" });
    info!(request, "Handling {} {}", "GET", "/health");
    warning!(request, fields! { "elapsed_ms" => 1250 }; "Slow response from {}", "store");

    println!("\n3. Configuration with JSON output and a higher threshold:");
    let config = LoggerConfig::from_json_str(r#"{"log_level": "warning", "log_encoding": "json"}"#)?;
    let json_logger = config.build()?;
    json_logger.info("Info message (hidden)");
    json_logger.warning("Warning message (visible)");

    logger.sync()?;
    json_logger.sync()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
