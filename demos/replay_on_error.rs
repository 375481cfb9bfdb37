//! Replay example
//!
//! Debug messages are journaled quietly; when a request fails they are
//! replayed at error level so the failure arrives with its history.
//!
//! Run with: cargo run --example replay_on_error

use rust_log_facade::prelude::*;
use rust_log_facade::{debug, fields};

fn handle(logger: &ReplayLogger, id: u32, fail: bool) {
    let request = logger.with_fields(fields! { "request" => id });
    debug!(request, "Parsing request body");
    debug!(request, "Querying store for {} rows", 20);

    if fail {
        request.error("Store unavailable");
        request.replay(LogLevel::Error);
    } else {
        request.info("Request served");
    }
}

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Replay Example ===\n");

    let base = Logger::builder().min_level(LogLevel::Debug).sink(ConsoleSink::new()).build();

    println!("1. A successful request logs its debug lines once:");
    let logger = ReplayLogger::new(base.clone(), &[LogLevel::Debug]);
    handle(&logger, 1, false);

    println!("\n2. A failing request replays them at error level:");
    let logger = ReplayLogger::new(base.clone(), &[LogLevel::Debug]);
    handle(&logger, 2, true);

    println!("\n3. After a replay, new debug lines are promoted immediately:");
    logger.debug("Cleanup after failure");
    println!("   journaled messages: {}", logger.journaled_len());

    base.sync()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
