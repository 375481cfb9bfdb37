//! Rollup example
//!
//! A flapping dependency produces the same warning many times a second.
//! The rollup logger prints the first one and a summary per window.
//!
//! Run with: cargo run --example rollup_noise

use rust_log_facade::prelude::*;
use rust_log_facade::{fields, warning};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Rollup Example ===\n");

    let base = Logger::builder().sink(ConsoleSink::new()).build();
    let logger = RollupLogger::new(base, Duration::from_millis(500))?.into_logger();

    println!("1. 50 identical warnings over one second:");
    for _ in 0..50 {
        warning!(logger, fields! { "upstream" => "billing" }; "Connection refused");
        thread::sleep(Duration::from_millis(20));
    }

    println!("\n2. Distinct messages are never merged:");
    for _ in 0..3 {
        for shard in ["eu", "us", "ap"] {
            logger.warning(format!("Shard {} lagging", shard));
        }
    }

    println!("\n3. Arguments are not part of the key; one line per window:");
    for attempt in 1..=5 {
        warning!(logger, "Retry attempt {}", attempt);
    }

    println!("\n4. Sync flushes the open windows:");
    logger.sync()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
