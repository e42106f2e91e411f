//! Basic logger usage example
//!
//! Demonstrates synchronous logging to the console and the level filter.
//!
//! Run with: cargo run --example basic_usage

use zerolog::prelude::*;
use zerolog::{critical, debug, error, info, trace, warn};

fn main() -> Result<()> {
    println!("=== zerolog - Basic Usage Example ===\n");

    // Synchronous: every call writes before it returns
    let logger = Logger::builder()
        .name("basic")
        .sink(ConsoleSink::with_colors(true))
        .min_level(LogLevel::Trace)
        .build()?;

    println!("1. Logging at different levels:");
    trace!(logger, "This is a trace message");
    debug!(logger, "This is a debug message");
    info!(logger, "This is an info message");
    warn!(logger, "This is a warning message");
    error!(logger, "This is an error message");
    critical!(logger, "This is a critical message");

    println!("\n2. Logging with different minimum levels:");
    logger.set_min_level(LogLevel::Info);
    println!("   Minimum level set to INFO - trace and debug won't show:");
    trace!(logger, "Trace message (hidden)");
    debug!(logger, "Debug message (hidden)");
    info!(logger, "Info message (visible)");
    warn!(logger, "Warning message (visible)");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
