//! Asynchronous logging example
//!
//! Several threads log through one shared async logger; a single consumer
//! thread writes everything to stdout.
//!
//! Run with: cargo run --example async_logging

use std::sync::Arc;
use std::thread;
use zerolog::info;
use zerolog::prelude::*;

fn main() -> Result<()> {
    println!("=== zerolog - Async Logging Example ===\n");

    let logger = zerolog::stdout_logger_mt("demo")?;

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..5 {
                    info!(logger, "worker {} processed item {}", worker, i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
    logger.flush();

    let metrics = logger.metrics();
    println!("\nDelivered records:  {}", metrics.total_logged());
    println!("Batch flushes:      {}", metrics.batch_flushes());
    println!("Queue-full events:  {}", metrics.queue_full_events());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
