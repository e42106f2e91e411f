//! File logging example
//!
//! Logs to an exclusively locked file and prints it back.
//!
//! Run with: cargo run --example file_logging

use zerolog::prelude::*;
use zerolog::{error, info};

fn main() -> Result<()> {
    println!("=== zerolog - File Logging Example ===\n");

    let path = std::env::temp_dir().join("zerolog_demo.log");
    let _ = std::fs::remove_file(&path);

    {
        let config = LoggerConfig {
            name: "file-demo".to_string(),
            queue_capacity: 1024,
            ..LoggerConfig::default()
        };
        let logger = Logger::from_config(&config, FileSink::with_lock(&path)?)?;

        for i in 0..10 {
            info!(logger, "request {} served", i);
        }
        error!(logger, "upstream timed out after {} ms", 1500);
        // Dropping the logger drains the queue and flushes the file.
    }

    println!("Contents of {}:", path.display());
    print!("{}", std::fs::read_to_string(&path)?);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
