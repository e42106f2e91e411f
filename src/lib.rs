//! # zerolog
//!
//! Low-latency in-process logging. Producer threads format records into
//! fixed-size slots, stage them in a per-thread batch, and push full batches
//! into a lock-free bounded MPSC ring buffer. A single consumer thread drains
//! the buffer into a [`Sink`].
//!
//! ## Features
//!
//! - **Lock-free hot path**: one CAS per record on the shared queue, no
//!   allocation after the first call on a thread
//! - **Backpressure, not loss**: producers back off while the queue is full
//! - **Sync mode**: the same API writing straight to the sink
//! - **Compile-time filtering**: `static-min-*` features remove levels
//!
//! ```
//! use zerolog::prelude::*;
//!
//! let logger = zerolog::null_logger_mt("app").unwrap();
//! zerolog::info!(logger, "ready in {} ms", 12);
//! logger.flush();
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ConsumerState, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, Result, Sink,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, NullSink};
}

pub use crate::core::{
    null_logger_mt, stdout_logger_mt, ConsumerState, LogLevel, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, MpscRingBuffer, QueueConsumer, RecordView,
    Result, Sink, ThreadLocalBatch, BATCH_SIZE, ENTRY_SIZE, PAYLOAD_CAPACITY,
};
pub use sinks::{ConsoleSink, FileSink, MemorySink, NullSink};
