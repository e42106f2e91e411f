//! Core logger types and traits

pub mod arena;
pub mod backoff;
pub mod batch;
pub mod config;
pub mod consumer;
pub mod error;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod ring_buffer;
pub mod sink;
mod thread_context;

pub use arena::SlotArena;
pub use backoff::{Backoff, BACKOFF_MAX, BACKOFF_SLEEP};
pub use batch::ThreadLocalBatch;
pub use config::LoggerConfig;
pub use consumer::ConsumerState;
pub use error::{LoggerError, Result};
pub use log_level::{LogLevel, STATIC_MIN_LEVEL};
pub use logger::{
    null_logger_mt, stdout_logger_mt, Logger, LoggerBuilder, DEFAULT_IDLE_WAIT,
    DEFAULT_QUEUE_CAPACITY,
};
pub use metrics::LoggerMetrics;
pub use record::{RecordView, BATCH_SIZE, CACHE_LINE_SIZE, ENTRY_SIZE, PAYLOAD_CAPACITY};
pub use ring_buffer::{MpscRingBuffer, QueueConsumer};
pub use sink::Sink;
