//! Sink implementations

pub mod console;
pub mod file;
pub mod memory;
pub mod null;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use null::NullSink;

pub use crate::core::Sink;
