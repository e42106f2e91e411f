//! Error types for the logger system
//!
//! Only construction can fail. Once a [`Logger`](super::Logger) exists,
//! logging never returns an error: backpressure shows up as latency and sink
//! failures stay inside the sink.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Failed to parse logger configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Slot arena could not be allocated with the required alignment
    #[error("Failed to allocate {bytes} byte slot arena aligned to {align} bytes")]
    ArenaAllocation { bytes: usize, align: usize },

    /// Consumer thread could not be started
    #[error("Failed to spawn consumer thread '{name}'")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an arena allocation error
    pub fn arena_allocation(bytes: usize, align: usize) -> Self {
        LoggerError::ArenaAllocation { bytes, align }
    }

    /// Create a thread spawn error
    pub fn thread_spawn(name: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::ThreadSpawn {
            name: name.into(),
            source,
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }
}
