//! Consumer thread draining the shared queue into the sink

use super::error::{LoggerError, Result};
use super::logger::LoggerShared;
use super::ring_buffer::QueueConsumer;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of the consumer thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConsumerState {
    /// Dequeue and write; idle-wait on the wake-up signal when empty
    Running = 0,
    /// Shutdown requested: write everything left, then stop
    Draining = 1,
    /// Thread has exited (or was never started)
    Stopped = 2,
}

impl ConsumerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ConsumerState::Running,
            1 => ConsumerState::Draining,
            _ => ConsumerState::Stopped,
        }
    }
}

pub(crate) struct ConsumerLoop {
    consumer: QueueConsumer,
    shared: Arc<LoggerShared>,
    buf: Vec<u8>,
}

impl ConsumerLoop {
    /// Start the consumer thread. The thread hands its [`QueueConsumer`]
    /// back through the join handle so leftovers can still be drained.
    pub(crate) fn spawn(
        name: String,
        consumer: QueueConsumer,
        shared: Arc<LoggerShared>,
    ) -> Result<JoinHandle<QueueConsumer>> {
        let buf = vec![0u8; consumer.queue().entry_size()];
        let consumer_loop = Self {
            consumer,
            shared,
            buf,
        };

        consumer_loop.shared.set_consumer_state(ConsumerState::Running);
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || consumer_loop.run())
            .map_err(|e| LoggerError::thread_spawn(name, e))
    }

    fn run(mut self) -> QueueConsumer {
        let mut state = ConsumerState::Running;
        loop {
            match state {
                ConsumerState::Running => {
                    if !self.shared.is_running() {
                        state = ConsumerState::Draining;
                        self.shared.set_consumer_state(state);
                        continue;
                    }
                    if !self.write_next() {
                        self.shared.idle_wait();
                    }
                }
                ConsumerState::Draining => {
                    while self.write_next() {}
                    state = ConsumerState::Stopped;
                }
                ConsumerState::Stopped => break,
            }
        }

        self.shared.flush_sink();
        self.shared.set_consumer_state(ConsumerState::Stopped);
        self.consumer
    }

    /// Move one record from the queue to the sink
    fn write_next(&mut self) -> bool {
        match self.consumer.try_dequeue(&mut self.buf) {
            Some(len) => {
                self.shared.deliver(&self.buf[..len]);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        for state in [
            ConsumerState::Running,
            ConsumerState::Draining,
            ConsumerState::Stopped,
        ] {
            assert_eq!(ConsumerState::from_u8(state as u8), state);
        }
    }
}
