//! Producer backoff while the queue is full

use std::thread;
use std::time::Duration;

/// Yield rounds before switching to timed sleeps
pub const BACKOFF_MAX: u32 = 4;

/// Sleep used once the yield rounds are exhausted
pub const BACKOFF_SLEEP: Duration = Duration::from_nanos(100);

/// Escalating retry delay: `2^step` yields for the first [`BACKOFF_MAX`]
/// steps, then a short sleep per retry. There is no upper bound on the
/// number of retries.
#[derive(Debug, Default)]
pub struct Backoff {
    step: u32,
}

impl Backoff {
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    /// Wait once before the next retry
    pub fn snooze(&mut self) {
        if self.step < BACKOFF_MAX {
            for _ in 0..(1u32 << self.step) {
                thread::yield_now();
            }
            self.step += 1;
        } else {
            thread::sleep(BACKOFF_SLEEP);
        }
    }

    /// True once the backoff has fallen back to sleeping
    pub fn is_sleeping(&self) -> bool {
        self.step >= BACKOFF_MAX
    }

    pub fn reset(&mut self) {
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalates_to_sleep() {
        let mut backoff = Backoff::new();
        for _ in 0..BACKOFF_MAX {
            assert!(!backoff.is_sleeping());
            backoff.snooze();
        }
        assert!(backoff.is_sleeping());

        backoff.snooze();
        assert!(backoff.is_sleeping());

        backoff.reset();
        assert!(!backoff.is_sleeping());
    }
}
