//! Per-thread producer context
//!
//! Each thread gets one [`ThreadContext`] on its first logging call. It holds
//! the formatting scratch buffer and one [`ThreadLocalBatch`] per async
//! logger the thread has logged to. Each batch is also registered with its
//! logger, so a dropping logger can push batches of threads that are still
//! alive. When the thread exits, the context is dropped and every non-empty
//! batch is pushed to its logger, provided the logger is still alive.

use super::batch::ThreadLocalBatch;
use super::logger::LoggerShared;
use super::record::ENTRY_SIZE;
use parking_lot::{Mutex, MutexGuard};
use std::cell::RefCell;
use std::sync::{Arc, Weak};

thread_local! {
    static CONTEXT: RefCell<ThreadContext> = RefCell::new(ThreadContext::new());
}

struct Registration {
    logger_id: u64,
    shared: Weak<LoggerShared>,
    batch: Arc<Mutex<ThreadLocalBatch>>,
}

pub(crate) struct ThreadContext {
    scratch: Vec<u8>,
    registrations: Vec<Registration>,
}

impl ThreadContext {
    fn new() -> Self {
        Self {
            scratch: Vec::with_capacity(ENTRY_SIZE * 2),
            registrations: Vec::new(),
        }
    }

    pub(crate) fn scratch(&mut self) -> &mut Vec<u8> {
        &mut self.scratch
    }

    /// Scratch buffer and this thread's batch for `shared`, registering the
    /// batch on first use.
    pub(crate) fn scratch_and_batch(
        &mut self,
        shared: &Arc<LoggerShared>,
    ) -> (&mut Vec<u8>, MutexGuard<'_, ThreadLocalBatch>) {
        let idx = match self.position(shared.id()) {
            Some(idx) => idx,
            None => {
                // Loggers that are gone will never be flushed to again.
                self.registrations.retain(|r| r.shared.strong_count() > 0);
                let batch = Arc::new(Mutex::new(ThreadLocalBatch::new()));
                shared.register_batch(Arc::clone(&batch));
                self.registrations.push(Registration {
                    logger_id: shared.id(),
                    shared: Arc::downgrade(shared),
                    batch,
                });
                self.registrations.len() - 1
            }
        };
        (&mut self.scratch, self.registrations[idx].batch.lock())
    }

    /// This thread's batch for a logger, if one was ever registered
    pub(crate) fn batch(&self, logger_id: u64) -> Option<MutexGuard<'_, ThreadLocalBatch>> {
        let idx = self.position(logger_id)?;
        Some(self.registrations[idx].batch.lock())
    }

    pub(crate) fn deregister(&mut self, logger_id: u64) {
        self.registrations.retain(|r| r.logger_id != logger_id);
    }

    fn position(&self, logger_id: u64) -> Option<usize> {
        self.registrations
            .iter()
            .position(|r| r.logger_id == logger_id)
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        for registration in self.registrations.drain(..) {
            let Some(shared) = registration.shared.upgrade() else {
                continue;
            };
            {
                let mut batch = registration.batch.lock();
                if !batch.is_empty() {
                    shared.flush_batch(&mut batch);
                }
            }
            shared.unregister_batch(&registration.batch);
        }
    }
}

/// Run `f` with the calling thread's context.
///
/// Returns `None` when the context is unavailable: during thread teardown
/// after it was destroyed, or when called re-entrantly from inside `f`
/// (e.g. a sink that logs). Callers fall back to a temporary buffer.
pub(crate) fn with_context<R>(f: impl FnOnce(&mut ThreadContext) -> R) -> Option<R> {
    CONTEXT
        .try_with(|cell| cell.try_borrow_mut().ok().map(|mut ctx| f(&mut ctx)))
        .ok()
        .flatten()
}
