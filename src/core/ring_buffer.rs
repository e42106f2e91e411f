//! Lock-free bounded MPSC ring buffer of fixed-size record slots
//!
//! Producers claim slots by CAS on `tail`; the single consumer advances
//! `head`. Each slot has its own ready flag: a producer stores it with
//! `Release` after the payload and length are written, the consumer loads it
//! with `Acquire` before reading and clears it before releasing the slot
//! through `head`. The ready flag is independent of the length field, so a
//! zero-length payload is a valid record.

use super::arena::SlotArena;
use super::error::{LoggerError, Result};
use super::record::{self, LENGTH_FIELD_SIZE};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Cache-aligned wrapper to prevent false sharing
#[repr(align(64))]
struct CacheAligned<T>(T);

/// Lock-free multiple-producer single-consumer ring buffer
///
/// Only [`try_enqueue`](Self::try_enqueue) and the size snapshots are
/// available on the shared queue. Dequeueing goes through the unique
/// [`QueueConsumer`] returned by [`bounded`](Self::bounded).
pub struct MpscRingBuffer {
    tail: CacheAligned<AtomicUsize>,
    head: CacheAligned<AtomicUsize>,
    arena: SlotArena,
    ready: Box<[AtomicBool]>,
    mask: usize,
    cas_failures: AtomicU64,
}

// SAFETY: MpscRingBuffer is Send + Sync because:
// - producers own a slot exclusively between winning the tail CAS and
//   publishing its ready flag
// - the single QueueConsumer reads a slot only after observing its ready
//   flag, and hands it back to producers only by advancing head
// - tail - head <= capacity keeps producers off slots the consumer has not
//   released
unsafe impl Send for MpscRingBuffer {}
unsafe impl Sync for MpscRingBuffer {}

impl MpscRingBuffer {
    /// Create a queue of `capacity` slots of `entry_size` bytes and its only
    /// consumer handle.
    ///
    /// `capacity` must be a non-zero power of two. `entry_size` must leave
    /// room for at least one payload byte and its length must fit in the
    /// 16-bit length field.
    pub fn bounded(entry_size: usize, capacity: usize) -> Result<(Arc<Self>, QueueConsumer)> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(LoggerError::config(
                "MpscRingBuffer",
                format!("capacity must be a non-zero power of two, got {}", capacity),
            ));
        }
        if entry_size <= LENGTH_FIELD_SIZE
            || record::payload_capacity(entry_size) > u16::MAX as usize
        {
            return Err(LoggerError::config(
                "MpscRingBuffer",
                format!("unsupported entry size {}", entry_size),
            ));
        }

        let arena = SlotArena::new(entry_size, capacity)?;
        let ready: Vec<AtomicBool> = (0..capacity).map(|_| AtomicBool::new(false)).collect();

        let queue = Arc::new(Self {
            tail: CacheAligned(AtomicUsize::new(0)),
            head: CacheAligned(AtomicUsize::new(0)),
            arena,
            ready: ready.into_boxed_slice(),
            mask: capacity - 1,
            cas_failures: AtomicU64::new(0),
        });
        let consumer = QueueConsumer {
            queue: Arc::clone(&queue),
        };
        Ok((queue, consumer))
    }

    /// Copy `payload` into the next free slot.
    ///
    /// Returns `false` without side effects iff the queue is full. Payloads
    /// longer than `entry_size - 2` bytes are truncated.
    pub fn try_enqueue(&self, payload: &[u8]) -> bool {
        let capacity = self.capacity();
        let mut tail = self.tail.0.load(Ordering::Relaxed);

        loop {
            let head = self.head.0.load(Ordering::Acquire);
            if tail.wrapping_sub(head) >= capacity {
                // A stale tail can make the queue look full (or head look
                // ahead of tail); only report full against the current tail.
                let current = self.tail.0.load(Ordering::Relaxed);
                if current == tail {
                    return false;
                }
                tail = current;
                continue;
            }

            match self.tail.0.compare_exchange_weak(
                tail,
                tail.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => {
                    self.cas_failures.fetch_add(1, Ordering::Relaxed);
                    tail = actual;
                }
            }
        }

        let index = tail & self.mask;
        // SAFETY: winning the CAS for `tail` gives this producer exclusive
        // ownership of the slot until the ready flag is published.
        let slot = unsafe {
            std::slice::from_raw_parts_mut(self.arena.slot_ptr(index), self.arena.entry_size())
        };
        record::store(slot, payload);
        self.ready[index].store(true, Ordering::Release);
        true
    }

    /// Number of occupied slots (snapshot)
    pub fn len(&self) -> usize {
        let head = self.head.0.load(Ordering::Acquire);
        let tail = self.tail.0.load(Ordering::Acquire);
        tail.wrapping_sub(head).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    #[inline]
    pub fn entry_size(&self) -> usize {
        self.arena.entry_size()
    }

    /// Total number of slots ever claimed by producers
    pub fn enqueued_total(&self) -> usize {
        self.tail.0.load(Ordering::Acquire)
    }

    /// Total number of slots released by the consumer
    pub fn dequeued_total(&self) -> usize {
        self.head.0.load(Ordering::Acquire)
    }

    /// Number of lost tail CAS races (contention metric)
    pub fn cas_failures(&self) -> u64 {
        self.cas_failures.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MpscRingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpscRingBuffer")
            .field("capacity", &self.capacity())
            .field("entry_size", &self.entry_size())
            .field("len", &self.len())
            .finish()
    }
}

/// The only handle that can dequeue from an [`MpscRingBuffer`]
///
/// Not `Clone`: holding it is what makes the caller the single consumer.
#[derive(Debug)]
pub struct QueueConsumer {
    queue: Arc<MpscRingBuffer>,
}

impl QueueConsumer {
    /// Copy the oldest record into `out` and release its slot.
    ///
    /// Returns `None` iff the queue is empty. If a producer has claimed the
    /// slot but not yet published it, this yields until it is published.
    /// If `out` is shorter than the record, the record is truncated to
    /// `out.len()` bytes.
    pub fn try_dequeue(&mut self, out: &mut [u8]) -> Option<usize> {
        let queue = &*self.queue;
        let head = queue.head.0.load(Ordering::Relaxed);
        let tail = queue.tail.0.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        let index = head & queue.mask;
        while !queue.ready[index].load(Ordering::Acquire) {
            thread::yield_now();
        }

        // SAFETY: the ready flag was observed with Acquire, so the
        // producer's writes to this slot are visible and complete; no
        // producer touches it again until head moves past it.
        let slot = unsafe {
            std::slice::from_raw_parts(queue.arena.slot_ptr(index), queue.arena.entry_size())
        };
        let len = record::read_length(slot).min(out.len());
        out[..len].copy_from_slice(&slot[..len]);

        queue.ready[index].store(false, Ordering::Relaxed);
        queue.head.0.store(head.wrapping_add(1), Ordering::Release);
        Some(len)
    }

    pub fn queue(&self) -> &Arc<MpscRingBuffer> {
        &self.queue
    }
}
