//! Per-thread staging area for records bound for the shared queue

use super::record::{self, BATCH_SIZE, ENTRY_SIZE};

/// Up to [`BATCH_SIZE`] record slots owned by one producer thread.
///
/// Slots use the same layout as queue slots, so a flush is a plain
/// per-record [`try_enqueue`](super::MpscRingBuffer::try_enqueue).
pub struct ThreadLocalBatch {
    slots: Box<[u8; ENTRY_SIZE * BATCH_SIZE]>,
    count: usize,
}

impl ThreadLocalBatch {
    pub fn new() -> Self {
        Self {
            slots: Box::new([0u8; ENTRY_SIZE * BATCH_SIZE]),
            count: 0,
        }
    }

    /// Stage a record. Returns `false` iff the batch is already full.
    pub fn try_add(&mut self, payload: &[u8]) -> bool {
        if self.count >= BATCH_SIZE {
            return false;
        }
        let start = self.count * ENTRY_SIZE;
        record::store(&mut self.slots[start..start + ENTRY_SIZE], payload);
        self.count += 1;
        true
    }

    /// Payload of the record at `idx`
    pub fn get(&self, idx: usize) -> Option<&[u8]> {
        if idx >= self.count {
            return None;
        }
        let start = idx * ENTRY_SIZE;
        Some(record::payload(&self.slots[start..start + ENTRY_SIZE]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).filter_map(move |idx| self.get(idx))
    }

    /// Forget every staged record. Slot bytes are left as they are.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= BATCH_SIZE
    }
}

impl Default for ThreadLocalBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ThreadLocalBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadLocalBatch")
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::PAYLOAD_CAPACITY;

    #[test]
    fn test_fills_to_batch_size() {
        let mut batch = ThreadLocalBatch::new();
        for i in 0..BATCH_SIZE {
            assert!(batch.try_add(format!("entry {}", i).as_bytes()));
        }
        assert!(batch.is_full());
        assert!(!batch.try_add(b"one too many"));
        assert_eq!(batch.len(), BATCH_SIZE);
        assert_eq!(batch.get(5), Some(&b"entry 5"[..]));
        assert_eq!(batch.get(BATCH_SIZE), None);
    }

    #[test]
    fn test_clear_resets_count_only() {
        let mut batch = ThreadLocalBatch::new();
        batch.try_add(b"first");
        batch.clear();

        assert!(batch.is_empty());
        assert_eq!(batch.get(0), None);
        assert_eq!(batch.iter().count(), 0);

        batch.try_add(b"second");
        assert_eq!(batch.get(0), Some(&b"second"[..]));
    }

    #[test]
    fn test_long_payload_is_truncated() {
        let mut batch = ThreadLocalBatch::new();
        batch.try_add(&[b'q'; 600]);
        assert_eq!(batch.get(0).unwrap().len(), PAYLOAD_CAPACITY);
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut batch = ThreadLocalBatch::new();
        batch.try_add(b"a");
        batch.try_add(b"");
        batch.try_add(b"c");

        let collected: Vec<&[u8]> = batch.iter().collect();
        assert_eq!(collected, vec![&b"a"[..], &b""[..], &b"c"[..]]);
    }
}
