//! In-memory sink capturing every record

use crate::core::Sink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    records: Mutex<Vec<Vec<u8>>>,
    flushes: AtomicU64,
}

/// Sink that keeps records in memory
///
/// Clones share the same storage, so one handle can be given to the logger
/// while another inspects what was written.
///
/// # Example
///
/// ```
/// use zerolog::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::new(sink.clone(), false).unwrap();
///
/// zerolog::warn!(logger, "disk {}% full", 91);
/// assert!(sink.lines()[0].ends_with(" W disk 91% full\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Captured>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record written so far, in write order
    pub fn records(&self) -> Vec<Vec<u8>> {
        self.inner.records.lock().clone()
    }

    /// Records decoded as UTF-8 (lossy)
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .records
            .lock()
            .iter()
            .map(|record| String::from_utf8_lossy(record).into_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times the sink was flushed
    pub fn flush_count(&self) -> u64 {
        self.inner.flushes.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.inner.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&mut self, record: &[u8]) {
        self.inner.records.lock().push(record.to_vec());
    }

    fn flush(&mut self) {
        self.inner.flushes.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let reader = MemorySink::new();
        let mut writer = reader.clone();

        writer.write(b"1.000000000 I one\n");
        writer.write(b"");
        writer.flush();

        assert_eq!(reader.len(), 2);
        assert_eq!(reader.records()[1], Vec::<u8>::new());
        assert_eq!(reader.flush_count(), 1);

        reader.clear();
        assert!(writer.is_empty());
    }
}
