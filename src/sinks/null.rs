//! Sink that discards every record

use crate::core::Sink;

/// Discards records; useful for benchmarks and disabled outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl Sink for NullSink {
    #[inline]
    fn write(&mut self, _record: &[u8]) {}

    #[inline]
    fn flush(&mut self) {}

    fn name(&self) -> &str {
        "null"
    }
}
