//! Sink trait for log output destinations
//!
//! A sink receives finished records: one newline-terminated line per call.
//! Write and flush failures are the sink's own business; the logger never
//! retries or reports them.
//!
//! A sink must not log through the logger that owns it: the sink mutex is
//! held for the duration of every call.

pub trait Sink: Send {
    fn write(&mut self, record: &[u8]);
    fn flush(&mut self);

    fn name(&self) -> &str {
        "custom"
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, record: &[u8]) {
        (**self).write(record)
    }

    fn flush(&mut self) {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
