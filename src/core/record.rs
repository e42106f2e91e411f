//! Fixed-size record slot format
//!
//! Every record travels as a slot of [`ENTRY_SIZE`] bytes:
//!
//! ```text
//! [0, len)                    "<seconds>.<nanos:09> <tag> <message>\n"
//! [ENTRY_SIZE-2, ENTRY_SIZE)  len as little-endian u16
//! ```
//!
//! Records longer than [`PAYLOAD_CAPACITY`] are cut to exactly that many
//! bytes and their last byte is replaced with `\n`, so a truncated record is
//! still one line at the sink.

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;

/// Size of one record slot in bytes
pub const ENTRY_SIZE: usize = 256;

/// Trailing length field size
pub const LENGTH_FIELD_SIZE: usize = 2;

/// Largest payload a slot of [`ENTRY_SIZE`] can hold
pub const PAYLOAD_CAPACITY: usize = ENTRY_SIZE - LENGTH_FIELD_SIZE;

/// Alignment of the first slot of every arena
pub const CACHE_LINE_SIZE: usize = 64;

/// Records staged per thread before they are pushed to the queue
pub const BATCH_SIZE: usize = 32;

/// Payload capacity for an arbitrary slot size
#[inline]
pub const fn payload_capacity(entry_size: usize) -> usize {
    entry_size - LENGTH_FIELD_SIZE
}

/// Copy `payload` into `slot` and write the trailing length field.
///
/// Returns the number of payload bytes stored.
#[inline]
pub fn store(slot: &mut [u8], payload: &[u8]) -> usize {
    let capacity = payload_capacity(slot.len());
    let len = payload.len().min(capacity);
    slot[..len].copy_from_slice(&payload[..len]);
    write_length(slot, len);
    len
}

/// Payload bytes of a slot written by [`store`]
#[inline]
pub fn payload(slot: &[u8]) -> &[u8] {
    &slot[..read_length(slot)]
}

#[inline]
pub fn write_length(slot: &mut [u8], len: usize) {
    let at = slot.len() - LENGTH_FIELD_SIZE;
    slot[at..].copy_from_slice(&(len as u16).to_le_bytes());
}

#[inline]
pub fn read_length(slot: &[u8]) -> usize {
    let at = slot.len() - LENGTH_FIELD_SIZE;
    u16::from_le_bytes([slot[at], slot[at + 1]]) as usize
}

/// Format one record into `buf` (cleared first) and apply the truncation
/// policy. Returns `true` if the record had to be truncated.
pub fn format_into(
    buf: &mut Vec<u8>,
    level: LogLevel,
    args: fmt::Arguments<'_>,
    now: DateTime<Utc>,
) -> bool {
    buf.clear();
    // Writes into a Vec only fail if a Display impl reports an error; the
    // partial output is still logged.
    let _ = write!(
        buf,
        "{}.{:09} {} ",
        now.timestamp(),
        now.timestamp_subsec_nanos(),
        level.tag() as char
    );
    let _ = buf.write_fmt(args);
    buf.push(b'\n');
    truncate(buf)
}

/// Cut `buf` to [`PAYLOAD_CAPACITY`] bytes, keeping it newline-terminated
pub fn truncate(buf: &mut Vec<u8>) -> bool {
    if buf.len() <= PAYLOAD_CAPACITY {
        return false;
    }
    buf.truncate(PAYLOAD_CAPACITY);
    buf[PAYLOAD_CAPACITY - 1] = b'\n';
    true
}

/// Parsed view of a formatted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordView<'a> {
    pub seconds: i64,
    pub nanos: u32,
    pub level: LogLevel,
    /// Message bytes without the trailing newline
    pub message: &'a [u8],
}

impl<'a> RecordView<'a> {
    /// Parse a record produced by [`format_into`]
    pub fn parse(record: &'a [u8]) -> Option<Self> {
        let space = record.iter().position(|&b| b == b' ')?;
        let stamp = std::str::from_utf8(&record[..space]).ok()?;
        let (secs, nanos) = stamp.split_once('.')?;

        let rest = &record[space + 1..];
        if rest.len() < 2 || rest[1] != b' ' {
            return None;
        }
        let level = LogLevel::from_tag(rest[0])?;
        let message = &rest[2..];
        let message = message.strip_suffix(b"\n").unwrap_or(message);

        Some(Self {
            seconds: secs.parse().ok()?,
            nanos: nanos.parse().ok()?,
            level,
            message,
        })
    }

    pub fn message_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.message).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 42).unwrap()
    }

    #[test]
    fn test_format_layout() {
        let mut buf = Vec::new();
        let truncated = format_into(
            &mut buf,
            LogLevel::Info,
            format_args!("listening on port {}", 8080),
            fixed_time(),
        );

        assert!(!truncated);
        assert_eq!(buf, b"1700000000.000000042 I listening on port 8080\n");
    }

    #[test]
    fn test_parse_formatted_record() {
        let mut buf = Vec::new();
        format_into(&mut buf, LogLevel::Warn, format_args!("disk at {}%", 91), fixed_time());

        let view = RecordView::parse(&buf).unwrap();
        assert_eq!(view.seconds, 1_700_000_000);
        assert_eq!(view.nanos, 42);
        assert_eq!(view.level, LogLevel::Warn);
        assert_eq!(view.message_str(), Some("disk at 91%"));
    }

    #[test]
    fn test_truncation_is_exact_and_newline_terminated() {
        let long = "x".repeat(1000);
        let mut buf = Vec::new();
        let truncated = format_into(&mut buf, LogLevel::Error, format_args!("{}", long), fixed_time());

        assert!(truncated);
        assert_eq!(buf.len(), PAYLOAD_CAPACITY);
        assert_eq!(buf.last(), Some(&b'\n'));
    }

    #[test]
    fn test_record_at_capacity_is_not_truncated() {
        let mut buf = vec![b'a'; PAYLOAD_CAPACITY - 1];
        buf.push(b'\n');
        assert!(!truncate(&mut buf));
        assert_eq!(buf.len(), PAYLOAD_CAPACITY);
    }

    #[test]
    fn test_store_writes_length_field() {
        let mut slot = [0u8; ENTRY_SIZE];
        let stored = store(&mut slot, b"hello\n");

        assert_eq!(stored, 6);
        assert_eq!(read_length(&slot), 6);
        assert_eq!(&slot[ENTRY_SIZE - 2..], &6u16.to_le_bytes());
        assert_eq!(payload(&slot), b"hello\n");
    }

    #[test]
    fn test_store_clamps_to_slot() {
        let mut slot = [0u8; 8];
        let stored = store(&mut slot, b"0123456789");
        assert_eq!(stored, 6);
        assert_eq!(payload(&slot), b"012345");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RecordView::parse(b"not a record").is_none());
        assert!(RecordView::parse(b"").is_none());
        assert!(RecordView::parse(b"1.2 Q nope\n").is_none());
    }
}
