//! Console sink implementation

use crate::core::Sink;
#[cfg(feature = "console")]
use crate::core::LogLevel;
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::{self, Write};

/// Writes records to stdout
pub struct ConsoleSink {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    failed: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: false,
            failed: false,
        }
    }

    /// Colour the level tag; needs the `console` feature, ignored otherwise
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            failed: false,
        }
    }

    fn emit(&self, out: &mut impl Write, record: &[u8]) -> io::Result<()> {
        #[cfg(feature = "console")]
        if self.use_colors {
            if let Some((prefix, level, rest)) = split_tag(record) {
                out.write_all(prefix)?;
                let tag = (level.tag() as char).to_string();
                write!(out, "{}", tag.color(level.color_code()))?;
                return out.write_all(rest);
            }
        }
        out.write_all(record)
    }
}

/// Split a record around its level tag: `"<ts> "`, level, `" <msg>\n"`
#[cfg(feature = "console")]
fn split_tag(record: &[u8]) -> Option<(&[u8], LogLevel, &[u8])> {
    let space = record.iter().position(|&b| b == b' ')?;
    let tag = *record.get(space + 1)?;
    let level = LogLevel::from_tag(tag)?;
    Some((&record[..=space], level, &record[space + 2..]))
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, record: &[u8]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.emit(&mut out, record) {
            if !self.failed {
                eprintln!("[LOGGER ERROR] Console sink write failed: {}", e);
                self.failed = true;
            }
        }
    }

    fn flush(&mut self) {
        let _ = io::stdout().flush();
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(all(test, feature = "console"))]
mod tests {
    use super::*;

    #[test]
    fn test_split_tag() {
        let (prefix, level, rest) = split_tag(b"12.000000001 E boom\n").unwrap();
        assert_eq!(prefix, b"12.000000001 ");
        assert_eq!(level, LogLevel::Error);
        assert_eq!(rest, b" boom\n");

        assert!(split_tag(b"garbage").is_none());
        assert!(split_tag(b"").is_none());
    }

    #[test]
    fn test_plain_output_is_unchanged() {
        let sink = ConsoleSink::new();
        let mut out = Vec::new();
        sink.emit(&mut out, b"1.000000000 I hi\n").unwrap();
        assert_eq!(out, b"1.000000000 I hi\n");
    }
}
