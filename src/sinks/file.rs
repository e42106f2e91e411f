//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends records to a file through a buffered writer
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
    failed: bool,
}

impl FileSink {
    /// Open (or create) `path` for appending
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = Self::open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            failed: false,
        })
    }

    /// Open `path` for appending and take an exclusive lock on it, so a
    /// second process cannot interleave writes. Fails if already locked.
    #[cfg(feature = "file")]
    pub fn with_lock(path: impl Into<PathBuf>) -> Result<Self> {
        use fs2::FileExt;

        let path = path.into();
        let file = Self::open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::file_lock(path.display().to_string()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            failed: false,
        })
    }

    fn open(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation("open", format!("cannot open '{}'", path.display()), e)
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&mut self, record: &[u8]) {
        if let Err(e) = self.writer.write_all(record) {
            if !self.failed {
                eprintln!(
                    "[LOGGER ERROR] File sink '{}' write failed: {}",
                    self.path.display(),
                    e
                );
                self.failed = true;
            }
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            eprintln!(
                "[LOGGER ERROR] File sink '{}' flush failed: {}",
                self.path.display(),
                e
            );
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_appends_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let mut sink = FileSink::new(&path).unwrap();
        sink.write(b"1.000000000 I first\n");
        sink.write(b"2.000000000 W second\n");
        sink.flush();
        drop(sink);

        let mut sink = FileSink::new(&path).unwrap();
        sink.write(b"3.000000000 E third\n");
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "1.000000000 I first\n2.000000000 W second\n3.000000000 E third\n"
        );
    }

    #[test]
    fn test_open_failure_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        assert!(matches!(
            FileSink::new(path),
            Err(LoggerError::IoOperation { .. })
        ));
    }

    #[cfg(feature = "file")]
    #[test]
    fn test_second_lock_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.log");

        let _first = FileSink::with_lock(&path).unwrap();
        assert!(matches!(
            FileSink::with_lock(&path),
            Err(LoggerError::FileLockError { .. })
        ));
    }
}
