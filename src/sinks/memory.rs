//! In-memory sink and writer for tests and demos

use crate::core::{Fields, LogLevel, LogRecord, Result, Sink};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Records every call it receives. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far, in arrival order
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Drop all records, returning them
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl Sink for MemorySink {
    fn log(
        &self,
        timestamp: DateTime<Utc>,
        level: LogLevel,
        fields: &Fields,
        message: &str,
    ) -> Result<()> {
        self.records
            .lock()
            .push(LogRecord::new(timestamp, level, fields.clone(), message));
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// A `Write` target whose contents can be read back; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
