use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use serde::Serialize;
use crate::error::Result;

const FLUSH_THRESHOLD: usize = 64 * 1024; // 64KB buffer

/// Buffered JSON-lines writer for graded attempts.
pub struct ReportWriter {
    sink: Box<dyn Write + Send>,
    buffer: Vec<u8>,
    records: usize,
}

impl ReportWriter {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_writer(File::create(path)?))
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        ReportWriter {
            sink: Box::new(writer),
            buffer: Vec::with_capacity(FLUSH_THRESHOLD),
            records: 0,
        }
    }

    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.buffer, record)?;
        self.buffer.push(b'\n');
        self.records += 1;

        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.flush()?;
        }
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn flush(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.sink.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        self.sink.flush()?;
        Ok(())
    }
}

impl Drop for ReportWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
