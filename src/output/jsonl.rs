//! JSON Lines export sink
//!
//! Appends one JSON object per record. The writer is flushed after every
//! record so the feed stays readable while a long crawl is running.

use crate::output::traits::{ExportSink, OutputResult};
use crate::record::ProductRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonLinesExporter {
    writer: BufWriter<File>,
}

impl JsonLinesExporter {
    /// Opens the export file, appending to an existing feed
    pub fn new(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl ExportSink for JsonLinesExporter {
    fn export(&mut self, record: &ProductRecord) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
