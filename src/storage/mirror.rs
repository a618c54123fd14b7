//! JSON-array mirror
//!
//! A human-readable snapshot of the latest record per product id, kept as a
//! single JSON array on disk. The file must always be valid, complete JSON,
//! so every rewrite replaces the whole array atomically (temp file + rename
//! in the same directory). On startup an existing mirror is loaded back so
//! restarts do not lose history.

use crate::record::ProductRecord;
use crate::storage::StorageResult;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct JsonMirror {
    path: PathBuf,
    records: BTreeMap<String, ProductRecord>,
    write_every: u32,
    since_write: u32,
}

impl JsonMirror {
    pub fn new(path: PathBuf, write_every: u32) -> Self {
        Self {
            path,
            records: BTreeMap::new(),
            write_every: write_every.max(1),
            since_write: 0,
        }
    }

    /// Loads an existing mirror file, indexing records by id
    ///
    /// A missing file is a fresh start. An unreadable or corrupt file is
    /// logged and treated the same way rather than aborting the run.
    pub fn load(&mut self) -> StorageResult<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Vec<ProductRecord>>(&content) {
            Ok(records) => {
                for record in records {
                    if !record.product_id.is_empty() {
                        self.records.insert(record.product_id.clone(), record);
                    }
                }
                tracing::info!(
                    "Loaded {} records from mirror {}",
                    self.records.len(),
                    self.path.display()
                );
            }
            Err(e) => {
                tracing::error!(
                    "Failed to parse existing mirror {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
            }
        }

        Ok(())
    }

    /// Updates the in-memory index and rewrites the file when the write
    /// interval is due (last write wins per id)
    pub fn update(&mut self, record: &ProductRecord) -> StorageResult<()> {
        self.records
            .insert(record.product_id.clone(), record.clone());

        self.since_write += 1;
        if self.since_write >= self.write_every {
            self.write_file()?;
        }

        Ok(())
    }

    /// Forces a rewrite regardless of the configured interval
    pub fn flush(&mut self) -> StorageResult<()> {
        self.write_file()
    }

    /// Number of distinct records currently mirrored
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the latest record for an id
    pub fn get(&self, product_id: &str) -> Option<&ProductRecord> {
        self.records.get(product_id)
    }

    /// Atomically rewrites the whole array
    fn write_file(&mut self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records: Vec<&ProductRecord> = self.records.values().collect();
        let json = serde_json::to_string_pretty(&records)?;

        // Write-then-rename so readers never observe a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        self.since_write = 0;
        Ok(())
    }
}
