//! Record pipeline orchestrator
//!
//! Every candidate record passes through, in order: validation (id must be
//! present), deduplication, relational persistence, the JSON mirror, and the
//! export sink. A persistence failure is logged and swallowed so the record
//! still reaches the mirror and the sink; durability of the relational store
//! is best-effort relative to the mirror.
//!
//! The orchestrator's seen set spans the whole process run (all queries) and
//! is the authoritative owner of "each id emitted at most once per run".

use crate::config::OutputConfig;
use crate::output::{ExportSink, JsonLinesExporter};
use crate::record::ProductRecord;
use crate::storage::{JsonMirror, ProductStore, RecordStore};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct Pipeline {
    seen: HashSet<String>,
    store: Box<dyn RecordStore>,
    mirror: JsonMirror,
    sink: Box<dyn ExportSink>,
    accepted: u64,
}

impl Pipeline {
    /// Opens all persistence targets from the output configuration
    pub fn new(output: &OutputConfig) -> Result<Self> {
        let store = ProductStore::new(Path::new(&output.database_path), output.commit_every)?;
        let mirror = JsonMirror::new(
            PathBuf::from(&output.mirror_path),
            output.mirror_write_every,
        );
        let sink = JsonLinesExporter::new(Path::new(&output.export_path))?;

        Ok(Self::with_parts(Box::new(store), mirror, Box::new(sink)))
    }

    /// Assembles a pipeline from already-built parts
    pub fn with_parts(
        store: Box<dyn RecordStore>,
        mirror: JsonMirror,
        sink: Box<dyn ExportSink>,
    ) -> Self {
        Self {
            seen: HashSet::new(),
            store,
            mirror,
            sink,
            accepted: 0,
        }
    }

    /// Lifecycle start: loads the existing mirror into memory
    pub fn start(&mut self) -> Result<()> {
        self.mirror.load()?;
        Ok(())
    }

    /// Processes one candidate record
    ///
    /// Drops (with a log line) records missing an id or duplicating one this
    /// pipeline already accepted. Persistence failures never drop the
    /// record from the remaining targets.
    pub fn process(&mut self, record: ProductRecord) {
        if record.product_id.is_empty() {
            tracing::warn!("Missing product_id, dropping record for {}", record.product_url);
            return;
        }

        if !self.seen.insert(record.product_id.clone()) {
            tracing::debug!("Duplicate product {}, dropping", record.product_id);
            return;
        }

        if let Err(e) = self.store.save(&record) {
            tracing::error!("Failed to persist product {}: {}", record.product_id, e);
        }

        if let Err(e) = self.mirror.update(&record) {
            tracing::error!("Failed to mirror product {}: {}", record.product_id, e);
        }

        if let Err(e) = self.sink.export(&record) {
            tracing::error!("Failed to export product {}: {}", record.product_id, e);
        }

        self.accepted += 1;
    }

    /// Lifecycle stop: flush every target
    ///
    /// All three targets are flushed even if an earlier one fails; the first
    /// failure is reported after the attempts.
    pub fn stop(&mut self) -> Result<()> {
        let store_result = self.store.flush();
        let mirror_result = self.mirror.flush();
        let sink_result = self.sink.close();

        tracing::info!("Pipeline stopped after {} accepted records", self.accepted);

        store_result?;
        mirror_result?;
        sink_result?;
        Ok(())
    }

    /// Number of records accepted so far
    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    /// Read access to the mirror (for tests and tooling)
    pub fn mirror(&self) -> &JsonMirror {
        &self.mirror
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputResult;
    use crate::record::scraped_at_now;
    use crate::storage::{StorageError, StorageResult};
    use std::sync::{Arc, Mutex};

    fn test_record(id: &str) -> ProductRecord {
        ProductRecord {
            product_id: id.to_string(),
            title: Some(format!("Product {}", id)),
            price: Some(100),
            rating: Some(4.0),
            product_url: format!("https://shop.example.com/p/{}", id),
            category: "mobiles".to_string(),
            page: 1,
            scraped_at: scraped_at_now(),
        }
    }

    /// Store that records save calls and optionally fails some of them
    struct ScriptedStore {
        saved: Arc<Mutex<Vec<String>>>,
        fail_on: Option<usize>,
        calls: usize,
        flushed: bool,
    }

    impl ScriptedStore {
        fn new(fail_on: Option<usize>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let saved = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    saved: saved.clone(),
                    fail_on,
                    calls: 0,
                    flushed: false,
                },
                saved,
            )
        }
    }

    impl RecordStore for ScriptedStore {
        fn save(&mut self, record: &ProductRecord) -> StorageResult<()> {
            self.calls += 1;
            if self.fail_on == Some(self.calls) {
                return Err(StorageError::Sqlite(
                    rusqlite::Error::ExecuteReturnedResults,
                ));
            }
            self.saved.lock().unwrap().push(record.product_id.clone());
            Ok(())
        }

        fn flush(&mut self) -> StorageResult<()> {
            self.flushed = true;
            Ok(())
        }
    }

    /// Sink that records everything it receives
    struct RecordingSink {
        exported: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let exported = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    exported: exported.clone(),
                },
                exported,
            )
        }
    }

    impl ExportSink for RecordingSink {
        fn export(&mut self, record: &ProductRecord) -> OutputResult<()> {
            self.exported.lock().unwrap().push(record.product_id.clone());
            Ok(())
        }

        fn close(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    fn test_pipeline(
        fail_on: Option<usize>,
        mirror_dir: &std::path::Path,
    ) -> (Pipeline, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let (store, saved) = ScriptedStore::new(fail_on);
        let (sink, exported) = RecordingSink::new();
        let mirror = JsonMirror::new(mirror_dir.join("mirror.json"), 1);
        let pipeline = Pipeline::with_parts(Box::new(store), mirror, Box::new(sink));
        (pipeline, saved, exported)
    }

    #[test]
    fn test_missing_id_dropped_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let (mut pipeline, saved, exported) = test_pipeline(None, dir.path());

        pipeline.process(test_record(""));

        assert!(saved.lock().unwrap().is_empty());
        assert!(exported.lock().unwrap().is_empty());
        assert!(pipeline.mirror().is_empty());
        assert_eq!(pipeline.accepted_count(), 0);
    }

    #[test]
    fn test_duplicate_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut pipeline, saved, _) = test_pipeline(None, dir.path());

        pipeline.process(test_record("A"));
        pipeline.process(test_record("A"));

        assert_eq!(saved.lock().unwrap().len(), 1);
        assert_eq!(pipeline.accepted_count(), 1);
    }

    #[test]
    fn test_store_failure_does_not_drop_record() {
        let dir = tempfile::tempdir().unwrap();
        // Fifth save fails; all ten records must still reach mirror + sink
        let (mut pipeline, saved, exported) = test_pipeline(Some(5), dir.path());

        for i in 0..10 {
            pipeline.process(test_record(&format!("P{}", i)));
        }

        assert_eq!(saved.lock().unwrap().len(), 9);
        assert_eq!(exported.lock().unwrap().len(), 10);
        assert_eq!(pipeline.mirror().len(), 10);
        assert_eq!(pipeline.accepted_count(), 10);
    }

    #[test]
    fn test_stop_flushes_all_targets() {
        let dir = tempfile::tempdir().unwrap();
        let (mut pipeline, _, _) = test_pipeline(None, dir.path());

        pipeline.process(test_record("A"));
        pipeline.stop().unwrap();

        // The mirror must have its final rewrite on disk
        let content = std::fs::read_to_string(dir.path().join("mirror.json")).unwrap();
        let parsed: Vec<ProductRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_start_loads_existing_mirror() {
        let dir = tempfile::tempdir().unwrap();

        {
            let (mut pipeline, _, _) = test_pipeline(None, dir.path());
            pipeline.process(test_record("A"));
            pipeline.stop().unwrap();
        }

        let (mut pipeline, _, _) = test_pipeline(None, dir.path());
        pipeline.start().unwrap();
        assert_eq!(pipeline.mirror().len(), 1);
        assert!(pipeline.mirror().get("A").is_some());
    }
}
