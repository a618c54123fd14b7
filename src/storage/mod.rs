//! Persistence layer
//!
//! Two targets with different durability characters:
//! - [`ProductStore`]: the SQLite relational store (batched commits,
//!   idempotent product identity, append-only price snapshots)
//! - [`JsonMirror`]: an always-valid JSON-array snapshot of the latest
//!   record per id, rewritten atomically

mod mirror;
mod schema;
mod sqlite;

pub use mirror::JsonMirror;
pub use schema::initialize_schema;
pub use sqlite::ProductStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for relational record stores
///
/// The pipeline talks to the store through this seam so tests can substitute
/// failing or recording implementations.
pub trait RecordStore {
    /// Persists one record (product upsert + snapshot append)
    fn save(&mut self, record: &crate::record::ProductRecord) -> StorageResult<()>;

    /// Commits any pending writes
    fn flush(&mut self) -> StorageResult<()>;
}

impl RecordStore for ProductStore {
    fn save(&mut self, record: &crate::record::ProductRecord) -> StorageResult<()> {
        ProductStore::save(self, record)
    }

    fn flush(&mut self) -> StorageResult<()> {
        ProductStore::flush(self)
    }
}
