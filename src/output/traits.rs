//! Export sink trait and error types

use crate::record::ProductRecord;
use thiserror::Error;

/// Errors that can occur during export operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for item-export sinks
///
/// A sink receives every record the pipeline accepts, independently of the
/// relational store and the mirror. Implementations should make each record
/// visible promptly so a partial run still produces a usable feed.
pub trait ExportSink {
    /// Exports a single record
    fn export(&mut self, record: &ProductRecord) -> OutputResult<()>;

    /// Flushes and finalizes the sink at run end
    fn close(&mut self) -> OutputResult<()>;
}
