//! Output module for export sinks
//!
//! A sink is the final consumer of accepted records, decoupled from the
//! relational store and the JSON mirror.

mod jsonl;
mod traits;

pub use jsonl::JsonLinesExporter;
pub use traits::{ExportSink, OutputError, OutputResult};
