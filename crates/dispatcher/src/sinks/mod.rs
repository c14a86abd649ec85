//! Sink implementations
//!
//! Contains LogSink, CsvSink, and JsonSink.

mod csv;
mod json;
mod log;

use std::collections::HashMap;
use std::path::PathBuf;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::log::LogSink;

/// Output directory for file sinks
fn base_path_from_params(params: &HashMap<String, String>) -> PathBuf {
    params
        .get("base_path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./output"))
}
