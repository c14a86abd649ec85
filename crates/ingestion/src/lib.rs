//! # Ingestion
//!
//! Tabular input loading.
//!
//! Responsibilities:
//! - Read the diameter, pressure and frame/timestamp CSV tables
//! - Resolve column aliases at the boundary
//! - Skip and count malformed rows instead of failing the session
//! - Bundle a session's tables into an `AlignmentInput`
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{CsvSeriesSource, SessionInputs};
//!
//! let source = CsvSeriesSource::from_session(&session, &blueprint.columns);
//! let loaded = SessionInputs::load(&source, session.total_video_frames)?;
//! println!("{}", loaded.report);
//! ```

mod error;
mod report;
mod source;
mod tables;

// Re-exports
pub use error::{IngestionError, Result};
pub use report::{LoadReport, TableStats};
pub use source::{collect_input, CsvSeriesSource, SessionInputs};
pub use tables::{read_diameter, read_frame_timestamps, read_pressure};
