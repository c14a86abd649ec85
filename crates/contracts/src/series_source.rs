//! SeriesSource trait - tabular input abstraction
//!
//! Decouples the engine's callers from where the three input tables come
//! from (CSV files in production, in-memory fixtures in tests).

use crate::{DiameterRecord, RawFrameTimestamp, RawPressureRow};

/// Source of the raw series consumed by one alignment run
pub trait SeriesSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Identifier used in logs
    fn source_id(&self) -> &str;

    /// Diameter series, one record per measured frame
    fn load_diameter(&self) -> Result<Vec<DiameterRecord>, Self::Error>;

    /// Pressure log rows; `None` when the source has no pressure log
    fn load_pressure(&self) -> Result<Option<Vec<RawPressureRow>>, Self::Error>;

    /// Frame → timestamp rows; `None` when the source has no timestamp table
    fn load_frame_timestamps(&self) -> Result<Option<Vec<RawFrameTimestamp>>, Self::Error>;
}
