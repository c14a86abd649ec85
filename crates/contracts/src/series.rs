//! Input series - SeriesLoader output
//!
//! Raw rows as produced by the ingestion collaborator, plus the parsed
//! `PressureSample` the engine builds from them.

use serde::{Deserialize, Serialize};

use crate::TimePoint;

/// One measured frame of the diameter series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterRecord {
    /// Frame number as logged by the measurement pipeline (unique per series)
    pub frame_index: i64,

    /// Measured diameter in millimetres (NaN for an invalid measurement)
    pub diameter_mm: f64,

    /// Pre-computed time on the image clock, if the upstream table carries one
    #[serde(default)]
    pub time: Option<TimePoint>,

    /// Pressure joined upstream into the diameter table, if any
    #[serde(default)]
    pub embedded_pressure: Option<f64>,
}

impl DiameterRecord {
    /// Record with only frame and diameter populated
    pub fn new(frame_index: i64, diameter_mm: f64) -> Self {
        Self {
            frame_index,
            diameter_mm,
            time: None,
            embedded_pressure: None,
        }
    }

    pub fn with_time(mut self, seconds: f64) -> Self {
        self.time = Some(TimePoint::from_seconds(seconds));
        self
    }

    pub fn with_embedded_pressure(mut self, pressure: f64) -> Self {
        self.embedded_pressure = Some(pressure);
        self
    }
}

/// Pressure log row before timestamp parsing (`HH-MM-SS-mmm`, value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPressureRow {
    pub raw_timestamp: String,
    pub value: f64,
}

impl RawPressureRow {
    pub fn new(raw_timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            raw_timestamp: raw_timestamp.into(),
            value,
        }
    }
}

/// Frame/timestamp table row before parsing (`Frame Number`, `HH:MM:SS.mmm`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrameTimestamp {
    pub frame_index: i64,
    pub raw_timestamp: String,
}

impl RawFrameTimestamp {
    pub fn new(frame_index: i64, raw_timestamp: impl Into<String>) -> Self {
        Self {
            frame_index,
            raw_timestamp: raw_timestamp.into(),
        }
    }
}

/// Parsed pressure sample. Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    pub raw_timestamp: String,
    pub time: TimePoint,
    pub value: f64,
}

/// Everything one alignment run consumes.
///
/// Owned by the engine for the duration of a single run only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentInput {
    /// Diameter series (required; empty means missing)
    pub diameter: Vec<DiameterRecord>,

    /// Pressure log (None when no pressure file was found)
    pub pressure: Option<Vec<RawPressureRow>>,

    /// Frame → timestamp table (None when the recording has no timestamp log)
    pub frame_timestamps: Option<Vec<RawFrameTimestamp>>,

    /// Frame count of the decoded video, when known
    pub total_video_frames: Option<i64>,
}

impl AlignmentInput {
    pub fn new(diameter: Vec<DiameterRecord>) -> Self {
        Self {
            diameter,
            ..Default::default()
        }
    }

    pub fn with_pressure(mut self, rows: Vec<RawPressureRow>) -> Self {
        self.pressure = Some(rows);
        self
    }

    pub fn with_frame_timestamps(mut self, rows: Vec<RawFrameTimestamp>) -> Self {
        self.frame_timestamps = Some(rows);
        self
    }

    pub fn with_total_video_frames(mut self, total: i64) -> Self {
        self.total_video_frames = Some(total);
        self
    }
}
