//! SyncOutcome - Sync Engine output
//!
//! Synchronized record stream plus the coverage diagnostics that explain how
//! each pressure value was obtained.

use serde::{Deserialize, Serialize};

/// How a record's pressure value was obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureProvenance {
    /// Nearest pressure sample within tolerance
    Direct,
    /// Linear interpolation on the aligned timeline (or between direct matches)
    Interpolated,
    /// Rescaled timeline, frame-index mapping, or frame-distance interpolation
    Fallback,
    /// Taken from the pressure column already joined into the diameter table
    Embedded,
    /// No pressure available for this record
    #[default]
    Missing,
}

impl PressureProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Interpolated => "interpolated",
            Self::Fallback => "fallback",
            Self::Embedded => "embedded",
            Self::Missing => "missing",
        }
    }
}

/// Strategy the engine used for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStrategy {
    /// Nearest-neighbour matching covered enough frames
    Direct,
    /// Continuous interpolation over the overlap
    Interpolated,
    /// No overlap: pressure timeline rescaled onto the image timeline
    FallbackScaled,
    /// No usable timestamps: pressure mapped by relative frame position
    FrameIndex,
    /// Pressure already present in the diameter table
    Embedded,
    /// No pressure at all
    #[default]
    DiameterOnly,
}

impl AlignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Interpolated => "interpolated",
            Self::FallbackScaled => "fallback_scaled",
            Self::FrameIndex => "frame_index",
            Self::Embedded => "embedded",
            Self::DiameterOnly => "diameter_only",
        }
    }
}

impl std::fmt::Display for AlignmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision taken when fitting diameter frames onto the video's frame range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameScaling {
    /// Frame numbers kept as-is
    #[default]
    Unchanged,
    /// Pure shift: `new = old - offset`
    Offset { offset: i64 },
    /// Proportional rescale: `new = round((old - origin) * factor)`
    Scaled { origin: i64, factor: f64 },
    /// Zero-width range or no video frames: everything maps to frame 0
    Degenerate,
}

/// Time span of two series and their intersection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapResult {
    pub start_a: f64,
    pub end_a: f64,
    pub start_b: f64,
    pub end_b: f64,
    pub overlap_start: f64,
    pub overlap_end: f64,
    pub has_overlap: bool,
}

impl OverlapResult {
    /// Whether `t` lies inside the closed overlap window
    pub fn contains(&self, t: f64) -> bool {
        self.has_overlap && t >= self.overlap_start && t <= self.overlap_end
    }

    /// Overlap length in seconds (0 when disjoint)
    pub fn duration(&self) -> f64 {
        (self.overlap_end - self.overlap_start).max(0.0)
    }
}

/// One output row: a diameter frame with its best-estimate pressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedRecord {
    /// Frame number from the input diameter series (never rewritten)
    pub frame_index: i64,

    /// Normalized index into the video, `None` when it cannot be placed
    pub video_frame: Option<i64>,

    /// Diameter in millimetres (NaN passes through)
    pub diameter_mm: f64,

    /// Best-estimate pressure at this frame
    pub pressure: Option<f64>,

    /// Frame time on the aligned image clock
    pub time_seconds: Option<f64>,

    /// How `pressure` was obtained
    pub provenance: PressureProvenance,
}

/// Coverage diagnostics for one run.
///
/// Every degraded path is visible here so a caller can tell "aligned well"
/// from "silently degraded".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_frames: usize,
    pub matched_directly: usize,
    pub matched_by_interpolation: usize,
    pub matched_by_fallback: usize,
    pub unmatched: usize,

    /// Raw image origin minus raw pressure origin (seconds)
    pub time_offset_seconds: f64,

    pub strategy: AlignmentStrategy,
    pub frame_scaling: FrameScaling,

    /// Pressure rows dropped for a malformed timestamp or non-finite value
    pub malformed_pressure_rows: usize,
    /// Frame/timestamp rows dropped for a malformed timestamp
    pub malformed_frame_timestamps: usize,
    /// Records whose frame could not be placed inside the video
    pub frames_out_of_video_range: usize,

    pub pressure_missing: bool,
    pub degenerate_frame_range: bool,
}

impl CoverageReport {
    /// Records that received a pressure value
    pub fn matched(&self) -> usize {
        self.matched_directly + self.matched_by_interpolation + self.matched_by_fallback
    }

    /// Fraction of records with pressure (0 when empty)
    pub fn coverage_ratio(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.matched() as f64 / self.total_frames as f64
        }
    }

    /// Whether any degraded path was taken
    pub fn is_degraded(&self) -> bool {
        self.pressure_missing
            || self.degenerate_frame_range
            || self.unmatched > 0
            || self.matched_by_fallback > 0
            || self.frames_out_of_video_range > 0
            || self.malformed_pressure_rows > 0
            || self.malformed_frame_timestamps > 0
    }

    /// Count one record under its provenance
    pub fn tally(&mut self, provenance: PressureProvenance) {
        match provenance {
            PressureProvenance::Direct | PressureProvenance::Embedded => {
                self.matched_directly += 1
            }
            PressureProvenance::Interpolated => self.matched_by_interpolation += 1,
            PressureProvenance::Fallback => self.matched_by_fallback += 1,
            PressureProvenance::Missing => self.unmatched += 1,
        }
    }
}

/// Terminal result of one alignment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// One record per input diameter row, ascending by `frame_index`
    pub records: Vec<SyncedRecord>,

    pub coverage: CoverageReport,

    /// Overlap between image and pressure timelines, when both had times
    pub overlap: Option<OverlapResult>,
}

impl SyncOutcome {
    /// Record placed on `video_frame`, if any
    pub fn record_at_video_frame(&self, video_frame: i64) -> Option<&SyncedRecord> {
        self.records
            .iter()
            .find(|r| r.video_frame == Some(video_frame))
    }

    /// Record on `video_frame`, else the one whose video frame is closest.
    /// Ties go to the earlier record.
    pub fn nearest_record(&self, video_frame: i64) -> Option<&SyncedRecord> {
        let mut best: Option<(u64, &SyncedRecord)> = None;
        for record in &self.records {
            let Some(vf) = record.video_frame else {
                continue;
            };
            let distance = vf.abs_diff(video_frame);
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, record));
            }
            if distance == 0 {
                break;
            }
        }
        best.map(|(_, record)| record)
    }
}

/// Outcome tagged with the session that produced it (dispatcher input)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: String,
    pub outcome: SyncOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_and_ratio() {
        let mut report = CoverageReport {
            total_frames: 4,
            ..Default::default()
        };
        report.tally(PressureProvenance::Direct);
        report.tally(PressureProvenance::Interpolated);
        report.tally(PressureProvenance::Fallback);
        report.tally(PressureProvenance::Missing);

        assert_eq!(report.matched(), 3);
        assert!((report.coverage_ratio() - 0.75).abs() < 1e-12);
        assert!(report.is_degraded());
    }

    #[test]
    fn test_clean_report_not_degraded() {
        let report = CoverageReport {
            total_frames: 2,
            matched_directly: 2,
            strategy: AlignmentStrategy::Direct,
            ..Default::default()
        };
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_overlap_contains_closed_window() {
        let overlap = OverlapResult {
            start_a: 0.0,
            end_a: 10.0,
            start_b: 2.0,
            end_b: 12.0,
            overlap_start: 2.0,
            overlap_end: 10.0,
            has_overlap: true,
        };
        assert!(overlap.contains(2.0));
        assert!(overlap.contains(10.0));
        assert!(!overlap.contains(10.5));
        assert_eq!(overlap.duration(), 8.0);
    }

    #[test]
    fn test_frame_scaling_serde_tag() {
        let json = serde_json::to_string(&FrameScaling::Offset { offset: 1000 }).unwrap();
        assert_eq!(json, r#"{"kind":"offset","offset":1000}"#);
    }
}
