//! CsvSink - writes aligned records and coverage tables per session

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ::csv::Writer;
use contracts::{ContractError, CoverageReport, DataSink, FrameScaling, SessionOutcome};
use tracing::{debug, error, instrument};

use super::base_path_from_params;

/// Sink that writes `<session>_synced.csv` and `<session>_coverage.csv`
pub struct CsvSink {
    name: String,
    base_path: PathBuf,
}

impl CsvSink {
    /// Create a new CsvSink, creating the output directory
    pub fn new(name: impl Into<String>, base_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            name: name.into(),
            base_path,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, base_path_from_params(params))
    }

    pub fn records_path(&self, session_id: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_synced.csv", file_stem(session_id)))
    }

    pub fn coverage_path(&self, session_id: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_coverage.csv", file_stem(session_id)))
    }

    fn write_session(&self, outcome: &SessionOutcome) -> Result<(), ::csv::Error> {
        let mut writer = Writer::from_path(self.records_path(&outcome.session_id))?;
        for record in &outcome.outcome.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        write_coverage(
            &self.coverage_path(&outcome.session_id),
            &outcome.outcome.coverage,
        )
    }
}

/// Two-column `metric,value` table
fn write_coverage(path: &Path, coverage: &CoverageReport) -> Result<(), ::csv::Error> {
    let (scaling, origin, factor) = match coverage.frame_scaling {
        FrameScaling::Unchanged => ("unchanged", String::new(), String::new()),
        FrameScaling::Offset { offset } => ("offset", offset.to_string(), "1".to_string()),
        FrameScaling::Scaled { origin, factor } => {
            ("scaled", origin.to_string(), factor.to_string())
        }
        FrameScaling::Degenerate => ("degenerate", String::new(), String::new()),
    };

    let rows: [(&str, String); 16] = [
        ("strategy", coverage.strategy.to_string()),
        ("total_frames", coverage.total_frames.to_string()),
        ("matched_directly", coverage.matched_directly.to_string()),
        (
            "matched_by_interpolation",
            coverage.matched_by_interpolation.to_string(),
        ),
        ("matched_by_fallback", coverage.matched_by_fallback.to_string()),
        ("unmatched", coverage.unmatched.to_string()),
        ("coverage_ratio", format!("{:.6}", coverage.coverage_ratio())),
        ("time_offset_seconds", coverage.time_offset_seconds.to_string()),
        ("frame_scaling", scaling.to_string()),
        ("frame_origin", origin),
        ("frame_factor", factor),
        (
            "malformed_pressure_rows",
            coverage.malformed_pressure_rows.to_string(),
        ),
        (
            "malformed_frame_timestamps",
            coverage.malformed_frame_timestamps.to_string(),
        ),
        (
            "frames_out_of_video_range",
            coverage.frames_out_of_video_range.to_string(),
        ),
        ("pressure_missing", coverage.pressure_missing.to_string()),
        (
            "degenerate_frame_range",
            coverage.degenerate_frame_range.to_string(),
        ),
    ];

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["metric", "value"])?;
    for (metric, value) in &rows {
        writer.write_record([*metric, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Session ids become file names; path separators are not allowed through
pub(crate) fn file_stem(session_id: &str) -> String {
    session_id.replace(['/', '\\'], "_")
}

impl DataSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, outcome),
        fields(sink = %self.name, session = %outcome.session_id)
    )]
    async fn write(&mut self, outcome: &SessionOutcome) -> Result<(), ContractError> {
        self.write_session(outcome).map_err(|e| {
            error!(sink = %self.name, session = %outcome.session_id, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })?;
        debug!(
            sink = %self.name,
            records = outcome.outcome.records.len(),
            path = %self.records_path(&outcome.session_id).display(),
            "Session written"
        );
        Ok(())
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Each session is flushed on write
        Ok(())
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "CsvSink closed");
        Ok(())
    }
}
