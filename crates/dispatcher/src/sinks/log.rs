//! LogSink - logs session coverage via tracing

use contracts::{ContractError, DataSink, SessionOutcome};
use tracing::{info, instrument, warn};

/// Sink that logs per-session coverage summaries
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_session_summary(&self, outcome: &SessionOutcome) {
        let coverage = &outcome.outcome.coverage;

        info!(
            sink = %self.name,
            session = %outcome.session_id,
            strategy = %coverage.strategy,
            records = coverage.total_frames,
            direct = coverage.matched_directly,
            interpolated = coverage.matched_by_interpolation,
            fallback = coverage.matched_by_fallback,
            unmatched = coverage.unmatched,
            coverage = coverage.coverage_ratio(),
            offset_s = coverage.time_offset_seconds,
            "Session aligned"
        );

        if coverage.is_degraded() {
            warn!(
                sink = %self.name,
                session = %outcome.session_id,
                pressure_missing = coverage.pressure_missing,
                degenerate_frame_range = coverage.degenerate_frame_range,
                malformed_pressure_rows = coverage.malformed_pressure_rows,
                malformed_frame_timestamps = coverage.malformed_frame_timestamps,
                out_of_range = coverage.frames_out_of_video_range,
                "Session alignment degraded"
            );
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, outcome),
        fields(sink = %self.name, session = %outcome.session_id)
    )]
    async fn write(&mut self, outcome: &SessionOutcome) -> Result<(), ContractError> {
        self.log_session_summary(outcome);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
