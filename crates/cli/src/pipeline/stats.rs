//! Pipeline statistics and summaries.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::CoverageAggregator;
use serde::Serialize;
use sync_engine::SyncOutcome;

/// Per-session line of the run summary
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub strategy: String,
    pub records: usize,
    pub with_pressure: usize,
    pub coverage_ratio: f64,
    pub time_offset_seconds: f64,
    pub degraded: bool,
}

impl SessionSummary {
    pub fn new(session_id: &str, outcome: &SyncOutcome) -> Self {
        let coverage = &outcome.coverage;
        Self {
            session_id: session_id.to_string(),
            strategy: coverage.strategy.to_string(),
            records: coverage.total_frames,
            with_pressure: coverage.matched(),
            coverage_ratio: coverage.coverage_ratio(),
            time_offset_seconds: coverage.time_offset_seconds,
            degraded: coverage.is_degraded(),
        }
    }
}

/// A session that could not be loaded or aligned
#[derive(Debug, Clone, Serialize)]
pub struct FailedSession {
    pub session_id: String,
    pub error: String,
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Sessions aligned, in run order
    pub sessions: Vec<SessionSummary>,

    /// Sessions skipped after an error
    pub failed: Vec<FailedSession>,

    /// Final per-sink metrics
    pub sinks: Vec<(String, MetricsSnapshot)>,

    /// Total duration of the run
    pub duration: Duration,

    /// Coverage aggregated across sessions
    pub coverage: CoverageAggregator,
}

#[derive(Serialize)]
struct SinkReport<'a> {
    name: &'a str,
    written: u64,
    failed: u64,
    dropped: u64,
    records: u64,
}

#[derive(Serialize)]
struct RunReport<'a> {
    duration_secs: f64,
    sessions: &'a [SessionSummary],
    failed: &'a [FailedSession],
    sinks: Vec<SinkReport<'a>>,
}

impl PipelineStats {
    /// Render the run as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let report = RunReport {
            duration_secs: self.duration.as_secs_f64(),
            sessions: &self.sessions,
            failed: &self.failed,
            sinks: self
                .sinks
                .iter()
                .map(|(name, snap)| SinkReport {
                    name,
                    written: snap.write_count,
                    failed: snap.failure_count,
                    dropped: snap.dropped_count,
                    records: snap.record_count,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Alignment Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Sessions aligned: {}", self.sessions.len());
        println!("   └─ Sessions failed: {}", self.failed.len());

        if !self.sessions.is_empty() {
            println!("\n📈 Sessions");
            for (i, s) in self.sessions.iter().enumerate() {
                let prefix = if i == self.sessions.len() - 1 { "└─" } else { "├─" };
                let flag = if s.degraded { " ⚠" } else { "" };
                println!(
                    "   {} {}: {}, {}/{} with pressure ({:.1}%), offset {:.3}s{}",
                    prefix,
                    s.session_id,
                    s.strategy,
                    s.with_pressure,
                    s.records,
                    s.coverage_ratio * 100.0,
                    s.time_offset_seconds,
                    flag
                );
            }
        }

        if !self.failed.is_empty() {
            println!("\n⚠️  Failed Sessions");
            for (i, f) in self.failed.iter().enumerate() {
                let prefix = if i == self.failed.len() - 1 { "└─" } else { "├─" };
                println!("   {} {}: {}", prefix, f.session_id, f.error);
            }
        }

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, snap)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} written, {} failed, {} records",
                    prefix, name, snap.write_count, snap.failure_count, snap.record_count
                );
            }
        }

        println!("\n{}", self.coverage.summary());
    }
}
