//! Pipeline orchestrator - loads, aligns and dispatches every session.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{AlignmentConfig, ColumnAliases, SessionBlueprint, SessionConfig, SessionOutcome};
use ingestion::{CsvSeriesSource, SessionInputs};
use observability::{record_coverage_metrics, record_session_duration_ms, record_sink_totals};
use sync_engine::{AlignmentWorker, SyncOutcome};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use super::{FailedSession, PipelineStats, SessionSummary};
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The loaded configuration
    pub blueprint: SessionBlueprint,

    /// Only run this session (None = all)
    pub only_session: Option<String>,

    /// Total video frames applied to every selected session
    pub total_frames_override: Option<i64>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run every selected session to completion
    ///
    /// A session that fails to load or align is recorded and skipped; the
    /// run only fails when nothing succeeded.
    #[instrument(name = "pipeline_run", skip(self))]
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let sessions = blueprint.selected_sessions(self.config.only_session.as_deref());
        if let Some(ref id) = self.config.only_session {
            if sessions.is_empty() {
                return Err(CliError::session_not_found(id.clone()).into());
            }
        }
        if sessions.is_empty() {
            warn!("No sessions configured");
        }

        // Setup Dispatcher
        let (outcome_tx, outcome_rx) =
            mpsc::channel::<SessionOutcome>(self.config.buffer_size.max(1));
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - aligned sessions will only be summarized");
        }
        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), outcome_rx)
            .await
            .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();

        info!(
            sessions = sessions.len(),
            sinks = blueprint.sinks.len(),
            "Pipeline running"
        );

        let worker = AlignmentWorker::new(blueprint.alignment.clone());
        let mut stats = PipelineStats::default();

        for session in sessions {
            let session_start = Instant::now();
            let total_frames = self
                .config
                .total_frames_override
                .or(session.total_video_frames);

            match align_session(&worker, session, &blueprint.columns, total_frames).await {
                Ok(outcome) => {
                    let elapsed_ms = session_start.elapsed().as_secs_f64() * 1000.0;
                    record_session_duration_ms(elapsed_ms);
                    record_coverage_metrics(&session.id, &outcome.coverage);
                    stats.coverage.update(&outcome.coverage);
                    stats
                        .sessions
                        .push(SessionSummary::new(&session.id, &outcome));

                    let tagged = SessionOutcome {
                        session_id: session.id.clone(),
                        outcome,
                    };
                    if outcome_tx.send(tagged).await.is_err() {
                        warn!("Dispatcher channel closed");
                        break;
                    }
                }
                Err(e) => {
                    error!(session = %session.id, error = format!("{e:#}"), "Session failed");
                    stats.failed.push(FailedSession {
                        session_id: session.id.clone(),
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        // Wait for sinks to drain
        drop(outcome_tx);
        stats.sinks = dispatcher_handle
            .await
            .context("Dispatcher task panicked")?;
        for (name, snap) in &stats.sinks {
            record_sink_totals(name, snap.write_count, snap.failure_count);
        }
        stats.duration = start_time.elapsed();

        info!(
            succeeded = stats.sessions.len(),
            failed = stats.failed.len(),
            duration_secs = stats.duration.as_secs_f64(),
            "Pipeline finished"
        );

        if stats.sessions.is_empty() && !stats.failed.is_empty() {
            return Err(CliError::AllSessionsFailed {
                count: stats.failed.len(),
            }
            .into());
        }

        Ok(stats)
    }
}

/// Load one session's files and run them through the worker
async fn align_session(
    worker: &AlignmentWorker,
    session: &SessionConfig,
    columns: &ColumnAliases,
    total_frames: Option<i64>,
) -> Result<SyncOutcome> {
    let loaded = load_inputs(session, columns, total_frames).await?;
    let ticket = worker.submit(loaded.input);
    ticket
        .wait()
        .await
        .with_context(|| format!("Alignment failed for session '{}'", session.id))?
        .ok_or_else(|| anyhow::anyhow!("Alignment for session '{}' was superseded", session.id))
}

/// Read a session's tables off the async runtime
async fn load_inputs(
    session: &SessionConfig,
    columns: &ColumnAliases,
    total_frames: Option<i64>,
) -> Result<SessionInputs> {
    let source = CsvSeriesSource::from_session(session, columns);
    let loaded = tokio::task::spawn_blocking(move || SessionInputs::load(&source, total_frames))
        .await
        .context("Ingestion task panicked")?
        .with_context(|| format!("Failed to load session '{}'", session.id))?;

    info!(session = %session.id, report = %loaded.report, "Session inputs loaded");
    Ok(loaded)
}

/// Load and align one session in place (used by `elasticity`)
pub async fn load_session_outcome(
    session: &SessionConfig,
    columns: &ColumnAliases,
    alignment: &AlignmentConfig,
    total_frames: Option<i64>,
) -> Result<SyncOutcome> {
    let worker = AlignmentWorker::new(alignment.clone());
    align_session(&worker, session, columns, total_frames).await
}
