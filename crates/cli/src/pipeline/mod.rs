//! Batch alignment orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{load_session_outcome, Pipeline, PipelineConfig};
pub use stats::{FailedSession, PipelineStats, SessionSummary};
