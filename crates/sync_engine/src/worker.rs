//! Off-thread alignment runs with supersession.
//!
//! Each submission bumps a generation counter. A ticket whose generation is
//! no longer the latest reports itself superseded and its result is dropped,
//! so a slow earlier run never overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{AlignmentConfig, AlignmentInput, ContractError, SyncOutcome};
use tokio::sync::oneshot;

use crate::SyncEngine;

type RunResult = Result<SyncOutcome, ContractError>;

/// Runs `SyncEngine::run` on the blocking pool
#[derive(Debug, Clone)]
pub struct AlignmentWorker {
    config: AlignmentConfig,
    latest: Arc<AtomicU64>,
}

/// Handle to one submitted run
#[derive(Debug)]
pub struct AlignmentTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
    rx: oneshot::Receiver<RunResult>,
}

impl AlignmentWorker {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Generation of the most recent submission (0 before any)
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Submit a run, superseding every earlier ticket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, input: AlignmentInput) -> AlignmentTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let (tx, rx) = oneshot::channel();
        let config = self.config.clone();
        let latest = Arc::clone(&self.latest);

        tokio::task::spawn_blocking(move || {
            if latest.load(Ordering::Acquire) != generation {
                tracing::debug!(generation, "alignment superseded before start");
                return;
            }
            let _span = tracing::info_span!("alignment_worker_run", generation).entered();
            let result = SyncEngine::run(config, input);
            // Receiver may already be gone
            let _ = tx.send(result);
        });

        AlignmentTicket {
            generation,
            latest: Arc::clone(&self.latest),
            rx,
        }
    }
}

impl AlignmentTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.generation
    }

    /// Wait for the result. `Ok(None)` when a newer submission superseded
    /// this one.
    pub async fn wait(self) -> Result<Option<SyncOutcome>, ContractError> {
        let Self {
            generation,
            latest,
            rx,
        } = self;
        let received = rx.await;

        if latest.load(Ordering::Acquire) != generation {
            metrics::counter!("vessel_sync_superseded_total").increment(1);
            tracing::debug!(generation, "discarding superseded alignment result");
            return Ok(None);
        }

        match received {
            Ok(result) => result.map(Some),
            Err(_) => Err(ContractError::Other(format!(
                "alignment worker for generation {generation} exited without a result"
            ))),
        }
    }
}
