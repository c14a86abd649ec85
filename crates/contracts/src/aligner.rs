//! Aligner trait - engine entry point seen by callers

use crate::{AlignmentInput, ContractError, SyncOutcome};

/// Turns one set of raw inputs into a synchronized outcome.
///
/// Implementations must not keep state between calls: each call behaves as
/// a fresh run.
pub trait Aligner: Send + Sync {
    fn align(&self, input: AlignmentInput) -> Result<SyncOutcome, ContractError>;
}
