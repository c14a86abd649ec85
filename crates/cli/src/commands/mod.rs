//! Command implementations.

mod elasticity;
mod info;
mod run;
mod validate;

pub use elasticity::run_elasticity;
pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use std::path::Path;

use crate::error::CliError;

/// Load and validate a configuration file
pub(crate) fn load_blueprint(path: &Path) -> Result<SessionBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Reject a non-positive `--total-frames`
pub(crate) fn check_total_frames(total_frames: Option<i64>) -> Result<()> {
    match total_frames {
        Some(n) if n <= 0 => Err(CliError::invalid_argument(
            "--total-frames",
            format!("must be > 0, got {n}"),
        )
        .into()),
        _ => Ok(()),
    }
}
