//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    session_count: usize,
    sessions_with_pressure: usize,
    sessions_with_timestamps: usize,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    session_count: blueprint.sessions.len(),
                    sessions_with_pressure: blueprint
                        .sessions
                        .iter()
                        .filter(|s| s.pressure_path.is_some())
                        .count(),
                    sessions_with_timestamps: blueprint
                        .sessions
                        .iter()
                        .filter(|s| s.timestamps_path.is_some())
                        .count(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sessions.is_empty() {
        warnings.push("No sessions configured - nothing to align".to_string());
    }

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - results will only be summarized".to_string());
    }

    for session in &blueprint.sessions {
        if !session.diameter_path.exists() {
            warnings.push(format!(
                "Session '{}': diameter file {} does not exist",
                session.id,
                session.diameter_path.display()
            ));
        }
        match &session.pressure_path {
            None => warnings.push(format!(
                "Session '{}' has no pressure log - output will be diameter only",
                session.id
            )),
            Some(path) if !path.exists() => warnings.push(format!(
                "Session '{}': pressure file {} does not exist",
                session.id,
                path.display()
            )),
            Some(_) => {}
        }
        if session.timestamps_path.is_none() && session.pressure_path.is_some() {
            warnings.push(format!(
                "Session '{}' has no frame timestamps - alignment needs time columns or falls back to frame index",
                session.id
            ));
        }
        if session.total_video_frames.is_none() {
            warnings.push(format!(
                "Session '{}' has no total_video_frames - frame numbers are kept as-is",
                session.id
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Sessions: {}", summary.session_count);
            println!("  With pressure: {}", summary.sessions_with_pressure);
            println!("  With timestamps: {}", summary.sessions_with_timestamps);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SessionConfig;

    #[test]
    fn test_warnings_for_sparse_session() {
        let blueprint = SessionBlueprint {
            sessions: vec![SessionConfig::new("s1", "/definitely/not/here.csv")],
            ..Default::default()
        };
        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("No sinks")));
        assert!(warnings.iter().any(|w| w.contains("does not exist")));
        assert!(warnings.iter().any(|w| w.contains("diameter only")));
        assert!(warnings.iter().any(|w| w.contains("total_video_frames")));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "/definitely/not/here.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
