//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

use super::{check_total_frames, load_blueprint};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");
    check_total_frames(args.total_frames)?;

    let blueprint = load_blueprint(&args.config)?;

    if let Some(total) = args.total_frames {
        info!(total_frames = total, "Overriding total video frames from CLI");
    }

    info!(
        sessions = blueprint.sessions.len(),
        sinks = blueprint.sinks.len(),
        tolerance_s = blueprint.alignment.tolerance_seconds,
        threshold = blueprint.alignment.direct_coverage_threshold,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint, args.session.as_deref());
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        only_session: args.session.clone(),
        total_frames_override: args.total_frames,
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = pipeline.run() => {
            let stats = result.context("Pipeline execution failed")?;
            if args.json {
                println!("{}", stats.to_json().context("Failed to serialize run summary")?);
            } else {
                stats.print_summary();
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping...");
        }
    }

    info!("Vessel Sync finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM; never resolves if no handler can be installed
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::SessionBlueprint, only: Option<&str>) {
    let alignment = &blueprint.alignment;
    println!("\n=== Configuration Summary ===\n");
    println!("Alignment:");
    println!("  Tolerance: {}s", alignment.tolerance_seconds);
    println!("  Direct threshold: {}", alignment.direct_coverage_threshold);
    println!("  Extrapolation: {:?}", alignment.extrapolation);
    println!("  Normalize origin: {}", alignment.normalize_origin);

    let sessions = blueprint.selected_sessions(only);
    println!("\nSessions ({}):", sessions.len());
    for session in sessions {
        let pressure = if session.pressure_path.is_some() {
            "pressure"
        } else {
            "no pressure"
        };
        let stamps = if session.timestamps_path.is_some() {
            "timestamps"
        } else {
            "no timestamps"
        };
        println!("  - {} ({}, {})", session.id, pressure, stamps);
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
