//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

use super::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    alignment: AlignmentInfo,
    sessions: Vec<SessionInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct AlignmentInfo {
    tolerance_seconds: f64,
    direct_coverage_threshold: f64,
    extrapolation: String,
    normalize_origin: bool,
}

#[derive(Serialize)]
struct SessionInfo {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_video_frames: Option<i64>,
    has_pressure: bool,
    has_timestamps: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<SessionPaths>,
}

#[derive(Serialize)]
struct SessionPaths {
    diameter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pressure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_path: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &SessionBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sessions = blueprint
        .sessions
        .iter()
        .map(|s| SessionInfo {
            id: s.id.clone(),
            total_video_frames: s.total_video_frames,
            has_pressure: s.pressure_path.is_some(),
            has_timestamps: s.timestamps_path.is_some(),
            paths: args.paths.then(|| SessionPaths {
                diameter: s.diameter_path.display().to_string(),
                pressure: s.pressure_path.as_ref().map(|p| p.display().to_string()),
                timestamps: s.timestamps_path.as_ref().map(|p| p.display().to_string()),
            }),
        })
        .collect();

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                base_path: s.params.get("base_path").cloned(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let alignment = &blueprint.alignment;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        alignment: AlignmentInfo {
            tolerance_seconds: alignment.tolerance_seconds,
            direct_coverage_threshold: alignment.direct_coverage_threshold,
            extrapolation: format!("{:?}", alignment.extrapolation),
            normalize_origin: alignment.normalize_origin,
        },
        sessions,
        sinks,
    }
}

fn print_config_info(blueprint: &SessionBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Vessel Sync Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Alignment settings
    let alignment = &blueprint.alignment;
    println!("⚙️  Alignment");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Tolerance: {}s", alignment.tolerance_seconds);
    println!(
        "   ├─ Direct coverage threshold: {}",
        alignment.direct_coverage_threshold
    );
    println!("   ├─ Extrapolation: {:?}", alignment.extrapolation);
    println!("   └─ Normalize origin: {}", alignment.normalize_origin);

    // Sessions
    println!("\n🩺 Sessions ({})", blueprint.sessions.len());
    for (i, session) in blueprint.sessions.iter().enumerate() {
        let is_last = i == blueprint.sessions.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let frames = session
            .total_video_frames
            .map_or_else(|| "unknown".to_string(), |n| n.to_string());
        println!("   {} {} ({} video frames)", prefix, session.id, frames);

        if args.paths {
            println!(
                "   {}  ├─ diameter: {}",
                child_prefix,
                session.diameter_path.display()
            );
            match &session.pressure_path {
                Some(p) => println!("   {}  ├─ pressure: {}", child_prefix, p.display()),
                None => println!("   {}  ├─ pressure: (none)", child_prefix),
            }
            match &session.timestamps_path {
                Some(p) => println!("   {}  └─ timestamps: {}", child_prefix, p.display()),
                None => println!("   {}  └─ timestamps: (none)", child_prefix),
            }
        }
    }

    // Sinks
    if args.sinks && !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            match sink.params.get("base_path") {
                Some(base) => println!("   {} {} ({:?}) → {}", prefix, sink.name, sink.sink_type, base),
                None => println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type),
            }
        }
    }

    println!();
}
