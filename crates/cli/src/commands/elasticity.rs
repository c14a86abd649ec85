//! `elasticity` command implementation.

use anyhow::{Context, Result};
use contracts::{ElasticityAssessment, ElasticityInput, ElasticityMetrics, SyncedRecord};
use serde::Serialize;
use std::path::Path;
use sync_engine::{classify, compute_elasticity};
use tracing::{debug, info};

use crate::cli::ElasticityArgs;
use crate::error::CliError;
use crate::pipeline::load_session_outcome;

use super::{check_total_frames, load_blueprint};

#[derive(Serialize)]
struct ElasticityReport<'a> {
    session_id: &'a str,
    baseline_frame: i64,
    compressed_frame: i64,
    baseline_record: &'a SyncedRecord,
    compressed_record: &'a SyncedRecord,
    input: &'a ElasticityInput,
    metrics: &'a ElasticityMetrics,
    assessment: &'a ElasticityAssessment,
}

/// One row of the `--output` CSV
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    parameter: &'a str,
    value: Option<f64>,
    unit: &'a str,
    band: Option<&'a str>,
    baseline_video_frame: Option<i64>,
    compressed_video_frame: Option<i64>,
    baseline_frame_index: i64,
    compressed_frame_index: i64,
    baseline_provenance: &'a str,
    compressed_provenance: &'a str,
    baseline_diameter_mm: f64,
    compressed_diameter_mm: f64,
    baseline_pressure_n: f64,
    compressed_pressure_n: f64,
    probe_area_cm2: f64,
}

/// The picked records plus everything derived from them
struct Measurement<'a> {
    baseline: &'a SyncedRecord,
    compressed: &'a SyncedRecord,
    input: ElasticityInput,
    metrics: ElasticityMetrics,
    assessment: ElasticityAssessment,
}

/// Execute the `elasticity` command
pub async fn run_elasticity(args: &ElasticityArgs) -> Result<()> {
    check_total_frames(args.total_frames)?;
    let blueprint = load_blueprint(&args.config)?;
    let session = blueprint
        .session(&args.session)
        .ok_or_else(|| CliError::session_not_found(args.session.clone()))?;

    let total_frames = args.total_frames.or(session.total_video_frames);
    let outcome = load_session_outcome(
        session,
        &blueprint.columns,
        &blueprint.alignment,
        total_frames,
    )
    .await?;

    let baseline = ElasticityInput::pick_record(&outcome, args.baseline, "baseline")
        .context("Cannot pick baseline frame")?;
    let compressed = ElasticityInput::pick_record(&outcome, args.compressed, "compressed")
        .context("Cannot pick compressed frame")?;
    for (requested, record) in [(args.baseline, baseline), (args.compressed, compressed)] {
        if record.video_frame != Some(requested) {
            debug!(
                requested,
                picked = ?record.video_frame,
                "No record on requested frame, using nearest"
            );
        }
    }

    let input = ElasticityInput::from_records(baseline, compressed, args.probe_area)
        .context("Cannot pick measurement frames")?;
    let metrics = compute_elasticity(&input).context("Invalid elasticity inputs")?;
    let m = Measurement {
        baseline,
        compressed,
        input,
        metrics,
        assessment: classify(&metrics),
    };

    info!(
        session = %session.id,
        strain = m.metrics.strain,
        pem_mmhg = ?m.metrics.pem_mmhg,
        beta = ?m.metrics.beta,
        "Elasticity computed"
    );

    if let Some(path) = &args.output {
        write_export(path, &m)?;
        info!(path = %path.display(), "Elasticity CSV written");
    }

    if args.json {
        let report = ElasticityReport {
            session_id: &session.id,
            baseline_frame: args.baseline,
            compressed_frame: args.compressed,
            baseline_record: m.baseline,
            compressed_record: m.compressed,
            input: &m.input,
            metrics: &m.metrics,
            assessment: &m.assessment,
        };
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize elasticity report")?;
        println!("{}", json);
    } else {
        print_elasticity(&session.id, &m);
    }

    Ok(())
}

fn export_rows<'a>(m: &'a Measurement<'a>) -> Vec<ExportRow<'a>> {
    let metrics = &m.metrics;
    let bands = &m.assessment;
    let indices = [
        ("strain", Some(metrics.strain), "dimensionless", Some(bands.strain.as_str())),
        (
            "pem",
            metrics.pem_mmhg,
            "mmHg",
            bands.pem.map(|b| b.as_str()),
        ),
        (
            "beta",
            metrics.beta,
            "dimensionless",
            bands.beta.map(|b| b.as_str()),
        ),
        (
            "distensibility",
            metrics.distensibility,
            "1e-5/Pa",
            bands.distensibility.map(|b| b.as_str()),
        ),
    ];

    indices
        .into_iter()
        .map(|(parameter, value, unit, band)| ExportRow {
            parameter,
            value,
            unit,
            band,
            baseline_video_frame: m.baseline.video_frame,
            compressed_video_frame: m.compressed.video_frame,
            baseline_frame_index: m.baseline.frame_index,
            compressed_frame_index: m.compressed.frame_index,
            baseline_provenance: m.baseline.provenance.as_str(),
            compressed_provenance: m.compressed.provenance.as_str(),
            baseline_diameter_mm: m.input.baseline.diameter_mm,
            compressed_diameter_mm: m.input.compressed.diameter_mm,
            baseline_pressure_n: m.input.baseline.pressure_newton,
            compressed_pressure_n: m.input.compressed.pressure_newton,
            probe_area_cm2: m.input.probe_area_cm2,
        })
        .collect()
}

fn write_export(path: &Path, m: &Measurement<'_>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in export_rows(m) {
        writer
            .serialize(row)
            .context("Failed to write elasticity row")?;
    }
    writer.flush().context("Failed to flush elasticity CSV")?;
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| format!("{v:.precision$}"))
}

fn describe(record: &SyncedRecord) -> String {
    match record.video_frame {
        Some(vf) => format!("frame {} (video {})", record.frame_index, vf),
        None => format!("frame {}", record.frame_index),
    }
}

fn print_elasticity(session_id: &str, m: &Measurement<'_>) {
    let (input, metrics, bands) = (&m.input, &m.metrics, &m.assessment);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Vessel Elasticity                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🩺 Session {}", session_id);
    println!(
        "   ├─ Baseline {}: {:.3} mm, {:.3} N ({:.2} mmHg, {})",
        describe(m.baseline),
        input.baseline.diameter_mm,
        input.baseline.pressure_newton,
        metrics.baseline_pressure_mmhg,
        m.baseline.provenance.as_str()
    );
    println!(
        "   ├─ Compressed {}: {:.3} mm, {:.3} N ({:.2} mmHg, {})",
        describe(m.compressed),
        input.compressed.diameter_mm,
        input.compressed.pressure_newton,
        metrics.compressed_pressure_mmhg,
        m.compressed.provenance.as_str()
    );
    println!("   └─ Probe area: {} cm²", input.probe_area_cm2);

    println!("\n📈 Indices");
    println!(
        "   ├─ Strain (ε): {:.4} [{}]",
        metrics.strain,
        bands.strain.as_str()
    );
    println!(
        "   ├─ ΔP: {:.2} mmHg ({:.1} Pa)",
        metrics.delta_pressure_mmhg, metrics.delta_pressure_pa
    );
    println!(
        "   ├─ PEM: {} mmHg ({} Pa) [{}]",
        fmt_opt(metrics.pem_mmhg, 2),
        fmt_opt(metrics.pem_pa, 1),
        fmt_band(bands.pem.map(|b| b.as_str()))
    );
    println!(
        "   ├─ Stiffness β: {} [{}]",
        fmt_opt(metrics.beta, 3),
        fmt_band(bands.beta.map(|b| b.as_str()))
    );
    println!(
        "   └─ Distensibility: {} (10⁻⁵/Pa) [{}]",
        fmt_opt(metrics.distensibility, 4),
        fmt_band(bands.distensibility.map(|b| b.as_str()))
    );
    println!();
}

fn fmt_band(band: Option<&str>) -> &str {
    band.unwrap_or("undefined")
}
