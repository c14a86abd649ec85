//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Vessel Sync - align ultrasound diameter series with pressure logs
#[derive(Parser, Debug)]
#[command(
    name = "vessel-sync",
    author,
    version,
    about = "Vessel diameter / pressure alignment",
    long_about = "Aligns per-frame vessel diameter measurements with an independently \n\
                  clocked pressure log, reports how each pressure value was obtained, \n\
                  and writes the synchronized series to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VESSEL_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VESSEL_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align every configured session (or one) and dispatch the results
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Compute elasticity indices between two frames of one session
    Elasticity(ElasticityArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "sessions.toml",
        env = "VESSEL_SYNC_CONFIG"
    )]
    pub config: PathBuf,

    /// Only run this session id
    #[arg(short, long)]
    pub session: Option<String>,

    /// Override total video frames for every selected session
    #[arg(long, env = "VESSEL_SYNC_TOTAL_FRAMES")]
    pub total_frames: Option<i64>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Validate configuration and exit without aligning
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size between alignment and sinks
    #[arg(long, default_value = "16", env = "VESSEL_SYNC_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "VESSEL_SYNC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sessions.toml", env = "VESSEL_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sessions.toml", env = "VESSEL_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show input file paths for each session
    #[arg(long)]
    pub paths: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Arguments for the `elasticity` command
#[derive(Parser, Debug)]
pub struct ElasticityArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sessions.toml", env = "VESSEL_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Session id
    #[arg(short, long)]
    pub session: String,

    /// Baseline (uncompressed) video frame
    #[arg(long)]
    pub baseline: i64,

    /// Compressed video frame
    #[arg(long)]
    pub compressed: i64,

    /// Probe contact area in cm²
    #[arg(long, default_value = "1.0")]
    pub probe_area: f64,

    /// Override total video frames for the session
    #[arg(long)]
    pub total_frames: Option<i64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the indices to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
