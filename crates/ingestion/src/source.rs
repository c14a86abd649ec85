//! File-backed series source and per-session loading

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use contracts::{
    AlignmentInput, ColumnAliases, DiameterRecord, RawFrameTimestamp, RawPressureRow,
    SeriesSource, SessionConfig,
};
use tracing::{info, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::report::{LoadReport, TableStats};
use crate::tables;

/// Reads one session's tables from CSV files
#[derive(Debug, Clone)]
pub struct CsvSeriesSource {
    id: String,
    diameter_path: PathBuf,
    pressure_path: Option<PathBuf>,
    timestamps_path: Option<PathBuf>,
    aliases: ColumnAliases,
}

impl CsvSeriesSource {
    pub fn new(id: impl Into<String>, diameter_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            diameter_path: diameter_path.into(),
            pressure_path: None,
            timestamps_path: None,
            aliases: ColumnAliases::default(),
        }
    }

    pub fn from_session(session: &SessionConfig, aliases: &ColumnAliases) -> Self {
        Self {
            id: session.id.clone(),
            diameter_path: session.diameter_path.clone(),
            pressure_path: session.pressure_path.clone(),
            timestamps_path: session.timestamps_path.clone(),
            aliases: aliases.clone(),
        }
    }

    pub fn with_pressure(mut self, path: impl Into<PathBuf>) -> Self {
        self.pressure_path = Some(path.into());
        self
    }

    pub fn with_timestamps(mut self, path: impl Into<PathBuf>) -> Self {
        self.timestamps_path = Some(path.into());
        self
    }

    pub fn with_aliases(mut self, aliases: ColumnAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn read_diameter(&self) -> Result<(Vec<DiameterRecord>, TableStats)> {
        let reader = open(&self.diameter_path)?;
        tables::read_diameter(reader, &self.aliases, &self.diameter_path)
    }

    /// `None` when no pressure path is configured or the file does not exist
    pub fn read_pressure(&self) -> Result<Option<(Vec<RawPressureRow>, TableStats)>> {
        let Some(path) = self.optional_path(self.pressure_path.as_deref(), "pressure") else {
            return Ok(None);
        };
        let reader = open(path)?;
        tables::read_pressure(reader, path).map(Some)
    }

    /// `None` when no timestamp path is configured or the file does not exist
    pub fn read_frame_timestamps(&self) -> Result<Option<(Vec<RawFrameTimestamp>, TableStats)>> {
        let Some(path) = self.optional_path(self.timestamps_path.as_deref(), "timestamps") else {
            return Ok(None);
        };
        let reader = open(path)?;
        tables::read_frame_timestamps(reader, &self.aliases, path).map(Some)
    }

    fn optional_path<'a>(&self, path: Option<&'a Path>, table: &'static str) -> Option<&'a Path> {
        let path = path?;
        if path.exists() {
            Some(path)
        } else {
            warn!(session = %self.id, table, path = %path.display(), "configured file not found, skipping");
            None
        }
    }
}

impl SeriesSource for CsvSeriesSource {
    type Error = IngestionError;

    fn source_id(&self) -> &str {
        &self.id
    }

    fn load_diameter(&self) -> Result<Vec<DiameterRecord>> {
        self.read_diameter().map(|(rows, _)| rows)
    }

    fn load_pressure(&self) -> Result<Option<Vec<RawPressureRow>>> {
        Ok(self.read_pressure()?.map(|(rows, _)| rows))
    }

    fn load_frame_timestamps(&self) -> Result<Option<Vec<RawFrameTimestamp>>> {
        Ok(self.read_frame_timestamps()?.map(|(rows, _)| rows))
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IngestionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Assemble an `AlignmentInput` from any series source
pub fn collect_input<S: SeriesSource>(
    source: &S,
    total_video_frames: Option<i64>,
) -> std::result::Result<AlignmentInput, S::Error> {
    Ok(AlignmentInput {
        diameter: source.load_diameter()?,
        pressure: source.load_pressure()?,
        frame_timestamps: source.load_frame_timestamps()?,
        total_video_frames,
    })
}

/// Everything loaded for one session
#[derive(Debug, Clone)]
pub struct SessionInputs {
    pub session_id: String,
    pub input: AlignmentInput,
    pub report: LoadReport,
}

impl SessionInputs {
    /// Read all tables of a session.
    ///
    /// A timestamp table without the expected columns is logged and ignored;
    /// the run continues on the remaining clock information.
    #[instrument(name = "session_inputs_load", skip(source), fields(session = %source.source_id()))]
    pub fn load(source: &CsvSeriesSource, total_video_frames: Option<i64>) -> Result<Self> {
        let (diameter, diameter_stats) = source.read_diameter()?;
        let pressure = source.read_pressure()?;
        let timestamps = match source.read_frame_timestamps() {
            Ok(t) => t,
            Err(err @ IngestionError::MissingColumn { .. }) => {
                warn!(error = %err, "ignoring timestamp table");
                None
            }
            Err(err) => return Err(err),
        };

        let report = LoadReport {
            diameter: diameter_stats,
            pressure: pressure.as_ref().map(|(_, s)| *s),
            timestamps: timestamps.as_ref().map(|(_, s)| *s),
        };
        info!(%report, "session loaded");

        Ok(Self {
            session_id: source.source_id().to_string(),
            input: AlignmentInput {
                diameter,
                pressure: pressure.map(|(rows, _)| rows),
                frame_timestamps: timestamps.map(|(rows, _)| rows),
                total_video_frames,
            },
            report,
        })
    }
}
