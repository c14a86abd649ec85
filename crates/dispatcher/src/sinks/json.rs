//! JsonSink - one JSON document per session

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use contracts::{ContractError, CoverageReport, DataSink, OverlapResult, SessionOutcome, SyncedRecord};
use serde::Serialize;
use tracing::{debug, error, instrument};

use super::base_path_from_params;
use super::csv::file_stem;

/// Document layout written to `<session>.json`
#[derive(Serialize)]
struct SessionDocument<'a> {
    session_id: &'a str,
    generated_at: DateTime<Utc>,
    coverage: &'a CoverageReport,
    overlap: Option<&'a OverlapResult>,
    records: &'a [SyncedRecord],
}

/// Sink that writes the full outcome of each session as JSON
pub struct JsonSink {
    name: String,
    base_path: PathBuf,
    pretty: bool,
}

impl JsonSink {
    /// Create a new JsonSink, creating the output directory
    pub fn new(name: impl Into<String>, base_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            name: name.into(),
            base_path,
            pretty: true,
        })
    }

    /// Create from params map (for factory)
    ///
    /// `pretty = "false"` writes compact JSON.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let mut sink = Self::new(name, base_path_from_params(params))?;
        sink.pretty = params.get("pretty").map_or(true, |v| v != "false");
        Ok(sink)
    }

    pub fn document_path(&self, session_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", file_stem(session_id)))
    }

    fn write_document(&self, outcome: &SessionOutcome) -> std::io::Result<()> {
        let doc = SessionDocument {
            session_id: &outcome.session_id,
            generated_at: Utc::now(),
            coverage: &outcome.outcome.coverage,
            overlap: outcome.outcome.overlap.as_ref(),
            records: &outcome.outcome.records,
        };

        let file = BufWriter::new(File::create(self.document_path(&outcome.session_id))?);
        let result = if self.pretty {
            serde_json::to_writer_pretty(file, &doc)
        } else {
            serde_json::to_writer(file, &doc)
        };
        result.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl DataSink for JsonSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "json_sink_write",
        skip(self, outcome),
        fields(sink = %self.name, session = %outcome.session_id)
    )]
    async fn write(&mut self, outcome: &SessionOutcome) -> Result<(), ContractError> {
        self.write_document(outcome).map_err(|e| {
            error!(sink = %self.name, session = %outcome.session_id, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(name = "json_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "json_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "JsonSink closed");
        Ok(())
    }
}
