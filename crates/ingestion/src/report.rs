//! Per-table row accounting

use std::fmt;

/// Rows read and skipped from one table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Data rows kept
    pub rows: usize,
    /// Data rows dropped (unparsable key field or ragged row)
    pub skipped: usize,
    /// Rows kept with an unparsable value (diameter → NaN)
    pub unparsed_values: usize,
}

impl TableStats {
    pub(crate) fn record(&self, table: &'static str) {
        metrics::counter!("vessel_sync_ingest_rows_total", "table" => table)
            .increment(self.rows as u64);
        if self.skipped > 0 {
            metrics::counter!("vessel_sync_ingest_rows_skipped_total", "table" => table)
                .increment(self.skipped as u64);
        }
    }
}

/// Load summary for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub diameter: TableStats,
    /// `None` when the session has no pressure log
    pub pressure: Option<TableStats>,
    /// `None` when the session has no frame/timestamp table
    pub timestamps: Option<TableStats>,
}

impl LoadReport {
    /// Rows dropped across all tables
    pub fn total_skipped(&self) -> usize {
        self.diameter.skipped
            + self.pressure.map_or(0, |s| s.skipped)
            + self.timestamps.map_or(0, |s| s.skipped)
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "diameter {} rows ({} skipped, {} NaN)",
            self.diameter.rows, self.diameter.skipped, self.diameter.unparsed_values
        )?;
        match self.pressure {
            Some(s) => write!(f, ", pressure {} rows ({} skipped)", s.rows, s.skipped)?,
            None => write!(f, ", no pressure")?,
        }
        match self.timestamps {
            Some(s) => write!(f, ", timestamps {} rows ({} skipped)", s.rows, s.skipped),
            None => write!(f, ", no timestamps"),
        }
    }
}
