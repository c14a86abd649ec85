//! CSV table readers
//!
//! Column aliases are resolved here, once, so the engine never sees header
//! names. Readers are generic over `Read` so fixtures can be in-memory.

use std::io::Read;
use std::path::Path;

use contracts::{ColumnAliases, DiameterRecord, RawFrameTimestamp, RawPressureRow, TimePoint};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{IngestionError, Result};
use crate::report::TableStats;

/// Diameter table: frame (or row position), diameter, optional pressure and time
pub fn read_diameter<R: Read>(
    reader: R,
    aliases: &ColumnAliases,
    path: &Path,
) -> Result<(Vec<DiameterRecord>, TableStats)> {
    let mut rdr = csv_reader(reader);
    let headers = read_headers(&mut rdr, path)?;
    let names: Vec<&str> = headers.iter().collect();

    let diameter_col = ColumnAliases::find(&aliases.diameter, &names).ok_or_else(|| {
        IngestionError::MissingColumn {
            table: "diameter",
            path: path.to_path_buf(),
            aliases: aliases.diameter.clone(),
        }
    })?;
    let frame_col = ColumnAliases::find(&aliases.frame, &names);
    let pressure_col = ColumnAliases::find(&aliases.pressure, &names);
    let time_col = ColumnAliases::find(&aliases.time, &names);
    if frame_col.is_none() {
        debug!(path = %path.display(), "no frame column, using row position");
    }

    let mut stats = TableStats::default();
    let mut rows = Vec::new();
    for (position, record) in rdr.records().enumerate() {
        let Some(record) = next_record(record, path, &mut stats)? else {
            continue;
        };

        let frame_index = match frame_col {
            Some(col) => match record.get(col).and_then(parse_frame) {
                Some(frame) => frame,
                None => {
                    debug!(position, "skipping diameter row with unparsable frame");
                    stats.skipped += 1;
                    continue;
                }
            },
            None => position as i64,
        };

        let diameter_mm = match record.get(diameter_col).and_then(parse_number) {
            Some(d) => d,
            None => {
                stats.unparsed_values += 1;
                f64::NAN
            }
        };

        let mut row = DiameterRecord::new(frame_index, diameter_mm);
        row.embedded_pressure = pressure_col
            .and_then(|col| record.get(col))
            .and_then(parse_number);
        row.time = time_col
            .and_then(|col| record.get(col))
            .and_then(parse_number)
            .map(TimePoint::from_seconds);
        rows.push(row);
        stats.rows += 1;
    }

    stats.record("diameter");
    Ok((rows, stats))
}

/// Pressure log: positional, first column raw timestamp, second value
pub fn read_pressure<R: Read>(reader: R, path: &Path) -> Result<(Vec<RawPressureRow>, TableStats)> {
    let mut rdr = csv_reader(reader);
    read_headers(&mut rdr, path)?;

    let mut stats = TableStats::default();
    let mut rows = Vec::new();
    for (position, record) in rdr.records().enumerate() {
        let Some(record) = next_record(record, path, &mut stats)? else {
            continue;
        };
        let timestamp = record.get(0).unwrap_or_default();
        match record.get(1).and_then(parse_number).filter(|v| v.is_finite()) {
            Some(value) => {
                rows.push(RawPressureRow::new(timestamp, value));
                stats.rows += 1;
            }
            None => {
                debug!(position, "skipping pressure row with unparsable value");
                stats.skipped += 1;
            }
        }
    }

    stats.record("pressure");
    Ok((rows, stats))
}

/// Frame/timestamp table: frame number plus `HH:MM:SS.mmm`
pub fn read_frame_timestamps<R: Read>(
    reader: R,
    aliases: &ColumnAliases,
    path: &Path,
) -> Result<(Vec<RawFrameTimestamp>, TableStats)> {
    let mut rdr = csv_reader(reader);
    let headers = read_headers(&mut rdr, path)?;
    let names: Vec<&str> = headers.iter().collect();

    let missing = |aliases: &[String]| IngestionError::MissingColumn {
        table: "timestamps",
        path: path.to_path_buf(),
        aliases: aliases.to_vec(),
    };
    let frame_col = ColumnAliases::find(&aliases.timestamp_frame, &names)
        .ok_or_else(|| missing(&aliases.timestamp_frame))?;
    let time_col = ColumnAliases::find(&aliases.timestamp, &names)
        .ok_or_else(|| missing(&aliases.timestamp))?;

    let mut stats = TableStats::default();
    let mut rows = Vec::new();
    for (position, record) in rdr.records().enumerate() {
        let Some(record) = next_record(record, path, &mut stats)? else {
            continue;
        };
        match (record.get(frame_col).and_then(parse_frame), record.get(time_col)) {
            (Some(frame), Some(raw)) => {
                rows.push(RawFrameTimestamp::new(frame, raw));
                stats.rows += 1;
            }
            _ => {
                debug!(position, "skipping timestamp row");
                stats.skipped += 1;
            }
        }
    }

    stats.record("timestamps");
    Ok((rows, stats))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

fn read_headers<R: Read>(rdr: &mut csv::Reader<R>, path: &Path) -> Result<StringRecord> {
    rdr.headers()
        .cloned()
        .map_err(|e| IngestionError::csv(path, e))
}

/// Undecodable rows are skipped; IO failures abort the table
fn next_record(
    record: csv::Result<StringRecord>,
    path: &Path,
    stats: &mut TableStats,
) -> Result<Option<StringRecord>> {
    match record {
        Ok(record) => Ok(Some(record)),
        Err(e) if e.is_io_error() => Err(IngestionError::csv(path, e)),
        Err(e) => {
            debug!(error = %e, "skipping undecodable row");
            stats.skipped += 1;
            Ok(None)
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Integer frame number; `12.0` style floats are accepted
fn parse_frame(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>().ok().or_else(|| {
        let value = text.parse::<f64>().ok()?;
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("fixture.csv")
    }

    #[test]
    fn test_diameter_aliases_and_skips() {
        let csv = "\
Frame,Diameter (mm),pressure,time_seconds
0,4.5,1.2,0.0
1,oops,,0.1
x,4.7,1.3,0.2
3.0,4.8
";
        let (rows, stats) =
            read_diameter(csv.as_bytes(), &ColumnAliases::default(), path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.unparsed_values, 1);

        assert_eq!(rows[0].embedded_pressure, Some(1.2));
        assert_eq!(rows[0].time, Some(TimePoint::from_seconds(0.0)));
        assert!(rows[1].diameter_mm.is_nan());
        assert_eq!(rows[1].embedded_pressure, None);
        assert_eq!(rows[2].frame_index, 3);
        assert_eq!(rows[2].time, None);
    }

    #[test]
    fn test_diameter_row_position_without_frame_column() {
        let csv = "avg_diameter\n4.0\n4.1\n";
        let (rows, _) = read_diameter(csv.as_bytes(), &ColumnAliases::default(), path()).unwrap();
        assert_eq!(rows[1].frame_index, 1);
        assert_eq!(rows[1].diameter_mm, 4.1);
    }

    #[test]
    fn test_diameter_missing_column() {
        let csv = "frame,width\n0,1\n";
        let err = read_diameter(csv.as_bytes(), &ColumnAliases::default(), path()).unwrap_err();
        assert!(matches!(err, IngestionError::MissingColumn { table: "diameter", .. }));
    }

    #[test]
    fn test_pressure_positional() {
        let csv = "time,sensor\n12-31-52-745, 0.50\n12-31-52-845,bad\n12-31-52-945,0.75\n";
        let (rows, stats) = read_pressure(csv.as_bytes(), path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(rows[0], RawPressureRow::new("12-31-52-745", 0.5));
    }

    #[test]
    fn test_frame_timestamps() {
        let csv = "Frame Number,Timestamp\n0,12:00:00.000\nabc,12:00:00.033\n2,12:00:00.066\n";
        let (rows, stats) =
            read_frame_timestamps(csv.as_bytes(), &ColumnAliases::default(), path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(rows[1], RawFrameTimestamp::new(2, "12:00:00.066"));
    }

    #[test]
    fn test_parse_frame() {
        assert_eq!(parse_frame("42"), Some(42));
        assert_eq!(parse_frame("42.0"), Some(42));
        assert_eq!(parse_frame("42.5"), None);
        assert_eq!(parse_frame(""), None);
    }
}
