//! Timestamp parsing for the two clock formats.
//!
//! - Pressure logger: `HH-MM-SS-mmm`
//! - Video frame table: `HH:MM:SS.mmm` (milliseconds optional)

use contracts::{ParseError, TimePoint};

/// Result of parsing a batch of raw timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    /// `(input position, parsed time)` for every row that parsed
    pub parsed: Vec<(usize, TimePoint)>,
    /// Rows rejected as malformed
    pub failed: usize,
}

/// Stateless parser for both timestamp formats
pub struct TimestampParser;

impl TimestampParser {
    /// Parse `HH-MM-SS-mmm` (exactly four fields)
    pub fn parse_hyphenated(raw: &str) -> Result<TimePoint, ParseError> {
        let trimmed = raw.trim();
        let fields: Vec<&str> = trimmed.split('-').collect();
        if fields.len() != 4 {
            return Err(ParseError::malformed(
                raw,
                format!("expected 4 '-' fields, got {}", fields.len()),
            ));
        }

        let hours = field(raw, fields[0], "hours")?;
        let minutes = field(raw, fields[1], "minutes")?;
        let seconds = field(raw, fields[2], "seconds")?;
        let millis = field(raw, fields[3], "milliseconds")?;
        Ok(compose(hours, minutes, seconds, millis))
    }

    /// Parse `HH:MM:SS.mmm` (exactly three fields; `.mmm` may be omitted)
    pub fn parse_colon(raw: &str) -> Result<TimePoint, ParseError> {
        let trimmed = raw.trim();
        let fields: Vec<&str> = trimmed.split(':').collect();
        if fields.len() != 3 {
            return Err(ParseError::malformed(
                raw,
                format!("expected 3 ':' fields, got {}", fields.len()),
            ));
        }

        let hours = field(raw, fields[0], "hours")?;
        let minutes = field(raw, fields[1], "minutes")?;
        let (seconds, millis) = match fields[2].split_once('.') {
            Some((s, ms)) => (field(raw, s, "seconds")?, field(raw, ms, "milliseconds")?),
            None => (field(raw, fields[2], "seconds")?, 0),
        };
        Ok(compose(hours, minutes, seconds, millis))
    }

    /// Parse either format, chosen by delimiter
    pub fn parse(raw: &str) -> Result<TimePoint, ParseError> {
        if raw.contains(':') {
            Self::parse_colon(raw)
        } else if raw.contains('-') {
            Self::parse_hyphenated(raw)
        } else {
            Err(ParseError::malformed(raw, "unrecognized timestamp format"))
        }
    }

    /// Parse every row, counting failures instead of aborting
    pub fn parse_batch<'a, I>(raws: I) -> ParsedBatch
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut batch = ParsedBatch::default();
        for (position, raw) in raws.into_iter().enumerate() {
            match Self::parse(raw) {
                Ok(point) => batch.parsed.push((position, point)),
                Err(err) => {
                    tracing::debug!(position, error = %err, "skipping malformed timestamp");
                    batch.failed += 1;
                }
            }
        }
        batch
    }

    /// Shift the series so that its earliest point is zero.
    ///
    /// Returns the removed origin, `None` for an empty series.
    pub fn normalize_to_origin(points: &mut [TimePoint]) -> Option<f64> {
        let origin = points
            .iter()
            .map(|p| p.seconds())
            .reduce(f64::min)?;
        for point in points.iter_mut() {
            *point = point.relative_to(origin);
        }
        Some(origin)
    }
}

fn field(raw: &str, text: &str, name: &str) -> Result<u32, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::malformed(raw, format!("empty {name} field")));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::malformed(
            raw,
            format!("{name} field '{text}' is not a non-negative integer"),
        ));
    }
    text.parse::<u32>()
        .map_err(|e| ParseError::malformed(raw, format!("{name} field '{text}': {e}")))
}

fn compose(hours: u32, minutes: u32, seconds: u32, millis: u32) -> TimePoint {
    let whole = f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(seconds);
    TimePoint::from_seconds(whole + f64::from(millis) / 1000.0)
}
