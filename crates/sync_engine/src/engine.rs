//! Main sync engine implementation.

use std::collections::{BTreeMap, HashSet};

use contracts::{
    Aligner, AlignmentConfig, AlignmentInput, AlignmentStrategy, ContractError, CoverageReport,
    DiameterRecord, ExtrapolationPolicy, FrameScaling, OverlapResult, PressureProvenance,
    PressureSample, SyncOutcome, SyncedRecord, TimePoint,
};
use tracing::instrument;

use crate::frame_time::FrameTimeResolver;
use crate::interpolate::{interpolate_by_frame, interpolate_by_position, PressureInterpolator};
use crate::normalize::FrameRangeNormalizer;
use crate::overlap::OverlapAnalyzer;
use crate::strategy::AlignmentStrategySelector;
use crate::timestamp::TimestampParser;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No input yet
    Empty,
    /// Raw input accepted
    Loaded,
    /// Timestamps parsed, every row has a time or is marked unresolved
    Resolved,
    /// Outcome produced (terminal)
    Synced,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loaded => "loaded",
            Self::Resolved => "resolved",
            Self::Synced => "synced",
        }
    }
}

/// Series after timestamp parsing and origin alignment
#[derive(Debug, Clone)]
struct ResolvedSeries {
    /// Diameter rows sorted by frame (stable)
    rows: Vec<DiameterRecord>,
    /// Image-clock time per row
    image_times: Vec<Option<f64>>,
    /// Pressure samples with parsed times, log order
    samples: Vec<PressureSample>,
    /// Every finite pressure value, log order (position fallback)
    log_values: Vec<f64>,
    time_offset_seconds: f64,
    malformed_pressure_rows: usize,
    malformed_frame_timestamps: usize,
    total_video_frames: Option<i64>,
}

#[derive(Debug)]
enum Phase {
    Empty,
    Loaded(AlignmentInput),
    Resolved(Box<ResolvedSeries>),
    Synced(SyncOutcome),
}

impl Phase {
    fn state(&self) -> SyncState {
        match self {
            Self::Empty => SyncState::Empty,
            Self::Loaded(_) => SyncState::Loaded,
            Self::Resolved(_) => SyncState::Resolved,
            Self::Synced(_) => SyncState::Synced,
        }
    }
}

/// Per-row pressure assignment
type Assignment = (Option<f64>, PressureProvenance);

/// Diameter/pressure alignment engine.
///
/// One instance serves exactly one run: `load` → `resolve` → `synchronize`.
#[derive(Debug)]
pub struct SyncEngine {
    config: AlignmentConfig,
    phase: Phase,
}

impl SyncEngine {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config,
            phase: Phase::Empty,
        }
    }

    /// Run a fresh engine end to end
    pub fn run(config: AlignmentConfig, input: AlignmentInput) -> Result<SyncOutcome, ContractError> {
        let mut engine = Self::new(config);
        engine.load(input)?;
        engine.resolve()?;
        engine.synchronize()?;
        engine.into_outcome().ok_or(ContractError::InvalidState {
            expected: SyncState::Synced.as_str(),
            actual: SyncState::Empty.as_str(),
        })
    }

    pub fn state(&self) -> SyncState {
        self.phase.state()
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Accept raw input. Fails with `NoDiameterData` on an empty diameter series.
    #[instrument(
        name = "sync_engine_load",
        skip(self, input),
        fields(
            rows = input.diameter.len(),
            pressure_rows = input.pressure.as_ref().map_or(0, Vec::len),
            timestamp_rows = input.frame_timestamps.as_ref().map_or(0, Vec::len)
        )
    )]
    pub fn load(&mut self, input: AlignmentInput) -> Result<(), ContractError> {
        self.expect(SyncState::Empty)?;
        if input.diameter.is_empty() {
            return Err(ContractError::NoDiameterData);
        }
        self.phase = Phase::Loaded(input);
        Ok(())
    }

    /// Parse timestamps and assign an image-clock time to every row that has one
    #[instrument(name = "sync_engine_resolve", skip(self))]
    pub fn resolve(&mut self) -> Result<(), ContractError> {
        self.expect(SyncState::Loaded)?;
        let Phase::Loaded(input) = std::mem::replace(&mut self.phase, Phase::Empty) else {
            return Err(self.invalid(SyncState::Loaded));
        };
        let series = resolve_series(&self.config, input);
        self.phase = Phase::Resolved(Box::new(series));
        Ok(())
    }

    /// Choose a strategy, assign pressures, normalize frames
    #[instrument(name = "sync_engine_synchronize", skip(self))]
    pub fn synchronize(&mut self) -> Result<&SyncOutcome, ContractError> {
        self.expect(SyncState::Resolved)?;
        let Phase::Resolved(series) = std::mem::replace(&mut self.phase, Phase::Empty) else {
            return Err(self.invalid(SyncState::Resolved));
        };
        let outcome = synchronize_series(&self.config, *series);
        self.phase = Phase::Synced(outcome);
        match &self.phase {
            Phase::Synced(outcome) => Ok(outcome),
            other => Err(ContractError::InvalidState {
                expected: SyncState::Synced.as_str(),
                actual: other.state().as_str(),
            }),
        }
    }

    pub fn outcome(&self) -> Option<&SyncOutcome> {
        match &self.phase {
            Phase::Synced(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn into_outcome(self) -> Option<SyncOutcome> {
        match self.phase {
            Phase::Synced(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn expect(&self, expected: SyncState) -> Result<(), ContractError> {
        if self.state() == expected {
            Ok(())
        } else {
            Err(self.invalid(expected))
        }
    }

    fn invalid(&self, expected: SyncState) -> ContractError {
        ContractError::InvalidState {
            expected: expected.as_str(),
            actual: self.state().as_str(),
        }
    }
}

/// `Aligner` backed by a fresh `SyncEngine` per call
#[derive(Debug, Clone, Default)]
pub struct PressureAligner {
    config: AlignmentConfig,
}

impl PressureAligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }
}

impl Aligner for PressureAligner {
    fn align(&self, input: AlignmentInput) -> Result<SyncOutcome, ContractError> {
        SyncEngine::run(self.config.clone(), input)
    }
}

fn resolve_series(config: &AlignmentConfig, input: AlignmentInput) -> ResolvedSeries {
    let AlignmentInput {
        diameter: mut rows,
        pressure,
        frame_timestamps,
        total_video_frames,
    } = input;
    rows.sort_by_key(|r| r.frame_index);

    // Pressure log: drop non-finite values, then parse the survivors' times
    let pressure = pressure.unwrap_or_default();
    let supplied = pressure.len();
    let usable: Vec<_> = pressure.into_iter().filter(|r| r.value.is_finite()).collect();
    let log_values: Vec<f64> = usable.iter().map(|r| r.value).collect();
    let batch = TimestampParser::parse_batch(usable.iter().map(|r| r.raw_timestamp.as_str()));
    let malformed_pressure_rows = (supplied - usable.len()) + batch.failed;
    let mut pressure_times: Vec<TimePoint> = batch.parsed.iter().map(|(_, t)| *t).collect();
    let pressure_origin = align_origin(&mut pressure_times, config.normalize_origin);
    let samples: Vec<PressureSample> = batch
        .parsed
        .iter()
        .zip(pressure_times)
        .map(|(&(position, _), time)| PressureSample {
            raw_timestamp: usable[position].raw_timestamp.clone(),
            time,
            value: usable[position].value,
        })
        .collect();

    // Image clock: frame/timestamp table when present, else per-row times
    let mut malformed_frame_timestamps = 0;
    let mut table: Vec<(i64, TimePoint)> = Vec::new();
    if let Some(entries) = &frame_timestamps {
        let batch = TimestampParser::parse_batch(entries.iter().map(|e| e.raw_timestamp.as_str()));
        malformed_frame_timestamps = batch.failed;
        table = batch
            .parsed
            .into_iter()
            .map(|(position, t)| (entries[position].frame_index, t))
            .collect();
    }

    let (image_times, image_origin) = if table.is_empty() {
        let mut points: Vec<TimePoint> = rows
            .iter()
            .filter_map(|r| r.time.filter(|t| t.seconds().is_finite()))
            .collect();
        let origin = align_origin(&mut points, false);
        let shift = shift_for(origin, config.normalize_origin);
        let times = rows
            .iter()
            .map(|r| {
                r.time
                    .map(|t| t.seconds())
                    .filter(|s| s.is_finite())
                    .map(|s| s - shift)
            })
            .collect();
        (times, origin)
    } else {
        let mut points: Vec<TimePoint> = table.iter().map(|(_, t)| *t).collect();
        let origin = align_origin(&mut points, config.normalize_origin);
        let resolver = FrameTimeResolver::from_pairs(
            table.iter().zip(points).map(|((frame, _), t)| (*frame, t.seconds())),
        );
        let times = rows.iter().map(|r| resolver.resolve(r.frame_index)).collect();
        (times, origin)
    };

    let time_offset_seconds = match (image_origin, pressure_origin) {
        (Some(image), Some(pressure)) => image - pressure,
        _ => 0.0,
    };

    tracing::debug!(
        samples = samples.len(),
        malformed_pressure_rows,
        malformed_frame_timestamps,
        time_offset_seconds,
        "series resolved"
    );

    ResolvedSeries {
        rows,
        image_times,
        samples,
        log_values,
        time_offset_seconds,
        malformed_pressure_rows,
        malformed_frame_timestamps,
        total_video_frames,
    }
}

/// Origin of a series; shifts the points to zero when `normalize` is set
fn align_origin(points: &mut [TimePoint], normalize: bool) -> Option<f64> {
    if normalize {
        TimestampParser::normalize_to_origin(points)
    } else {
        points.iter().map(|p| p.seconds()).reduce(f64::min)
    }
}

fn shift_for(origin: Option<f64>, normalize: bool) -> f64 {
    if normalize {
        origin.unwrap_or(0.0)
    } else {
        0.0
    }
}

fn synchronize_series(config: &AlignmentConfig, series: ResolvedSeries) -> SyncOutcome {
    let mut coverage = CoverageReport {
        total_frames: series.rows.len(),
        time_offset_seconds: series.time_offset_seconds,
        malformed_pressure_rows: series.malformed_pressure_rows,
        malformed_frame_timestamps: series.malformed_frame_timestamps,
        ..Default::default()
    };

    let (strategy, assignments, overlap) = assign_pressures(config, &series);
    coverage.strategy = strategy;
    if strategy == AlignmentStrategy::DiameterOnly {
        coverage.pressure_missing = true;
        let err = ContractError::NoPressureData {
            message: "no usable pressure samples".into(),
        };
        tracing::warn!(error = %err, "continuing with diameter only");
    }

    let frames: Vec<i64> = series.rows.iter().map(|r| r.frame_index).collect();
    let normalized = match series.total_video_frames {
        Some(total) => FrameRangeNormalizer::normalize(&frames, total),
        None => FrameRangeNormalizer::passthrough(&frames),
    };
    coverage.frame_scaling = normalized.scaling;
    coverage.frames_out_of_video_range = normalized.out_of_range;
    if normalized.scaling == FrameScaling::Degenerate {
        coverage.degenerate_frame_range = true;
        let err = ContractError::DegenerateFrameRange {
            message: format!(
                "{} frames, total_video_frames={:?}",
                frames.len(),
                series.total_video_frames
            ),
        };
        tracing::warn!(error = %err, "frame range collapsed to frame 0");
    }

    let records: Vec<SyncedRecord> = series
        .rows
        .iter()
        .zip(assignments)
        .enumerate()
        .map(|(i, (row, (pressure, provenance)))| {
            coverage.tally(provenance);
            SyncedRecord {
                frame_index: row.frame_index,
                video_frame: normalized.video_frame(i),
                diameter_mm: row.diameter_mm,
                pressure,
                time_seconds: series.image_times[i],
                provenance,
            }
        })
        .collect();

    metrics::counter!("vessel_sync_engine_runs_total", "strategy" => strategy.as_str()).increment(1);
    tracing::info!(
        strategy = %strategy,
        total = coverage.total_frames,
        direct = coverage.matched_directly,
        interpolated = coverage.matched_by_interpolation,
        fallback = coverage.matched_by_fallback,
        unmatched = coverage.unmatched,
        "alignment complete"
    );

    SyncOutcome {
        records,
        coverage,
        overlap,
    }
}

fn assign_pressures(
    config: &AlignmentConfig,
    series: &ResolvedSeries,
) -> (AlignmentStrategy, Vec<Assignment>, Option<OverlapResult>) {
    let n = series.rows.len();
    let missing = vec![(None, PressureProvenance::Missing); n];

    let embedded = first_per_frame(
        series
            .rows
            .iter()
            .filter_map(|r| finite(r.embedded_pressure).map(|v| (r.frame_index, v))),
    );
    if !embedded.is_empty() {
        let assignments = series
            .rows
            .iter()
            .map(|row| match finite(row.embedded_pressure) {
                Some(v) => (Some(v), PressureProvenance::Embedded),
                None => fallback(interpolate_by_frame(row.frame_index, &embedded)),
            })
            .collect();
        return (AlignmentStrategy::Embedded, assignments, None);
    }

    if series.log_values.is_empty() {
        return (AlignmentStrategy::DiameterOnly, missing, None);
    }

    let interpolator =
        PressureInterpolator::new(series.samples.iter().map(|s| (s.time.seconds(), s.value)));
    let image_times: Vec<f64> = series.image_times.iter().flatten().copied().collect();
    let timed = interpolator.and_then(|interp| {
        OverlapAnalyzer::analyze(&image_times, interp.times()).map(|overlap| (interp, overlap))
    });

    let Some((interpolator, overlap)) = timed else {
        let last = n.saturating_sub(1).max(1) as f64;
        let assignments = (0..n)
            .map(|i| fallback(interpolate_by_position(&series.log_values, i as f64 / last)))
            .collect();
        return (AlignmentStrategy::FrameIndex, assignments, None);
    };

    let selection = AlignmentStrategySelector::new(config).select(
        &overlap,
        &series.image_times,
        interpolator.times(),
    );
    let omit = config.extrapolation == ExtrapolationPolicy::Omit;
    let mut assignments = missing;

    match selection.strategy {
        AlignmentStrategy::FallbackScaled => {
            let scaled = interpolator.rescaled_onto(overlap.start_a, overlap.end_a);
            for (slot, t) in assignments.iter_mut().zip(&series.image_times) {
                if let Some(t) = t {
                    *slot = fallback(Some(scaled.interpolate(*t)));
                }
            }
        }
        AlignmentStrategy::Direct => {
            let mut matched = HashSet::new();
            let direct = first_per_frame(selection.direct_matches.iter().map(|m| {
                matched.insert(m.image_index);
                metrics::histogram!("vessel_sync_direct_match_delta_seconds").record(m.delta);
                (
                    series.rows[m.image_index].frame_index,
                    interpolator.values()[m.sample_index],
                )
            }));
            for (i, (slot, t)) in assignments.iter_mut().zip(&series.image_times).enumerate() {
                let Some(t) = t else { continue };
                let frame = series.rows[i].frame_index;
                *slot = if matched.contains(&i) {
                    (direct.get(&frame).copied(), PressureProvenance::Direct)
                } else if omit && !interpolator.contains(*t) {
                    (None, PressureProvenance::Missing)
                } else {
                    interpolated(interpolate_by_frame(frame, &direct))
                };
            }
        }
        _ => {
            for (slot, t) in assignments.iter_mut().zip(&series.image_times) {
                let Some(t) = t else { continue };
                *slot = if omit {
                    interpolated(interpolator.interpolate_within(*t))
                } else {
                    interpolated(Some(interpolator.interpolate(*t)))
                };
            }
        }
    }

    fill_unresolved(series, &mut assignments);
    (selection.strategy, assignments, Some(overlap))
}

/// Rows with no image time borrow from the rows that did get a pressure
fn fill_unresolved(series: &ResolvedSeries, assignments: &mut [Assignment]) {
    let unresolved = series.image_times.iter().filter(|t| t.is_none()).count();
    if unresolved == 0 {
        return;
    }
    let known = first_per_frame(
        series
            .rows
            .iter()
            .zip(assignments.iter())
            .filter_map(|(row, (p, _))| p.map(|p| (row.frame_index, p))),
    );
    for (i, slot) in assignments.iter_mut().enumerate() {
        if series.image_times[i].is_none() {
            *slot = fallback(interpolate_by_frame(series.rows[i].frame_index, &known));
        }
    }
    tracing::debug!(unresolved, "rows without image time filled by frame distance");
}

fn first_per_frame<I>(pairs: I) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = (i64, f64)>,
{
    let mut map = BTreeMap::new();
    for (frame, value) in pairs {
        map.entry(frame).or_insert(value);
    }
    map
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn fallback(value: Option<f64>) -> Assignment {
    tag(value, PressureProvenance::Fallback)
}

fn interpolated(value: Option<f64>) -> Assignment {
    tag(value, PressureProvenance::Interpolated)
}

fn tag(value: Option<f64>, provenance: PressureProvenance) -> Assignment {
    match value {
        Some(v) => (Some(v), provenance),
        None => (None, PressureProvenance::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RawFrameTimestamp, RawPressureRow};

    fn diameter(frames: impl IntoIterator<Item = i64>) -> Vec<DiameterRecord> {
        frames
            .into_iter()
            .map(|f| DiameterRecord::new(f, 4.0 + (f % 7) as f64 * 0.1))
            .collect()
    }

    fn linear_scenario() -> AlignmentInput {
        AlignmentInput::new(diameter(0..100))
            .with_pressure(vec![
                RawPressureRow::new("00-00-00-000", 1.0),
                RawPressureRow::new("00-00-10-000", 2.0),
            ])
            .with_frame_timestamps(vec![
                RawFrameTimestamp::new(0, "12:00:00.000"),
                RawFrameTimestamp::new(99, "12:00:10.000"),
            ])
            .with_total_video_frames(100)
    }

    #[test]
    fn test_linear_scenario() {
        let outcome = SyncEngine::run(AlignmentConfig::default(), linear_scenario()).unwrap();
        let record = &outcome.records[50];
        assert_eq!(record.frame_index, 50);
        let t = record.time_seconds.unwrap();
        assert!((t - 5.0).abs() < 0.06, "t={t}");
        let p = record.pressure.unwrap();
        assert!((p - 1.5).abs() < 0.01, "p={p}");
        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::Interpolated);
        assert_eq!(outcome.coverage.matched_by_interpolation, 100);
        assert!((outcome.coverage.time_offset_seconds - 12.0 * 3600.0).abs() < 1e-9);
    }

    #[test]
    fn test_state_machine_order() {
        let mut engine = SyncEngine::new(AlignmentConfig::default());
        assert!(matches!(
            engine.resolve(),
            Err(ContractError::InvalidState { expected: "loaded", actual: "empty" })
        ));
        engine.load(linear_scenario()).unwrap();
        assert_eq!(engine.state(), SyncState::Loaded);
        assert!(engine.synchronize().is_err());
        engine.resolve().unwrap();
        engine.synchronize().unwrap();
        assert_eq!(engine.state(), SyncState::Synced);
        assert!(engine.load(linear_scenario()).is_err());
        assert!(engine.synchronize().is_err());
        assert!(engine.outcome().is_some());
    }

    #[test]
    fn test_empty_diameter_is_fatal() {
        let err = SyncEngine::run(AlignmentConfig::default(), AlignmentInput::default()).unwrap_err();
        assert!(matches!(err, ContractError::NoDiameterData));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_diameter_only() {
        let input = AlignmentInput::new(diameter(0..10)).with_total_video_frames(10);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();
        assert_eq!(outcome.records.len(), 10);
        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::DiameterOnly);
        assert!(outcome.coverage.pressure_missing);
        assert_eq!(outcome.coverage.unmatched, 10);
        assert!(outcome.records.iter().all(|r| r.pressure.is_none()));
    }

    #[test]
    fn test_cardinality_and_order_preserved() {
        let mut rows = diameter([5, 3, 3, 9, 1]);
        rows[1].diameter_mm = 1.0;
        rows[2].diameter_mm = 2.0;
        let input = AlignmentInput::new(rows).with_pressure(vec![RawPressureRow::new("garbage", 1.0)]);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();

        let frames: Vec<i64> = outcome.records.iter().map(|r| r.frame_index).collect();
        assert_eq!(frames, vec![1, 3, 3, 5, 9]);
        assert_eq!(outcome.records[1].diameter_mm, 1.0);
        assert_eq!(outcome.records[2].diameter_mm, 2.0);
        assert_eq!(outcome.coverage.malformed_pressure_rows, 1);
    }

    #[test]
    fn test_single_sample_flat_line() {
        let input = AlignmentInput::new(diameter(0..20))
            .with_pressure(vec![RawPressureRow::new("00-00-01-000", 3.25)])
            .with_frame_timestamps(vec![
                RawFrameTimestamp::new(0, "00:00:00.000"),
                RawFrameTimestamp::new(19, "00:00:02.000"),
            ]);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();
        assert!(outcome.records.iter().all(|r| r.pressure == Some(3.25)));
    }

    #[test]
    fn test_frame_index_mode_without_times() {
        let input = AlignmentInput::new(diameter(0..5)).with_pressure(vec![
            RawPressureRow::new("00-00-00-000", 0.0),
            RawPressureRow::new("00-00-01-000", 4.0),
        ]);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();
        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::FrameIndex);
        let pressures: Vec<f64> = outcome.records.iter().filter_map(|r| r.pressure).collect();
        assert_eq!(pressures, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(outcome.coverage.matched_by_fallback, 5);
    }

    #[test]
    fn test_embedded_pressure_takes_priority() {
        let mut rows = diameter(0..4);
        rows[0].embedded_pressure = Some(1.0);
        rows[2].embedded_pressure = Some(3.0);
        let input = AlignmentInput::new(rows).with_pressure(vec![RawPressureRow::new("00-00-00-000", 99.0)]);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();

        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::Embedded);
        let p: Vec<Option<f64>> = outcome.records.iter().map(|r| r.pressure).collect();
        assert_eq!(p, vec![Some(1.0), Some(2.0), Some(3.0), Some(3.0)]);
        assert_eq!(outcome.records[1].provenance, PressureProvenance::Fallback);
        assert_eq!(outcome.coverage.matched_directly, 2);
        assert_eq!(outcome.coverage.matched_by_fallback, 2);
    }

    #[test]
    fn test_direct_strategy_with_dense_pressure() {
        let rows: Vec<DiameterRecord> = (0..10)
            .map(|f| DiameterRecord::new(f, 5.0).with_time(f as f64 * 0.1))
            .collect();
        let pressure = (0..10)
            .map(|i| RawPressureRow::new(format!("00-00-00-{:03}", i * 100 + 20), i as f64))
            .collect();
        let outcome = SyncEngine::run(
            AlignmentConfig::default().with_normalize_origin(false),
            AlignmentInput::new(rows).with_pressure(pressure),
        )
        .unwrap();

        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::Direct);
        assert_eq!(outcome.records[3].pressure, Some(3.0));
        assert_eq!(outcome.records[3].provenance, PressureProvenance::Direct);
        let c = &outcome.coverage;
        assert_eq!(
            c.matched_directly + c.matched_by_interpolation + c.matched_by_fallback + c.unmatched,
            c.total_frames
        );
    }

    #[test]
    fn test_no_overlap_fallback_scaled() {
        let rows: Vec<DiameterRecord> = (0..6)
            .map(|f| DiameterRecord::new(f, 5.0).with_time(100.0 + f as f64))
            .collect();
        let pressure = vec![
            RawPressureRow::new("00-00-00-000", 1.0),
            RawPressureRow::new("00-00-05-000", 2.0),
        ];
        let outcome = SyncEngine::run(
            AlignmentConfig::default().with_normalize_origin(false),
            AlignmentInput::new(rows).with_pressure(pressure),
        )
        .unwrap();

        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::FallbackScaled);
        assert_eq!(outcome.coverage.matched_by_fallback, 6);
        assert_eq!(outcome.records[0].pressure, Some(1.0));
        assert_eq!(outcome.records[5].pressure, Some(2.0));
        let mid = outcome.records[2].pressure.unwrap();
        assert!((mid - 1.4).abs() < 1e-9);
        assert!(!outcome.overlap.unwrap().has_overlap);
    }

    #[test]
    fn test_omit_policy_leaves_out_of_range_missing() {
        let rows: Vec<DiameterRecord> = (0..11)
            .map(|f| DiameterRecord::new(f, 5.0).with_time(f as f64))
            .collect();
        let pressure = vec![
            RawPressureRow::new("00-00-02-000", 1.0),
            RawPressureRow::new("00-00-08-000", 2.0),
        ];
        let config = AlignmentConfig::default()
            .with_normalize_origin(false)
            .with_extrapolation(ExtrapolationPolicy::Omit);
        let outcome = SyncEngine::run(config, AlignmentInput::new(rows).with_pressure(pressure)).unwrap();

        assert_eq!(outcome.records[0].pressure, None);
        assert_eq!(outcome.records[0].provenance, PressureProvenance::Missing);
        assert_eq!(outcome.records[5].pressure, Some(1.5));
        assert_eq!(outcome.coverage.unmatched, 4);
    }

    #[test]
    fn test_unresolved_rows_fall_back_by_frame() {
        let input = AlignmentInput::new(diameter(0..30))
            .with_pressure(vec![
                RawPressureRow::new("00-00-00-000", 1.0),
                RawPressureRow::new("00-00-02-000", 3.0),
            ])
            .with_frame_timestamps(vec![
                RawFrameTimestamp::new(0, "00:00:00.000"),
                RawFrameTimestamp::new(20, "00:00:02.000"),
                RawFrameTimestamp::new(25, "bad"),
            ]);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();

        assert_eq!(outcome.coverage.malformed_frame_timestamps, 1);
        let late = &outcome.records[25];
        assert_eq!(late.time_seconds, None);
        assert_eq!(late.provenance, PressureProvenance::Fallback);
        assert_eq!(late.pressure, Some(3.0));
        assert_eq!(outcome.coverage.matched_by_fallback, 9);
    }

    #[test]
    fn test_idempotent_runs() {
        let a = SyncEngine::run(AlignmentConfig::default(), linear_scenario()).unwrap();
        let b = SyncEngine::run(AlignmentConfig::default(), linear_scenario()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_logger_counter_frames_offset() {
        let input = AlignmentInput::new(diameter(1000..1100)).with_total_video_frames(100);
        let outcome = SyncEngine::run(AlignmentConfig::default(), input).unwrap();
        assert_eq!(outcome.coverage.frame_scaling, FrameScaling::Offset { offset: 1000 });
        let video: Vec<i64> = outcome.records.iter().filter_map(|r| r.video_frame).collect();
        assert_eq!(video, (0..100).collect::<Vec<i64>>());
        assert_eq!(outcome.records[0].frame_index, 1000);
    }

    #[test]
    fn test_pressure_aligner_is_fresh_per_call() {
        let aligner = PressureAligner::default();
        let a = aligner.align(linear_scenario()).unwrap();
        let b = aligner.align(linear_scenario()).unwrap();
        assert_eq!(a.coverage, b.coverage);
    }
}
