//! Elasticity inputs and results
//!
//! Two synchronized measurements (baseline and compressed) feed the vessel
//! elasticity indices.

use serde::{Deserialize, Serialize};

use crate::{ContractError, SyncOutcome, SyncedRecord};

/// One measurement: diameter plus probe force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticityPoint {
    /// Vessel diameter (mm), must be > 0
    pub diameter_mm: f64,
    /// Probe force (N), must be >= 0
    pub pressure_newton: f64,
}

impl ElasticityPoint {
    pub fn new(diameter_mm: f64, pressure_newton: f64) -> Self {
        Self {
            diameter_mm,
            pressure_newton,
        }
    }
}

/// Inputs for one elasticity computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticityInput {
    pub baseline: ElasticityPoint,
    pub compressed: ElasticityPoint,
    /// Probe contact area (cm²), must be > 0
    pub probe_area_cm2: f64,
}

impl ElasticityInput {
    /// Pick the baseline and compressed points out of a synchronized outcome
    /// by video frame. A frame with no record falls back to the nearest one.
    ///
    /// # Errors
    /// `InvalidMeasurement` when the outcome has no placed record or the
    /// picked record has no pressure.
    pub fn from_outcome(
        outcome: &SyncOutcome,
        baseline_video_frame: i64,
        compressed_video_frame: i64,
        probe_area_cm2: f64,
    ) -> Result<Self, ContractError> {
        let baseline = Self::pick_record(outcome, baseline_video_frame, "baseline")?;
        let compressed = Self::pick_record(outcome, compressed_video_frame, "compressed")?;
        Self::from_records(baseline, compressed, probe_area_cm2)
    }

    /// Record used for `video_frame`: exact hit, else the closest one
    pub fn pick_record<'a>(
        outcome: &'a SyncOutcome,
        video_frame: i64,
        field: &str,
    ) -> Result<&'a SyncedRecord, ContractError> {
        outcome.nearest_record(video_frame).ok_or_else(|| {
            ContractError::invalid_measurement(
                field,
                format!("no record near video frame {video_frame}"),
            )
        })
    }

    /// # Errors
    /// `InvalidMeasurement` when either record has no pressure.
    pub fn from_records(
        baseline: &SyncedRecord,
        compressed: &SyncedRecord,
        probe_area_cm2: f64,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            baseline: point_of(baseline, "baseline")?,
            compressed: point_of(compressed, "compressed")?,
            probe_area_cm2,
        })
    }
}

fn point_of(record: &SyncedRecord, field: &str) -> Result<ElasticityPoint, ContractError> {
    let pressure = record.pressure.ok_or_else(|| {
        ContractError::invalid_measurement(
            field,
            format!("no pressure at frame {}", record.frame_index),
        )
    })?;
    Ok(ElasticityPoint::new(record.diameter_mm, pressure))
}

/// Elasticity indices. `None` marks a quantity that is undefined for the
/// given inputs (zero strain, zero pressure change, zero baseline pressure).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticityMetrics {
    pub baseline_pressure_pa: f64,
    pub compressed_pressure_pa: f64,
    pub baseline_pressure_mmhg: f64,
    pub compressed_pressure_mmhg: f64,
    pub delta_pressure_pa: f64,
    pub delta_pressure_mmhg: f64,

    /// ε = (Dc - Db) / Db
    pub strain: f64,

    /// Peterson elastic modulus ΔP / ε (mmHg)
    pub pem_mmhg: Option<f64>,
    /// Peterson elastic modulus ΔP / ε (Pa)
    pub pem_pa: Option<f64>,

    /// Stiffness parameter ln(Pc / Pb) / ε
    pub beta: Option<f64>,

    /// Distensibility 2(Dc - Db) / (Db·ΔP), in 10⁻⁵ Pa⁻¹
    pub distensibility: Option<f64>,
}

/// 应变分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainBand {
    /// ε <= 0: the vessel did not dilate, check the measurement
    NonPositive,
    /// 0 < ε <= 0.05
    Low,
    /// 0.05 < ε <= 0.1
    Moderate,
    /// ε > 0.1
    High,
}

impl StrainBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonPositive => "non_positive",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// PEM 分级 (mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PemBand {
    /// <= 349
    Low,
    /// (349, 495]
    Normal,
    /// (495, 630]
    Elevated,
    /// > 630
    High,
}

impl PemBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::High => "high",
        }
    }
}

/// 硬度参数 β 分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaBand {
    /// < 6.6
    Excellent,
    /// [6.6, 8.3)
    Good,
    /// [8.3, 11.7)
    Normal,
    /// [11.7, 13)
    AgeRelated,
    /// [13, 20)
    HighRisk,
    /// >= 20
    VeryHighRisk,
}

impl BetaBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Normal => "normal",
            Self::AgeRelated => "age_related",
            Self::HighRisk => "high_risk",
            Self::VeryHighRisk => "very_high_risk",
        }
    }
}

/// 扩张性分级 (10⁻⁵ Pa⁻¹)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistensibilityBand {
    /// < 3.0
    Low,
    /// [3.0, 3.5)
    Reduced,
    /// [3.5, 4.0)
    Borderline,
    /// >= 4.0
    Normal,
}

impl DistensibilityBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Reduced => "reduced",
            Self::Borderline => "borderline",
            Self::Normal => "normal",
        }
    }
}

/// Band of every index. `None` where the index itself is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticityAssessment {
    pub strain: StrainBand,
    pub pem: Option<PemBand>,
    pub beta: Option<BetaBand>,
    pub distensibility: Option<DistensibilityBand>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoverageReport, PressureProvenance, SyncedRecord};

    fn outcome() -> SyncOutcome {
        let record = |frame: i64, pressure: Option<f64>| SyncedRecord {
            frame_index: frame + 1000,
            video_frame: Some(frame),
            diameter_mm: 5.0 + frame as f64 * 0.1,
            pressure,
            time_seconds: None,
            provenance: if pressure.is_some() {
                PressureProvenance::Direct
            } else {
                PressureProvenance::Missing
            },
        };
        SyncOutcome {
            records: vec![record(0, Some(1.0)), record(1, Some(2.0)), record(2, None)],
            coverage: CoverageReport::default(),
            overlap: None,
        }
    }

    #[test]
    fn test_from_outcome_by_video_frame() {
        let input = ElasticityInput::from_outcome(&outcome(), 0, 1, 1.0).unwrap();
        assert_eq!(input.baseline, ElasticityPoint::new(5.0, 1.0));
        assert_eq!(input.compressed.pressure_newton, 2.0);
    }

    #[test]
    fn test_from_outcome_missing_pressure() {
        let err = ElasticityInput::from_outcome(&outcome(), 0, 2, 1.0).unwrap_err();
        assert!(matches!(err, ContractError::InvalidMeasurement { ref field, .. } if field == "compressed"));
        // 9 falls back to frame 2, which has no pressure
        let err = ElasticityInput::from_outcome(&outcome(), 9, 0, 1.0).unwrap_err();
        assert!(matches!(err, ContractError::InvalidMeasurement { ref field, .. } if field == "baseline"));
    }

    #[test]
    fn test_from_outcome_falls_back_to_nearest_frame() {
        // Records on even video frames 0, 2, ..., 98
        let records = (0..50)
            .map(|i| SyncedRecord {
                frame_index: i,
                video_frame: Some(i * 2),
                diameter_mm: 5.0,
                pressure: Some(i as f64 * 0.5),
                time_seconds: None,
                provenance: PressureProvenance::Direct,
            })
            .collect();
        let outcome = SyncOutcome {
            records,
            coverage: CoverageReport::default(),
            overlap: None,
        };

        let input = ElasticityInput::from_outcome(&outcome, 10, 41, 1.0).unwrap();
        assert_eq!(input.baseline.pressure_newton, 2.5);
        // 41 sits between 40 and 42; the earlier record wins
        assert_eq!(input.compressed.pressure_newton, 10.0);

        let picked = ElasticityInput::pick_record(&outcome, 500, "compressed").unwrap();
        assert_eq!(picked.video_frame, Some(98));
        let picked = ElasticityInput::pick_record(&outcome, -3, "baseline").unwrap();
        assert_eq!(picked.video_frame, Some(0));
    }

    #[test]
    fn test_empty_outcome_has_nothing_to_pick() {
        let outcome = SyncOutcome {
            records: Vec::new(),
            coverage: CoverageReport::default(),
            overlap: None,
        };
        assert!(ElasticityInput::from_outcome(&outcome, 0, 1, 1.0).is_err());
    }
}
