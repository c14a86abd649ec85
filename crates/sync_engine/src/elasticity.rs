//! Vessel elasticity indices from a baseline/compressed measurement pair.

use contracts::{
    BetaBand, ContractError, DistensibilityBand, ElasticityAssessment, ElasticityInput,
    ElasticityMetrics, PemBand, StrainBand,
};

/// 1 Pa in mmHg
pub const PA_TO_MMHG: f64 = 0.007_500_62;
/// 1 N/cm² in Pa
const N_PER_CM2_TO_PA: f64 = 10_000.0;
/// Below this, strain or ΔP is treated as zero
const EPSILON: f64 = 1e-10;

/// Compute strain, PEM, β and distensibility.
///
/// # Errors
/// `InvalidMeasurement` for a non-positive diameter, a negative force or a
/// non-positive probe area.
pub fn compute_elasticity(input: &ElasticityInput) -> Result<ElasticityMetrics, ContractError> {
    let ElasticityInput {
        baseline,
        compressed,
        probe_area_cm2,
    } = *input;

    check(baseline.diameter_mm > 0.0, "baseline.diameter_mm", "must be > 0")?;
    check(compressed.diameter_mm > 0.0, "compressed.diameter_mm", "must be > 0")?;
    check(baseline.pressure_newton >= 0.0, "baseline.pressure_newton", "must be >= 0")?;
    check(compressed.pressure_newton >= 0.0, "compressed.pressure_newton", "must be >= 0")?;
    check(probe_area_cm2 > 0.0, "probe_area_cm2", "must be > 0")?;

    let baseline_pa = baseline.pressure_newton / probe_area_cm2 * N_PER_CM2_TO_PA;
    let compressed_pa = compressed.pressure_newton / probe_area_cm2 * N_PER_CM2_TO_PA;
    let baseline_mmhg = baseline_pa * PA_TO_MMHG;
    let compressed_mmhg = compressed_pa * PA_TO_MMHG;
    let delta_pa = compressed_pa - baseline_pa;
    let delta_mmhg = compressed_mmhg - baseline_mmhg;

    let (db, dc) = (baseline.diameter_mm, compressed.diameter_mm);
    let strain = (dc - db) / db;
    let strain_defined = strain.abs() > EPSILON;

    let pem_mmhg = strain_defined.then(|| delta_mmhg / strain);
    let pem_pa = strain_defined.then(|| delta_pa / strain);
    let beta = (strain_defined && baseline_mmhg > 0.0 && compressed_mmhg > 0.0)
        .then(|| (compressed_mmhg / baseline_mmhg).ln() / strain);

    // Diameters in metres; result scaled to 10⁻⁵ Pa⁻¹
    let distensibility = (delta_pa.abs() > EPSILON).then(|| {
        let (db_m, dc_m) = (db / 1000.0, dc / 1000.0);
        2.0 * (dc_m - db_m) / (db_m * delta_pa) * 1e5
    });

    tracing::debug!(strain, ?pem_mmhg, ?beta, ?distensibility, "elasticity computed");

    Ok(ElasticityMetrics {
        baseline_pressure_pa: baseline_pa,
        compressed_pressure_pa: compressed_pa,
        baseline_pressure_mmhg: baseline_mmhg,
        compressed_pressure_mmhg: compressed_mmhg,
        delta_pressure_pa: delta_pa,
        delta_pressure_mmhg: delta_mmhg,
        strain,
        pem_mmhg,
        pem_pa,
        beta,
        distensibility,
    })
}

/// Band every index of `metrics`.
///
/// Strain and PEM edges are exclusive from below, β and distensibility
/// edges inclusive.
pub fn classify(metrics: &ElasticityMetrics) -> ElasticityAssessment {
    let strain = match metrics.strain {
        s if s <= 0.0 => StrainBand::NonPositive,
        s if s > 0.1 => StrainBand::High,
        s if s > 0.05 => StrainBand::Moderate,
        _ => StrainBand::Low,
    };

    let pem = metrics.pem_mmhg.map(|pem| match pem {
        p if p > 630.0 => PemBand::High,
        p if p > 495.0 => PemBand::Elevated,
        p if p > 349.0 => PemBand::Normal,
        _ => PemBand::Low,
    });

    let beta = metrics.beta.map(|beta| match beta {
        b if b >= 20.0 => BetaBand::VeryHighRisk,
        b if b >= 13.0 => BetaBand::HighRisk,
        b if b >= 11.7 => BetaBand::AgeRelated,
        b if b >= 8.3 => BetaBand::Normal,
        b if b >= 6.6 => BetaBand::Good,
        _ => BetaBand::Excellent,
    });

    let distensibility = metrics.distensibility.map(|dc| match dc {
        d if d >= 4.0 => DistensibilityBand::Normal,
        d if d >= 3.5 => DistensibilityBand::Borderline,
        d if d >= 3.0 => DistensibilityBand::Reduced,
        _ => DistensibilityBand::Low,
    });

    ElasticityAssessment {
        strain,
        pem,
        beta,
        distensibility,
    }
}

fn check(ok: bool, field: &str, message: &str) -> Result<(), ContractError> {
    if ok {
        Ok(())
    } else {
        Err(ContractError::invalid_measurement(field, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ElasticityPoint;

    fn input(db: f64, pb: f64, dc: f64, pc: f64) -> ElasticityInput {
        ElasticityInput {
            baseline: ElasticityPoint::new(db, pb),
            compressed: ElasticityPoint::new(dc, pc),
            probe_area_cm2: 2.0,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_reference_values() {
        let m = compute_elasticity(&input(5.0, 1.0, 4.5, 3.0)).unwrap();
        // 1 N / 2 cm² = 5000 Pa
        assert!(close(m.baseline_pressure_pa, 5000.0));
        assert!(close(m.compressed_pressure_pa, 15000.0));
        assert!(close(m.delta_pressure_mmhg, 10000.0 * PA_TO_MMHG));
        assert!(close(m.strain, -0.1));
        assert!(close(m.pem_pa.unwrap(), -100_000.0));
        assert!(close(m.beta.unwrap(), 3.0f64.ln() / -0.1));
        // 2 * (-0.0005) / (0.005 * 10000) * 1e5
        assert!(close(m.distensibility.unwrap(), -2.0));
    }

    #[test]
    fn test_zero_strain_and_zero_delta_undefined() {
        let m = compute_elasticity(&input(5.0, 1.0, 5.0, 1.0)).unwrap();
        assert_eq!(m.strain, 0.0);
        assert!(m.pem_mmhg.is_none());
        assert!(m.beta.is_none());
        assert!(m.distensibility.is_none());
    }

    #[test]
    fn test_zero_baseline_pressure_has_no_beta() {
        let m = compute_elasticity(&input(5.0, 0.0, 4.0, 2.0)).unwrap();
        assert!(m.beta.is_none());
        assert!(m.pem_mmhg.is_some());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(compute_elasticity(&input(0.0, 1.0, 4.0, 2.0)).is_err());
        assert!(compute_elasticity(&input(5.0, -1.0, 4.0, 2.0)).is_err());
        let mut bad_area = input(5.0, 1.0, 4.0, 2.0);
        bad_area.probe_area_cm2 = 0.0;
        let err = compute_elasticity(&bad_area).unwrap_err();
        assert!(matches!(err, ContractError::InvalidMeasurement { ref field, .. } if field == "probe_area_cm2"));
    }

    fn metrics_with(
        strain: f64,
        pem: Option<f64>,
        beta: Option<f64>,
        dc: Option<f64>,
    ) -> ElasticityMetrics {
        let mut m = compute_elasticity(&input(5.0, 1.0, 5.5, 2.0)).unwrap();
        m.strain = strain;
        m.pem_mmhg = pem;
        m.beta = beta;
        m.distensibility = dc;
        m
    }

    #[test]
    fn test_classify_strain_edges() {
        let band = |s| classify(&metrics_with(s, None, None, None)).strain;
        assert_eq!(band(-0.1), StrainBand::NonPositive);
        assert_eq!(band(0.0), StrainBand::NonPositive);
        assert_eq!(band(0.01), StrainBand::Low);
        assert_eq!(band(0.05), StrainBand::Low);
        assert_eq!(band(0.0501), StrainBand::Moderate);
        assert_eq!(band(0.1), StrainBand::Moderate);
        assert_eq!(band(0.1001), StrainBand::High);
    }

    #[test]
    fn test_classify_pem_edges() {
        let band = |p| classify(&metrics_with(0.1, Some(p), None, None)).pem;
        assert_eq!(band(100.0), Some(PemBand::Low));
        assert_eq!(band(349.0), Some(PemBand::Low));
        assert_eq!(band(349.5), Some(PemBand::Normal));
        assert_eq!(band(495.0), Some(PemBand::Normal));
        assert_eq!(band(495.5), Some(PemBand::Elevated));
        assert_eq!(band(630.0), Some(PemBand::Elevated));
        assert_eq!(band(630.5), Some(PemBand::High));
        assert_eq!(classify(&metrics_with(0.1, None, None, None)).pem, None);
    }

    #[test]
    fn test_classify_beta_edges() {
        let band = |b| classify(&metrics_with(0.1, None, Some(b), None)).beta;
        assert_eq!(band(6.59), Some(BetaBand::Excellent));
        assert_eq!(band(6.6), Some(BetaBand::Good));
        assert_eq!(band(8.3), Some(BetaBand::Normal));
        assert_eq!(band(11.69), Some(BetaBand::Normal));
        assert_eq!(band(11.7), Some(BetaBand::AgeRelated));
        assert_eq!(band(13.0), Some(BetaBand::HighRisk));
        assert_eq!(band(19.99), Some(BetaBand::HighRisk));
        assert_eq!(band(20.0), Some(BetaBand::VeryHighRisk));
    }

    #[test]
    fn test_classify_distensibility_edges() {
        let band = |d| classify(&metrics_with(0.1, None, None, Some(d))).distensibility;
        assert_eq!(band(-2.0), Some(DistensibilityBand::Low));
        assert_eq!(band(2.99), Some(DistensibilityBand::Low));
        assert_eq!(band(3.0), Some(DistensibilityBand::Reduced));
        assert_eq!(band(3.5), Some(DistensibilityBand::Borderline));
        assert_eq!(band(3.99), Some(DistensibilityBand::Borderline));
        assert_eq!(band(4.0), Some(DistensibilityBand::Normal));
    }

    #[test]
    fn test_classify_computed_metrics() {
        // 5.0 -> 5.5 mm is 10% strain
        let m = compute_elasticity(&input(5.0, 1.0, 5.5, 2.0)).unwrap();
        let a = classify(&m);
        assert_eq!(a.strain, StrainBand::Moderate);
        assert!(a.pem.is_some());
        assert!(a.beta.is_some());
        assert!(a.distensibility.is_some());
    }
}
