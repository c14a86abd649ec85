//! Direct-vs-interpolated strategy selection.

use contracts::{AlignmentConfig, AlignmentStrategy, OverlapResult};
use tracing::instrument;

/// One accepted nearest-sample match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectMatch {
    /// Position in the image time slice
    pub image_index: usize,
    /// Position in the sorted pressure time slice
    pub sample_index: usize,
    /// |Δt| between frame and sample
    pub delta: f64,
}

/// Selector output
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub strategy: AlignmentStrategy,
    /// Image frames inside the closed overlap window
    pub in_range: usize,
    /// Matches within tolerance (empty unless inside the overlap)
    pub direct_matches: Vec<DirectMatch>,
}

/// Chooses between Direct, Interpolated and FallbackScaled
#[derive(Debug, Clone, Copy)]
pub struct AlignmentStrategySelector {
    tolerance_seconds: f64,
    direct_coverage_threshold: f64,
}

impl AlignmentStrategySelector {
    pub fn new(config: &AlignmentConfig) -> Self {
        Self {
            tolerance_seconds: config.tolerance_seconds,
            direct_coverage_threshold: config.direct_coverage_threshold,
        }
    }

    /// `image_times` may contain unresolved frames (`None`), which are never
    /// in range. `pressure_times` must be sorted ascending.
    #[instrument(
        name = "strategy_select",
        level = "debug",
        skip_all,
        fields(frames = image_times.len(), samples = pressure_times.len())
    )]
    pub fn select(
        &self,
        overlap: &OverlapResult,
        image_times: &[Option<f64>],
        pressure_times: &[f64],
    ) -> Selection {
        if !overlap.has_overlap {
            return Selection {
                strategy: AlignmentStrategy::FallbackScaled,
                in_range: 0,
                direct_matches: Vec::new(),
            };
        }

        let mut in_range = 0;
        let mut direct_matches = Vec::new();
        for (image_index, t) in image_times.iter().enumerate() {
            let Some(t) = *t else { continue };
            if !overlap.contains(t) {
                continue;
            }
            in_range += 1;

            if let Some(sample_index) = nearest_index(pressure_times, t) {
                let delta = (pressure_times[sample_index] - t).abs();
                if delta < self.tolerance_seconds {
                    direct_matches.push(DirectMatch {
                        image_index,
                        sample_index,
                        delta,
                    });
                }
            }
        }

        let strategy = if in_range > 0
            && direct_matches.len() as f64 > self.direct_coverage_threshold * in_range as f64
        {
            AlignmentStrategy::Direct
        } else {
            AlignmentStrategy::Interpolated
        };

        tracing::debug!(
            in_range,
            accepted = direct_matches.len(),
            strategy = %strategy,
            "strategy selected"
        );

        Selection {
            strategy,
            in_range,
            direct_matches,
        }
    }
}

/// Index of the sample nearest to `t` in a sorted slice; ties go to the
/// earlier sample.
pub fn nearest_index(sorted: &[f64], t: f64) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }
    let upper = sorted.partition_point(|&x| x < t);
    if upper == 0 {
        return Some(0);
    }
    if upper == sorted.len() {
        return Some(sorted.len() - 1);
    }
    // First of a run of equal times
    let lower = sorted.partition_point(|&x| x < sorted[upper - 1]);
    if t - sorted[upper - 1] <= sorted[upper] - t {
        Some(lower)
    } else {
        Some(upper)
    }
}
