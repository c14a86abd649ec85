//! Alignment configuration contracts shared by the engine and the config loader.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tuning knobs for one alignment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AlignmentConfig {
    /// Max |Δt| (seconds) for a nearest-sample match to count as direct
    #[serde(default = "default_tolerance_seconds")]
    #[validate(range(exclusive_min = 0.0))]
    pub tolerance_seconds: f64,

    /// Fraction of in-overlap frames that must match directly to pick Direct
    #[serde(default = "default_direct_coverage_threshold")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub direct_coverage_threshold: f64,

    /// What to do with frames outside the pressure time range
    #[serde(default)]
    pub extrapolation: ExtrapolationPolicy,

    /// Shift each stream so that its earliest timestamp becomes zero
    #[serde(default = "default_normalize_origin")]
    pub normalize_origin: bool,
}

fn default_tolerance_seconds() -> f64 {
    0.1
}

fn default_direct_coverage_threshold() -> f64 {
    0.5
}

fn default_normalize_origin() -> bool {
    true
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            tolerance_seconds: default_tolerance_seconds(),
            direct_coverage_threshold: default_direct_coverage_threshold(),
            extrapolation: ExtrapolationPolicy::default(),
            normalize_origin: default_normalize_origin(),
        }
    }
}

impl AlignmentConfig {
    pub fn with_tolerance(mut self, seconds: f64) -> Self {
        self.tolerance_seconds = seconds;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.direct_coverage_threshold = threshold;
        self
    }

    pub fn with_extrapolation(mut self, policy: ExtrapolationPolicy) -> Self {
        self.extrapolation = policy;
        self
    }

    pub fn with_normalize_origin(mut self, normalize: bool) -> Self {
        self.normalize_origin = normalize;
        self
    }
}

/// Handling of frames whose time falls outside the pressure samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationPolicy {
    /// Hold the nearest edge value
    #[default]
    Clamp,
    /// Leave pressure empty
    Omit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlignmentConfig::default();
        assert_eq!(config.tolerance_seconds, 0.1);
        assert_eq!(config.direct_coverage_threshold, 0.5);
        assert_eq!(config.extrapolation, ExtrapolationPolicy::Clamp);
        assert!(config.normalize_origin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_range_rules() {
        assert!(AlignmentConfig::default()
            .with_tolerance(0.0)
            .validate()
            .is_err());
        assert!(AlignmentConfig::default()
            .with_threshold(1.5)
            .validate()
            .is_err());
        assert!(AlignmentConfig::default()
            .with_threshold(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AlignmentConfig = toml::from_str("extrapolation = \"omit\"").unwrap();
        assert_eq!(config.extrapolation, ExtrapolationPolicy::Omit);
        assert_eq!(config.tolerance_seconds, 0.1);
    }
}
