//! Proximity Configuration

use serde::{Deserialize, Serialize};

/// Upper bound for `max_count`
pub const COUNT_LIMIT: usize = 10_000;

/// Fuzzy map generation parameters
///
/// Radii are in render units around the viewer; `distance_scale` converts a
/// render radius into the meters shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    // === Radius Band ===
    /// Smallest offset from the viewer (default: 20.0). Must stay above zero.
    pub min_radius: f64,
    /// Largest offset, bounding the visible cluster (default: 170.0)
    pub max_radius: f64,

    // === Distance Estimate ===
    /// Meters per render unit (default: 2.0)
    pub distance_scale: f64,
    /// Relative jitter applied to real actor distances (default: 0.25)
    pub radius_jitter: f64,

    // === Batch Defaults ===
    /// Points per synthetic batch (default: 15)
    pub default_count: usize,
    /// Probability that a synthetic point is a seeker (default: 0.3)
    pub default_role_ratio: f64,
    /// Largest batch a caller may request (default: 500)
    pub max_count: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            min_radius: 20.0,
            max_radius: 170.0,

            distance_scale: 2.0,
            radius_jitter: 0.25,

            default_count: 15,
            default_role_ratio: 0.3,
            max_count: 500,
        }
    }
}

impl ProximityConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_radius.is_finite() && self.min_radius > 0.0) {
            return Err(format!("min_radius must be > 0, got {}", self.min_radius));
        }
        if !(self.max_radius.is_finite() && self.max_radius > self.min_radius) {
            return Err(format!(
                "max_radius must be greater than min_radius ({}), got {}",
                self.min_radius, self.max_radius
            ));
        }
        if !(self.distance_scale.is_finite() && self.distance_scale > 0.0) {
            return Err(format!("distance_scale must be > 0, got {}", self.distance_scale));
        }
        if !(0.0..1.0).contains(&self.radius_jitter) {
            return Err(format!("radius_jitter must be in [0, 1), got {}", self.radius_jitter));
        }
        if !(0.0..=1.0).contains(&self.default_role_ratio) {
            return Err(format!(
                "default_role_ratio must be in [0, 1], got {}",
                self.default_role_ratio
            ));
        }
        if self.max_count == 0 || self.max_count > COUNT_LIMIT {
            return Err(format!("max_count must be in [1, {COUNT_LIMIT}], got {}", self.max_count));
        }
        if self.default_count > self.max_count {
            return Err(format!(
                "default_count ({}) exceeds max_count ({})",
                self.default_count, self.max_count
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ProximityConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_min_radius_rejected() {
        let cfg = ProximityConfig { min_radius: 0.0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let cfg = ProximityConfig { min_radius: 50.0, max_radius: 40.0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_nan_ratio_rejected() {
        let cfg = ProximityConfig { default_role_ratio: f64::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_count_limits() {
        let cfg = ProximityConfig { max_count: 0, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = ProximityConfig { max_count: COUNT_LIMIT + 1, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = ProximityConfig { default_count: 20, max_count: 10, ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("default_count"));
    }
}
