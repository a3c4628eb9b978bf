//! # Environmental De-rating Factors
//!
//! Multiplicative factors that reduce the theoretical yield of an array for
//! orientation and site conditions:
//!
//! ```text
//! E_adj = E × C_tilt × C_azimuth × C_shading × C_soiling × C_temperature
//! ```
//!
//! ## Factor Summary
//!
//! | Factor        | Condition                                  | Value |
//! |---------------|--------------------------------------------|-------|
//! | C_tilt        | 10° ≤ tilt ≤ 40°                           | 1.00  |
//! | C_tilt        | tilt < 10° (low self-cleaning, low angle)  | 0.95  |
//! | C_tilt        | tilt > 40°                                 | 0.90  |
//! | C_azimuth     | deviation from north ≤ 45°                 | 1.00  |
//! | C_azimuth     | 45° < deviation ≤ 90°                      | 0.85  |
//! | C_azimuth     | deviation > 90°                            | 0.70  |
//! | C_shading     | caller supplied, clamped to [0, 1]         | -     |
//! | C_soiling     | caller supplied, clamped to [0, 1]         | -     |
//! | C_temperature | caller supplied, clamped to [0, 1]         | -     |
//!
//! Azimuth is measured clockwise from north. The sites covered by this crate
//! lie in the southern hemisphere, so the equator-facing orientation is 0°.
//! The combined product is clamped to [`MIN_COMBINED_FACTOR`, 1.0].

use serde::{Deserialize, Serialize};

/// Equator-facing azimuth for southern-hemisphere sites (degrees)
pub const EQUATOR_FACING_AZIMUTH_DEG: f64 = 0.0;

/// Floor for the combined de-rating product
pub const MIN_COMBINED_FACTOR: f64 = 0.1;

/// Combined factor below which the adjusted yield deserves a warning
pub const SIGNIFICANT_DERATING: f64 = 0.85;

/// Tilt factor C_tilt
pub fn tilt_factor(tilt_deg: f64) -> f64 {
    if tilt_deg < 10.0 {
        0.95
    } else if tilt_deg > 40.0 {
        0.90
    } else {
        1.0
    }
}

/// Smallest angle between the array azimuth and the equator-facing azimuth
pub fn azimuth_deviation_deg(azimuth_deg: f64) -> f64 {
    let diff = (azimuth_deg - EQUATOR_FACING_AZIMUTH_DEG).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Azimuth factor C_azimuth
pub fn azimuth_factor(azimuth_deg: f64) -> f64 {
    let deviation = azimuth_deviation_deg(azimuth_deg);
    if deviation > 90.0 {
        0.70
    } else if deviation > 45.0 {
        0.85
    } else {
        1.0
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Site-condition factors supplied by the caller.
///
/// Each factor is a fraction of output retained (1.0 = no loss).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeratingFactors {
    /// Fraction retained after shading from nearby obstacles
    pub shading: f64,
    /// Fraction retained after dust/dirt accumulation
    pub soiling: f64,
    /// Fraction retained after cell temperature losses
    pub temperature: f64,
}

impl Default for DeratingFactors {
    fn default() -> Self {
        Self {
            shading: 1.0,
            soiling: 1.0,
            temperature: 1.0,
        }
    }
}

impl DeratingFactors {
    /// No site losses
    pub fn new() -> Self {
        Self::default()
    }

    /// Set shading factor
    pub fn with_shading(mut self, shading: f64) -> Self {
        self.shading = shading;
        self
    }

    /// Set soiling factor
    pub fn with_soiling(mut self, soiling: f64) -> Self {
        self.soiling = soiling;
        self
    }

    /// Set temperature factor
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Combine these site factors with the orientation factors.
    pub fn summary(&self, tilt_deg: f64, azimuth_deg: f64) -> DeratingSummary {
        let c_tilt = tilt_factor(tilt_deg);
        let c_azimuth = azimuth_factor(azimuth_deg);
        let c_shading = clamp_unit(self.shading);
        let c_soiling = clamp_unit(self.soiling);
        let c_temperature = clamp_unit(self.temperature);

        let combined = (c_tilt * c_azimuth * c_shading * c_soiling * c_temperature)
            .clamp(MIN_COMBINED_FACTOR, 1.0);

        DeratingSummary {
            c_tilt,
            c_azimuth,
            c_shading,
            c_soiling,
            c_temperature,
            combined,
        }
    }
}

/// Applied de-rating factors, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeratingSummary {
    pub c_tilt: f64,
    pub c_azimuth: f64,
    pub c_shading: f64,
    pub c_soiling: f64,
    pub c_temperature: f64,
    /// Clamped product of all factors
    pub combined: f64,
}

impl DeratingSummary {
    /// Percentage of theoretical yield lost to de-rating
    pub fn loss_pct(&self) -> f64 {
        (1.0 - self.combined) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilt_factors() {
        assert_eq!(tilt_factor(5.0), 0.95);
        assert_eq!(tilt_factor(10.0), 1.0);
        assert_eq!(tilt_factor(25.0), 1.0);
        assert_eq!(tilt_factor(40.0), 1.0);
        assert_eq!(tilt_factor(55.0), 0.90);
    }

    #[test]
    fn test_azimuth_deviation_wraps() {
        assert_eq!(azimuth_deviation_deg(0.0), 0.0);
        assert_eq!(azimuth_deviation_deg(350.0), 10.0);
        assert_eq!(azimuth_deviation_deg(180.0), 180.0);
        assert_eq!(azimuth_deviation_deg(270.0), 90.0);
    }

    #[test]
    fn test_azimuth_factors() {
        assert_eq!(azimuth_factor(30.0), 1.0);
        assert_eq!(azimuth_factor(45.0), 1.0);
        assert_eq!(azimuth_factor(60.0), 0.85);
        assert_eq!(azimuth_factor(300.0), 0.85);
        assert_eq!(azimuth_factor(180.0), 0.70);
    }

    #[test]
    fn test_default_summary_has_no_loss() {
        let summary = DeratingFactors::default().summary(20.0, 0.0);
        assert_eq!(summary.combined, 1.0);
        assert_eq!(summary.loss_pct(), 0.0);
    }

    #[test]
    fn test_factors_combine_multiplicatively() {
        let factors = DeratingFactors::new().with_shading(0.9).with_soiling(0.95);
        let summary = factors.summary(5.0, 60.0);
        // 0.95 × 0.85 × 0.9 × 0.95 × 1.0
        let expected = 0.95 * 0.85 * 0.9 * 0.95;
        assert!((summary.combined - expected).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_factors_clamped() {
        let factors = DeratingFactors::new().with_shading(1.4).with_temperature(-0.2);
        let summary = factors.summary(20.0, 0.0);
        assert_eq!(summary.c_shading, 1.0);
        assert_eq!(summary.c_temperature, 0.0);
        assert_eq!(summary.combined, MIN_COMBINED_FACTOR);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: DeratingFactors = serde_json::from_str(r#"{ "shading": 0.8 }"#).unwrap();
        assert_eq!(parsed.shading, 0.8);
        assert_eq!(parsed.soiling, 1.0);
        assert_eq!(parsed.temperature, 1.0);
    }
}
