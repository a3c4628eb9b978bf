//! # Regional Irradiance Data
//!
//! Typical average daily global horizontal irradiance for the 27 Brazilian
//! federative units, and the seasonal profile of each macro-region.
//!
//! These figures are convenience defaults used to prepopulate a
//! [`SiteData`](crate::input::SiteData) when the caller has no site
//! measurement. A figure the caller supplies is never replaced.
//!
//! ## Example
//!
//! ```rust
//! use pv_core::irradiance::{lookup, Region};
//!
//! let mg = lookup("mg").unwrap();
//! assert_eq!(mg.region, Region::Southeast);
//! assert!(mg.irradiance_kwh_m2_day > 5.0);
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Brazilian macro-region, used to pick a seasonal generation profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    North,
    Northeast,
    CenterWest,
    Southeast,
    South,
}

impl Region {
    /// All region variants
    pub const ALL: [Region; 5] = [
        Region::North,
        Region::Northeast,
        Region::CenterWest,
        Region::Southeast,
        Region::South,
    ];

    /// Month-by-month multipliers (January first) relative to the annual
    /// monthly mean. Each vector sums to 12.
    pub fn seasonal_factors(&self) -> [f64; 12] {
        match self {
            Region::North => [0.95, 0.88, 0.90, 0.92, 0.98, 1.04, 1.10, 1.14, 1.10, 1.04, 0.98, 0.97],
            Region::Northeast => [1.06, 1.04, 1.00, 0.94, 0.90, 0.86, 0.90, 0.98, 1.06, 1.10, 1.10, 1.06],
            Region::CenterWest => [1.00, 1.00, 1.00, 0.98, 0.96, 0.94, 0.98, 1.04, 1.04, 1.04, 1.02, 1.00],
            Region::Southeast => [1.12, 1.14, 1.04, 0.96, 0.84, 0.80, 0.84, 0.94, 0.96, 1.06, 1.14, 1.16],
            Region::South => [1.28, 1.20, 1.08, 0.90, 0.74, 0.64, 0.70, 0.84, 0.90, 1.12, 1.26, 1.34],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::Northeast => "Northeast",
            Region::CenterWest => "Center-West",
            Region::Southeast => "Southeast",
            Region::South => "South",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Typical irradiance record for one federative unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateIrradiance {
    /// Two-letter code (e.g., "SP")
    pub uf: &'static str,
    pub name: &'static str,
    /// Average daily irradiance (kWh/m²/day)
    pub irradiance_kwh_m2_day: f64,
    pub region: Region,
}

const fn state(uf: &'static str, name: &'static str, irradiance_kwh_m2_day: f64, region: Region) -> StateIrradiance {
    StateIrradiance {
        uf,
        name,
        irradiance_kwh_m2_day,
        region,
    }
}

/// All 27 federative units
pub const STATES: [StateIrradiance; 27] = [
    state("AC", "Acre", 4.6, Region::North),
    state("AL", "Alagoas", 5.4, Region::Northeast),
    state("AP", "Amapá", 4.9, Region::North),
    state("AM", "Amazonas", 4.5, Region::North),
    state("BA", "Bahia", 5.5, Region::Northeast),
    state("CE", "Ceará", 5.6, Region::Northeast),
    state("DF", "Distrito Federal", 5.4, Region::CenterWest),
    state("ES", "Espírito Santo", 5.0, Region::Southeast),
    state("GO", "Goiás", 5.4, Region::CenterWest),
    state("MA", "Maranhão", 5.2, Region::Northeast),
    state("MT", "Mato Grosso", 5.3, Region::CenterWest),
    state("MS", "Mato Grosso do Sul", 5.2, Region::CenterWest),
    state("MG", "Minas Gerais", 5.4, Region::Southeast),
    state("PA", "Pará", 4.9, Region::North),
    state("PB", "Paraíba", 5.6, Region::Northeast),
    state("PR", "Paraná", 4.6, Region::South),
    state("PE", "Pernambuco", 5.6, Region::Northeast),
    state("PI", "Piauí", 5.7, Region::Northeast),
    state("RJ", "Rio de Janeiro", 4.9, Region::Southeast),
    state("RN", "Rio Grande do Norte", 5.7, Region::Northeast),
    state("RS", "Rio Grande do Sul", 4.5, Region::South),
    state("RO", "Rondônia", 4.7, Region::North),
    state("RR", "Roraima", 4.9, Region::North),
    state("SC", "Santa Catarina", 4.4, Region::South),
    state("SP", "São Paulo", 4.8, Region::Southeast),
    state("SE", "Sergipe", 5.4, Region::Northeast),
    state("TO", "Tocantins", 5.4, Region::North),
];

static BY_UF: Lazy<HashMap<&'static str, &'static StateIrradiance>> =
    Lazy::new(|| STATES.iter().map(|s| (s.uf, s)).collect());

/// Look up a federative unit by its two-letter code (case-insensitive)
pub fn lookup(uf: &str) -> Option<&'static StateIrradiance> {
    BY_UF.get(uf.trim().to_uppercase().as_str()).copied()
}

/// Typical irradiance for a state, if the code is known
pub fn typical_irradiance(uf: &str) -> Option<f64> {
    lookup(uf).map(|s| s.irradiance_kwh_m2_day)
}

/// Macro-region for a state, if the code is known
pub fn region_for_state(uf: &str) -> Option<Region> {
    lookup(uf).map(|s| s.region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_states_indexed() {
        assert_eq!(BY_UF.len(), 27);
        for s in STATES.iter() {
            assert_eq!(lookup(s.uf).map(|found| found.name), Some(s.name));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(typical_irradiance("sp"), Some(4.8));
        assert_eq!(typical_irradiance(" Ce "), Some(5.6));
        assert_eq!(region_for_state("rs"), Some(Region::South));
    }

    #[test]
    fn test_unknown_state() {
        assert!(lookup("XX").is_none());
        assert!(typical_irradiance("").is_none());
    }

    #[test]
    fn test_seasonal_factors_average_one() {
        for region in Region::ALL {
            let sum: f64 = region.seasonal_factors().iter().sum();
            assert!((sum - 12.0).abs() < 1e-9, "{} sums to {}", region, sum);
        }
    }

    #[test]
    fn test_table_values_in_plausible_band() {
        for s in STATES.iter() {
            assert!(s.irradiance_kwh_m2_day >= 3.0 && s.irradiance_kwh_m2_day <= 7.0);
        }
    }

    #[test]
    fn test_region_serialization() {
        let json = serde_json::to_string(&Region::CenterWest).unwrap();
        assert_eq!(json, "\"center_west\"");
    }
}
