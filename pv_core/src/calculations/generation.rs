//! # Generation Model
//!
//! Converts a module count into monthly and annual energy yield, and
//! provides the de-rated and seasonal views of that yield.
//!
//! ## Example
//!
//! ```rust
//! use pv_core::calculations::generation::calculate;
//! use pv_core::input::ModuleSpec;
//!
//! let result = calculate(11, &ModuleSpec::sample(), 4.5, 0.64).unwrap();
//! assert_eq!(result.energy_year_kwh, result.energy_month_kwh * 12.0);
//! assert!((result.energy_month_kwh - 522.72).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derating::DeratingSummary;
use crate::equations::generation as eq;
use crate::errors::{ensure_finite, CalcError, CalcResult, Diagnostics};
use crate::input::{EquipmentSpec, ModuleSpec, SiteData};
use crate::irradiance::{self, Region};

/// Installed power above which a system is flagged for review (kWp)
pub const SANITY_MAX_POWER_KWP: f64 = 1000.0;

/// Monthly yield per module above which the inputs are flagged (kWh)
pub const SANITY_MAX_KWH_PER_MODULE: f64 = 150.0;

/// Energy yield of an array.
///
/// `energy_year_kwh` is always exactly `energy_month_kwh * 12`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Energy produced by one module in a month (kWh)
    pub energy_per_module_kwh_month: f64,
    /// Energy produced by the array in a month (kWh)
    pub energy_month_kwh: f64,
    /// Energy produced by the array in a year (kWh)
    pub energy_year_kwh: f64,
    pub module_count: u32,
    /// Installed DC power (kWp)
    pub installed_power_kwp: f64,
}

/// Calculate the yield of `module_count` modules.
pub fn calculate(
    module_count: u32,
    module: &ModuleSpec,
    irradiance_kwh_m2_day: f64,
    performance_ratio: f64,
) -> CalcResult<GenerationResult> {
    let per_module = ensure_finite(
        "generation",
        "energy per module",
        eq::energy_per_module_month(module.power_w, irradiance_kwh_m2_day, performance_ratio),
    )?;
    let energy_month_kwh = eq::array_energy_month(per_module, module_count);

    Ok(GenerationResult {
        energy_per_module_kwh_month: per_module,
        energy_month_kwh,
        energy_year_kwh: eq::annual_from_monthly(energy_month_kwh),
        module_count,
        installed_power_kwp: eq::installed_power_kwp(module_count, module.power_w),
    })
}

/// Calculate the yield of `module_count` modules for a given site and equipment.
pub fn for_site(module_count: u32, site: &SiteData, equipment: &EquipmentSpec) -> CalcResult<GenerationResult> {
    calculate(
        module_count,
        &equipment.module,
        site.irradiance_kwh_m2_day,
        equipment.performance_ratio(),
    )
}

/// Energy per module per month for a site and equipment (kWh), rejecting
/// non-positive yields that would make the inverse mappings meaningless.
pub fn energy_per_module(site: &SiteData, equipment: &EquipmentSpec) -> CalcResult<f64> {
    let e = eq::energy_per_module_month(
        equipment.module.power_w,
        site.irradiance_kwh_m2_day,
        equipment.performance_ratio(),
    );
    if !(e > 0.0 && e.is_finite()) {
        return Err(CalcError::calculation_failed(
            "generation",
            format!("energy per module must be positive, got {}", e),
        ));
    }
    Ok(e)
}

/// Yield after environmental de-rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeratedGeneration {
    pub factors: DeratingSummary,
    pub energy_month_kwh: f64,
    pub energy_year_kwh: f64,
}

/// Apply the site's orientation and loss factors to a yield.
pub fn derate(result: &GenerationResult, site: &SiteData) -> DeratedGeneration {
    let factors = site.derating.summary(site.tilt_deg, site.azimuth_deg);
    let energy_month_kwh = result.energy_month_kwh * factors.combined;
    DeratedGeneration {
        factors,
        energy_month_kwh,
        energy_year_kwh: eq::annual_from_monthly(energy_month_kwh),
    }
}

/// Spread an annual total across the 12 months (January first) using the
/// region's seasonal profile. Without a region the split is flat. The months
/// always sum to `annual_kwh`.
pub fn seasonal_distribution(annual_kwh: f64, region: Option<Region>) -> [f64; 12] {
    let factors = region.map(|r| r.seasonal_factors()).unwrap_or([1.0; 12]);
    let total: f64 = factors.iter().sum();
    let mut months = [0.0; 12];
    for (month, factor) in months.iter_mut().zip(factors.iter()) {
        *month = annual_kwh * factor / total;
    }
    months
}

/// Seasonal distribution for a site's state
pub fn seasonal_for_site(annual_kwh: f64, site: &SiteData) -> [f64; 12] {
    seasonal_distribution(annual_kwh, irradiance::region_for_state(&site.state))
}

/// Check a generation result.
///
/// Non-positive count, power or energy are errors. Very large systems and
/// implausible per-module yields are warnings.
pub fn validate(result: &GenerationResult) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if result.module_count == 0 {
        diags.error("Generation: module count must be at least 1");
    }
    if !(result.installed_power_kwp > 0.0) {
        diags.error(format!(
            "Generation: installed power must be positive (got {:.3} kWp)",
            result.installed_power_kwp
        ));
    }
    if !(result.energy_month_kwh > 0.0) {
        diags.error(format!(
            "Generation: monthly energy must be positive (got {:.2} kWh)",
            result.energy_month_kwh
        ));
    }

    if result.installed_power_kwp > SANITY_MAX_POWER_KWP {
        diags.warn(format!(
            "Generation: installed power of {:.1} kWp exceeds {:.0} kWp; check the inputs",
            result.installed_power_kwp, SANITY_MAX_POWER_KWP
        ));
    }
    if result.energy_per_module_kwh_month > SANITY_MAX_KWH_PER_MODULE {
        diags.warn(format!(
            "Generation: {:.1} kWh/month per module exceeds {:.0} kWh; module power or irradiance may be mis-specified",
            result.energy_per_module_kwh_month, SANITY_MAX_KWH_PER_MODULE
        ));
    }

    debug!(
        modules = result.module_count,
        kwp = result.installed_power_kwp,
        kwh_month = result.energy_month_kwh,
        errors = diags.errors.len(),
        warnings = diags.warnings.len(),
        "generation validated"
    );
    diags
}
