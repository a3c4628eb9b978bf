//! # PV Yield Formulas
//!
//! Energy yield of a module array and the inverse mappings used to size it.
//!
//! ## Notation
//!
//! - `P` = Module rated power (W)
//! - `H` = Average daily irradiance (kWh/m²/day)
//! - `PR` = Performance ratio (fraction of theoretical energy delivered)
//! - `N` = Module count
//! - `E_m` = Energy per module per month (kWh)
//!
//! ## Conventions
//!
//! - A month is [`DAYS_PER_MONTH`] days; a year is 12 such months.
//! - Inverse mappings round up: an array one module short never meets its
//!   target.
//! - A count that does not fit in `u32` is an error, never a saturated value.

use crate::errors::{CalcError, CalcResult};

/// Days in the standard month used for monthly yield
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Months per year
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Absorbs floating-point noise before rounding up, so that a target of
/// exactly `N` modules' worth never resolves to `N + 1`.
const CEIL_TOLERANCE: f64 = 1e-9;

const MAX_COUNT: f64 = u32::MAX as f64;

fn ceil_count(x: f64) -> CalcResult<u32> {
    let n = (x - CEIL_TOLERANCE).ceil();
    if n < 1.0 {
        Ok(1)
    } else if n <= MAX_COUNT {
        Ok(n as u32)
    } else {
        Err(CalcError::calculation_failed(
            "generation",
            format!("module count exceeds {} (requirement {:.3e})", u32::MAX, x),
        ))
    }
}

/// Energy produced by one module in a month (kWh)
///
/// # Formula
/// E_m = P × H × PR × 30 / 1000
#[inline]
pub fn energy_per_module_month(power_w: f64, irradiance_kwh_m2_day: f64, performance_ratio: f64) -> f64 {
    power_w * irradiance_kwh_m2_day * performance_ratio * DAYS_PER_MONTH / 1000.0
}

/// Monthly energy of an N-module array (kWh)
#[inline]
pub fn array_energy_month(energy_per_module: f64, module_count: u32) -> f64 {
    energy_per_module * f64::from(module_count)
}

/// Annual energy from a monthly figure (kWh)
#[inline]
pub fn annual_from_monthly(monthly_kwh: f64) -> f64 {
    monthly_kwh * MONTHS_PER_YEAR
}

/// Installed DC power (kWp)
///
/// # Formula
/// P_inst = N × P / 1000
#[inline]
pub fn installed_power_kwp(module_count: u32, power_w: f64) -> f64 {
    f64::from(module_count) * power_w / 1000.0
}

/// Modules needed to reach a monthly energy target
///
/// # Formula
/// N = ⌈E_target / E_m⌉, at least 1
///
/// Fails when N does not fit in `u32` (including an infinite or NaN ratio).
pub fn modules_for_energy(target_monthly_kwh: f64, energy_per_module: f64) -> CalcResult<u32> {
    ceil_count(target_monthly_kwh / energy_per_module)
}

/// Modules needed to reach an installed power target
///
/// # Formula
/// N = ⌈P_target × 1000 / P⌉, at least 1
pub fn modules_for_power(target_kwp: f64, power_w: f64) -> CalcResult<u32> {
    ceil_count(target_kwp * 1000.0 / power_w)
}

/// Largest module count whose installed power does not exceed a ceiling, at least 1
///
/// A ceiling beyond `u32::MAX` modules is clamped there: it bounds a count
/// that is already a `u32`.
pub fn max_modules_for_power(ceiling_kwp: f64, power_w: f64) -> u32 {
    let n = (ceiling_kwp * 1000.0 / power_w + CEIL_TOLERANCE).floor();
    if n < 1.0 {
        1
    } else {
        n.min(MAX_COUNT) as u32
    }
}

/// Generation as a share of consumption (%)
#[inline]
pub fn compensation_pct(generation_kwh: f64, consumption_kwh: f64) -> f64 {
    generation_kwh / consumption_kwh * 100.0
}

// =============================================================================
// UNIT TESTS
// =============================================================================
