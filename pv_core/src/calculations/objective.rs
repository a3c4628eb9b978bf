//! # Objective Resolution
//!
//! Decides the module count from the customer's stated [`Objective`]:
//!
//! | Objective          | Target                         | Module count              |
//! |--------------------|--------------------------------|---------------------------|
//! | `generate_kwh`     | monthly energy (kWh)           | ⌈target / E_m⌉            |
//! | `set_power`        | installed power (kWp)          | ⌈target × 1000 / P⌉       |
//! | `use_module_count` | literal count                  | target                    |
//! | `zero_bill`        | consumption × compensation %   | as `generate_kwh`         |
//!
//! Every branch recomputes generation and compensation from the whole
//! (rounded-up) module count, never from the fractional requirement.
//!
//! ## Example
//!
//! ```rust
//! use pv_core::calculations::objective::resolve;
//! use pv_core::input::{CustomerData, EquipmentSpec, SiteData};
//!
//! let site = SiteData::sample().with_irradiance(4.5);
//! let result = resolve(&CustomerData::sample(), &site, &EquipmentSpec::sample()).unwrap();
//!
//! // 500 kWh at 47.52 kWh per module → 11 modules
//! assert_eq!(result.module_count, 11);
//! assert!((result.compensation_pct - 104.54).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compatibility::optimal_modules_per_string;
use super::generation;
use crate::equations::generation as eq;
use crate::errors::{CalcError, CalcResult, Diagnostics};
use crate::input::{CustomerData, EquipmentSpec, Objective, OptimizationOptions, SiteData};

/// Compensation below which a system is likely undersized (%)
pub const UNDERSIZED_COMPENSATION_PCT: f64 = 50.0;

/// Compensation above which a system is likely oversized (%)
pub const OVERSIZED_COMPENSATION_PCT: f64 = 150.0;

/// Target multiplier for the conservative alternative
pub const CONSERVATIVE_SCALE: f64 = 0.9;

/// Target multiplier for the aggressive alternative
pub const AGGRESSIVE_SCALE: f64 = 1.1;

/// A resolved sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveResult {
    /// The objective this sizing satisfies
    pub objective: Objective,
    pub module_count: u32,
    /// Installed DC power (kWp)
    pub installed_power_kwp: f64,
    /// Monthly generation with `module_count` modules (kWh)
    pub monthly_generation_kwh: f64,
    /// Generation / consumption × 100
    pub compensation_pct: f64,
}

/// Recompute a result from a whole module count.
fn build(
    objective: Objective,
    module_count: u32,
    customer: &CustomerData,
    site: &SiteData,
    equipment: &EquipmentSpec,
) -> CalcResult<ObjectiveResult> {
    let energy = generation::for_site(module_count, site, equipment)?;
    Ok(ObjectiveResult {
        objective,
        module_count,
        installed_power_kwp: energy.installed_power_kwp,
        monthly_generation_kwh: energy.energy_month_kwh,
        compensation_pct: eq::compensation_pct(energy.energy_month_kwh, customer.monthly_consumption_kwh),
    })
}

/// Size for a monthly energy target.
fn resolve_energy_target(
    objective: Objective,
    target_monthly_kwh: f64,
    customer: &CustomerData,
    site: &SiteData,
    equipment: &EquipmentSpec,
) -> CalcResult<ObjectiveResult> {
    let per_module = generation::energy_per_module(site, equipment)?;
    let count = eq::modules_for_energy(target_monthly_kwh, per_module)?;
    build(objective, count, customer, site, equipment)
}

/// Monthly energy a zero-bill objective aims for (kWh)
pub fn zero_bill_target_kwh(customer: &CustomerData) -> f64 {
    customer.monthly_consumption_kwh * customer.compensation_target_pct / 100.0
}

/// Resolve the customer's objective into a module count.
pub fn resolve(customer: &CustomerData, site: &SiteData, equipment: &EquipmentSpec) -> CalcResult<ObjectiveResult> {
    let objective = customer.objective;
    let result = match objective {
        Objective::GenerateKwh { monthly_kwh } => {
            resolve_energy_target(objective, monthly_kwh, customer, site, equipment)?
        }
        Objective::SetPower { kwp } => {
            let count = eq::modules_for_power(kwp, equipment.module.power_w)?;
            build(objective, count, customer, site, equipment)?
        }
        Objective::UseModuleCount { modules } => build(objective, modules.max(1), customer, site, equipment)?,
        Objective::ZeroBill => {
            resolve_energy_target(objective, zero_bill_target_kwh(customer), customer, site, equipment)?
        }
    };

    debug!(
        objective = objective.code(),
        modules = result.module_count,
        kwp = result.installed_power_kwp,
        compensation_pct = result.compensation_pct,
        "objective resolved"
    );
    Ok(result)
}

/// Adjust a resolved count per the optimization options.
///
/// `maximize_efficiency` rounds the count up to whole strings of the optimal
/// length; `max_power_kwp` then caps the count. Generation and compensation
/// are recomputed from the final count.
pub fn optimize(
    result: &ObjectiveResult,
    options: &OptimizationOptions,
    customer: &CustomerData,
    site: &SiteData,
    equipment: &EquipmentSpec,
) -> CalcResult<ObjectiveResult> {
    let mut count = result.module_count;

    if options.maximize_efficiency {
        if let Some(per_string) = optimal_modules_per_string(&equipment.module, &equipment.inverter) {
            count = count.div_ceil(per_string).checked_mul(per_string).ok_or_else(|| {
                CalcError::calculation_failed(
                    "objective",
                    format!("{} modules cannot be rounded up to whole strings of {}", count, per_string),
                )
            })?;
        }
    }
    if let Some(cap_kwp) = options.max_power_kwp {
        count = count.min(eq::max_modules_for_power(cap_kwp, equipment.module.power_w));
    }

    if count == result.module_count {
        return Ok(*result);
    }
    debug!(from = result.module_count, to = count, "module count optimized");
    build(result.objective, count, customer, site, equipment)
}

/// Which way an alternative moves the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    Conservative,
    Aggressive,
}

/// A comparison sizing with a scaled target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub kind: AlternativeKind,
    /// Multiplier applied to the objective's target
    pub scale: f64,
    pub result: ObjectiveResult,
}

/// The customer's record with the objective's target scaled.
fn scaled_customer(customer: &CustomerData, scale: f64) -> CalcResult<CustomerData> {
    let mut scaled = customer.clone();
    scaled.objective = match customer.objective {
        Objective::GenerateKwh { monthly_kwh } => Objective::GenerateKwh {
            monthly_kwh: monthly_kwh * scale,
        },
        Objective::SetPower { kwp } => Objective::SetPower { kwp: kwp * scale },
        Objective::UseModuleCount { modules } => {
            let n = (f64::from(modules) * scale).round();
            if n > f64::from(u32::MAX) {
                return Err(CalcError::calculation_failed(
                    "objective",
                    format!("module count exceeds {} when scaled by {}", u32::MAX, scale),
                ));
            }
            Objective::UseModuleCount {
                modules: (n as u32).max(1),
            }
        }
        Objective::ZeroBill => {
            scaled.compensation_target_pct = customer.compensation_target_pct * scale;
            Objective::ZeroBill
        }
    };
    Ok(scaled)
}

/// Conservative (-10 %) and aggressive (+10 %) variants of the same resolution.
pub fn alternatives(customer: &CustomerData, site: &SiteData, equipment: &EquipmentSpec) -> CalcResult<Vec<Alternative>> {
    [
        (AlternativeKind::Conservative, CONSERVATIVE_SCALE),
        (AlternativeKind::Aggressive, AGGRESSIVE_SCALE),
    ]
    .into_iter()
    .map(|(kind, scale)| {
        let scaled = scaled_customer(customer, scale)?;
        let mut result = resolve(&scaled, site, equipment)?;
        // Compensation stays relative to the real consumption
        result.compensation_pct = eq::compensation_pct(result.monthly_generation_kwh, customer.monthly_consumption_kwh);
        Ok(Alternative { kind, scale, result })
    })
    .collect()
}

/// Check a resolved sizing.
///
/// A zero count or non-positive power is an error; compensation outside
/// 50-150 % is a warning.
pub fn validate(result: &ObjectiveResult) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if result.module_count == 0 {
        diags.error("Objective: module count must be at least 1");
    }
    if !(result.installed_power_kwp > 0.0) {
        diags.error("Objective: installed power must be positive");
    }

    if result.compensation_pct < UNDERSIZED_COMPENSATION_PCT {
        diags.warn(format!(
            "Objective: compensation of {:.1}% is below {:.0}%; the system is likely undersized",
            result.compensation_pct, UNDERSIZED_COMPENSATION_PCT
        ));
    } else if result.compensation_pct > OVERSIZED_COMPENSATION_PCT {
        diags.warn(format!(
            "Objective: compensation of {:.1}% is above {:.0}%; the system is likely oversized",
            result.compensation_pct, OVERSIZED_COMPENSATION_PCT
        ));
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData::sample().with_irradiance(4.5)
    }

    fn customer(objective: Objective) -> CustomerData {
        CustomerData {
            objective,
            ..CustomerData::sample()
        }
    }

    #[test]
    fn test_zero_bill_scenario() {
        let result = resolve(&customer(Objective::ZeroBill), &site(), &EquipmentSpec::sample()).unwrap();
        assert_eq!(result.module_count, 11);
        assert!((result.monthly_generation_kwh - 522.72).abs() < 1e-6);
        assert!((result.compensation_pct - 104.544).abs() < 1e-6);
    }

    #[test]
    fn test_zero_bill_composes_generate_kwh() {
        let eq = EquipmentSpec::sample();
        let zero = resolve(&customer(Objective::ZeroBill), &site(), &eq).unwrap();
        let explicit = resolve(&customer(Objective::GenerateKwh { monthly_kwh: 500.0 }), &site(), &eq).unwrap();
        assert_eq!(zero.module_count, explicit.module_count);
        assert_eq!(zero.monthly_generation_kwh, explicit.monthly_generation_kwh);
    }

    #[test]
    fn test_partial_compensation_target() {
        let mut c = customer(Objective::ZeroBill);
        c.compensation_target_pct = 50.0;
        assert_eq!(zero_bill_target_kwh(&c), 250.0);
        // 250 / 47.52 = 5.26 → 6
        let result = resolve(&c, &site(), &EquipmentSpec::sample()).unwrap();
        assert_eq!(result.module_count, 6);
    }

    #[test]
    fn test_ceiling_meets_target() {
        let eq = EquipmentSpec::sample();
        for target in [120.0, 333.3, 500.0, 999.9, 4321.0] {
            let result = resolve(&customer(Objective::GenerateKwh { monthly_kwh: target }), &site(), &eq).unwrap();
            assert!(result.monthly_generation_kwh >= target - 1e-9);
            let one_less = generation::for_site(result.module_count - 1, &site(), &eq).unwrap();
            assert!(one_less.energy_month_kwh < target, "target {}", target);
        }
    }

    #[test]
    fn test_set_power_matches_module_count() {
        let eq = EquipmentSpec::sample();
        for n in [1_u32, 9, 12, 37, 120] {
            let kwp = f64::from(n) * eq.module.power_w / 1000.0;
            let by_power = resolve(&customer(Objective::SetPower { kwp }), &site(), &eq).unwrap();
            let by_count = resolve(&customer(Objective::UseModuleCount { modules: n }), &site(), &eq).unwrap();
            assert_eq!(by_power.module_count, n);
            assert_eq!(by_count.module_count, n);
        }
    }

    #[test]
    fn test_set_power_rounds_up() {
        // 5.0 kWp / 0.55 = 9.09 → 10
        let result = resolve(&customer(Objective::SetPower { kwp: 5.0 }), &site(), &EquipmentSpec::sample()).unwrap();
        assert_eq!(result.module_count, 10);
        assert!((result.installed_power_kwp - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_optimize_snaps_to_whole_strings() {
        let eq = EquipmentSpec::sample();
        let base = resolve(&customer(Objective::ZeroBill), &site(), &eq).unwrap();
        let options = OptimizationOptions {
            maximize_efficiency: true,
            max_power_kwp: None,
        };
        let snapped = optimize(&base, &options, &customer(Objective::ZeroBill), &site(), &eq).unwrap();
        // 11 → 16 (two strings of 8)
        assert_eq!(snapped.module_count, 16);
        assert!(snapped.compensation_pct > base.compensation_pct);
    }

    #[test]
    fn test_optimize_caps_power() {
        let eq = EquipmentSpec::sample();
        let base = resolve(&customer(Objective::ZeroBill), &site(), &eq).unwrap();
        let options = OptimizationOptions {
            maximize_efficiency: true,
            max_power_kwp: Some(5.0),
        };
        let capped = optimize(&base, &options, &customer(Objective::ZeroBill), &site(), &eq).unwrap();
        assert_eq!(capped.module_count, 9);
        assert!(capped.installed_power_kwp <= 5.0);
    }

    #[test]
    fn test_optimize_noop_returns_same() {
        let eq = EquipmentSpec::sample();
        let base = resolve(&customer(Objective::ZeroBill), &site(), &eq).unwrap();
        let same = optimize(&base, &OptimizationOptions::default(), &customer(Objective::ZeroBill), &site(), &eq).unwrap();
        assert_eq!(base, same);
    }

    #[test]
    fn test_optimize_string_rounding_overflow_is_an_error() {
        let eq = EquipmentSpec::sample();
        let c = customer(Objective::UseModuleCount { modules: u32::MAX });
        let base = resolve(&c, &site(), &eq).unwrap();
        let options = OptimizationOptions {
            maximize_efficiency: true,
            max_power_kwp: None,
        };
        // ⌈(2³² - 1) / 8⌉ × 8 = 2³²
        let err = optimize(&base, &options, &c, &site(), &eq).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_unrepresentable_requirement_is_an_error() {
        let eq = EquipmentSpec::sample();
        let mut c = customer(Objective::ZeroBill);
        c.monthly_consumption_kwh = 1e12;
        let err = resolve(&c, &site(), &eq).unwrap_err();
        assert!(err.to_string().contains("module count exceeds"));

        let huge = customer(Objective::SetPower { kwp: 1e10 });
        assert!(resolve(&huge, &site(), &eq).is_err());

        let all = customer(Objective::UseModuleCount { modules: u32::MAX });
        assert!(alternatives(&all, &site(), &eq).is_err());
    }

    #[test]
    fn test_alternatives_bracket_base() {
        let eq = EquipmentSpec::sample();
        let c = customer(Objective::ZeroBill);
        let base = resolve(&c, &site(), &eq).unwrap();
        let alts = alternatives(&c, &site(), &eq).unwrap();

        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].kind, AlternativeKind::Conservative);
        assert_eq!(alts[1].kind, AlternativeKind::Aggressive);
        // 450 kWh → 10 modules, 550 kWh → 12 modules
        assert_eq!(alts[0].result.module_count, 10);
        assert_eq!(alts[1].result.module_count, 12);
        assert!(alts[0].result.module_count <= base.module_count);
        assert!(alts[1].result.module_count >= base.module_count);
    }

    #[test]
    fn test_alternatives_for_module_count() {
        let eq = EquipmentSpec::sample();
        let c = customer(Objective::UseModuleCount { modules: 20 });
        let alts = alternatives(&c, &site(), &eq).unwrap();
        assert_eq!(alts[0].result.module_count, 18);
        assert_eq!(alts[1].result.module_count, 22);
    }

    #[test]
    fn test_validate_compensation_band() {
        let eq = EquipmentSpec::sample();
        let small = resolve(&customer(Objective::UseModuleCount { modules: 4 }), &site(), &eq).unwrap();
        let diags = validate(&small);
        assert!(diags.errors.is_empty());
        assert!(diags.warnings[0].contains("undersized"));

        let big = resolve(&customer(Objective::UseModuleCount { modules: 20 }), &site(), &eq).unwrap();
        assert!(validate(&big).warnings[0].contains("oversized"));

        let right = resolve(&customer(Objective::ZeroBill), &site(), &eq).unwrap();
        assert!(validate(&right).warnings.is_empty());
    }
}
