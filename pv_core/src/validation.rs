//! # Input Validation
//!
//! Field-level checks on a [`ProjectInput`]. Every check appends a
//! human-readable message instead of returning early, so a caller sees
//! every problem in one pass. An empty list means the record is valid.
//!
//! Validation never fails with an error value and never modifies the record.
//!
//! ## Example
//!
//! ```rust
//! use pv_core::input::ProjectInput;
//! use pv_core::validation::validate_all;
//!
//! let mut input = ProjectInput::sample();
//! assert!(validate_all(&input).is_empty());
//!
//! input.site.tilt_deg = 95.0;
//! let errors = validate_all(&input);
//! assert_eq!(errors.len(), 1);
//! assert!(errors[0].contains("site.tilt_deg"));
//! ```

use crate::calculations::financial::FinancialParams;
use crate::errors::CalcError;
use crate::input::{CustomerData, EquipmentSpec, Objective, ProjectInput, SiteData};
use crate::irradiance;

/// Upper bound accepted for average daily irradiance (kWh/m²/day)
pub const MAX_IRRADIANCE: f64 = 8.0;

/// Irradiance band considered physically typical (kWh/m²/day)
pub const TYPICAL_IRRADIANCE_RANGE: (f64, f64) = (3.0, 7.0);

fn require_text(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(CalcError::missing_field(field).to_string());
    }
}

fn require_positive(errors: &mut Vec<String>, field: &str, value: f64, reason: &str) {
    if !(value > 0.0 && value.is_finite()) {
        errors.push(CalcError::invalid_input(field, value.to_string(), reason).to_string());
    }
}

fn require_range(errors: &mut Vec<String>, field: &str, value: f64, min: f64, max: f64, reason: &str) {
    if !(min..=max).contains(&value) {
        errors.push(CalcError::invalid_input(field, value.to_string(), reason).to_string());
    }
}

/// Fraction in (0, 1]
fn require_fraction(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value > 0.0 && value <= 1.0) {
        errors.push(
            CalcError::invalid_input(field, value.to_string(), "Must be greater than 0 and at most 1").to_string(),
        );
    }
}

/// Validate site location, orientation and irradiance.
pub fn validate_site(site: &SiteData) -> Vec<String> {
    let mut errors = Vec::new();

    require_text(&mut errors, "site.city", &site.city);
    require_text(&mut errors, "site.state", &site.state);
    require_range(&mut errors, "site.tilt_deg", site.tilt_deg, 0.0, 90.0, "Tilt must be within 0-90 degrees");
    require_range(
        &mut errors,
        "site.azimuth_deg",
        site.azimuth_deg,
        0.0,
        360.0,
        "Azimuth must be within 0-360 degrees",
    );
    if !(site.irradiance_kwh_m2_day > 0.0 && site.irradiance_kwh_m2_day <= MAX_IRRADIANCE) {
        errors.push(
            CalcError::invalid_input(
                "site.irradiance_kwh_m2_day",
                site.irradiance_kwh_m2_day.to_string(),
                format!("Irradiance must be greater than 0 and at most {} kWh/m²/day", MAX_IRRADIANCE),
            )
            .to_string(),
        );
    }
    if let Some(area) = site.usable_area_m2 {
        require_positive(&mut errors, "site.usable_area_m2", area, "Usable area must be positive");
    }

    let d = &site.derating;
    for (field, value) in [
        ("site.derating.shading", d.shading),
        ("site.derating.soiling", d.soiling),
        ("site.derating.temperature", d.temperature),
    ] {
        require_fraction(&mut errors, field, value);
    }

    errors
}

/// Advisory notes about a site that passed validation.
pub fn site_warnings(site: &SiteData) -> Vec<String> {
    let mut warnings = Vec::new();
    let (low, high) = TYPICAL_IRRADIANCE_RANGE;
    if site.irradiance_kwh_m2_day < low || site.irradiance_kwh_m2_day > high {
        warnings.push(format!(
            "Irradiance of {:.2} kWh/m²/day is outside the typical {:.0}-{:.0} band; confirm the measurement",
            site.irradiance_kwh_m2_day, low, high
        ));
    }
    if !site.state.trim().is_empty() && irradiance::lookup(&site.state).is_none() {
        warnings.push(format!(
            "State '{}' is not a known federative unit; a flat seasonal profile is used",
            site.state
        ));
    }
    warnings
}

/// Validate consumption, class and the objective's target.
pub fn validate_customer(customer: &CustomerData) -> Vec<String> {
    let mut errors = Vec::new();

    require_text(&mut errors, "customer.name", &customer.name);
    require_positive(
        &mut errors,
        "customer.monthly_consumption_kwh",
        customer.monthly_consumption_kwh,
        "Monthly consumption must be positive",
    );
    require_positive(
        &mut errors,
        "customer.compensation_target_pct",
        customer.compensation_target_pct,
        "Compensation target must be positive",
    );

    match customer.objective {
        Objective::GenerateKwh { monthly_kwh } => require_positive(
            &mut errors,
            "customer.objective.monthly_kwh",
            monthly_kwh,
            "Target monthly generation must be positive",
        ),
        Objective::SetPower { kwp } => require_positive(
            &mut errors,
            "customer.objective.kwp",
            kwp,
            "Target installed power must be positive",
        ),
        Objective::UseModuleCount { modules } => {
            if modules == 0 {
                errors.push(
                    CalcError::invalid_input("customer.objective.modules", "0", "Module count must be at least 1")
                        .to_string(),
                );
            }
        }
        Objective::ZeroBill => {}
    }

    errors
}

/// Validate module and inverter datasheet values and system efficiency.
pub fn validate_equipment(equipment: &EquipmentSpec) -> Vec<String> {
    let mut errors = Vec::new();
    let m = &equipment.module;
    let inv = &equipment.inverter;

    require_text(&mut errors, "equipment.module.brand", &m.brand);
    require_text(&mut errors, "equipment.module.model", &m.model);
    require_positive(&mut errors, "equipment.module.power_w", m.power_w, "Module power must be positive");
    require_positive(&mut errors, "equipment.module.vmp_v", m.vmp_v, "Vmp must be positive");
    require_positive(&mut errors, "equipment.module.voc_v", m.voc_v, "Voc must be positive");
    require_positive(&mut errors, "equipment.module.imp_a", m.imp_a, "Imp must be positive");
    require_positive(&mut errors, "equipment.module.isc_a", m.isc_a, "Isc must be positive");
    require_positive(&mut errors, "equipment.module.area_m2", m.area_m2, "Module area must be positive");
    if m.vmp_v > 0.0 && m.voc_v > 0.0 && m.voc_v < m.vmp_v {
        errors.push(
            CalcError::invalid_input("equipment.module.voc_v", m.voc_v.to_string(), "Voc must not be below Vmp")
                .to_string(),
        );
    }

    require_text(&mut errors, "equipment.inverter.brand", &inv.brand);
    require_text(&mut errors, "equipment.inverter.model", &inv.model);
    require_positive(
        &mut errors,
        "equipment.inverter.nominal_power_w",
        inv.nominal_power_w,
        "Inverter nominal power must be positive",
    );
    require_positive(&mut errors, "equipment.inverter.mppt_min_v", inv.mppt_min_v, "MPPT minimum must be positive");
    if !(inv.mppt_max_v > inv.mppt_min_v) {
        errors.push(
            CalcError::invalid_input(
                "equipment.inverter.mppt_max_v",
                inv.mppt_max_v.to_string(),
                format!("MPPT maximum must be greater than the minimum ({})", inv.mppt_min_v),
            )
            .to_string(),
        );
    }
    require_positive(
        &mut errors,
        "equipment.inverter.max_input_voltage_v",
        inv.max_input_voltage_v,
        "Maximum input voltage must be positive",
    );
    require_positive(
        &mut errors,
        "equipment.inverter.max_input_current_a",
        inv.max_input_current_a,
        "Maximum input current must be positive",
    );
    if inv.mppt_channels == 0 {
        errors.push(
            CalcError::invalid_input("equipment.inverter.mppt_channels", "0", "At least one MPPT input is required")
                .to_string(),
        );
    }

    require_fraction(&mut errors, "equipment.system_efficiency", equipment.system_efficiency);
    require_fraction(&mut errors, "equipment.loss_factor", equipment.loss_factor);

    errors
}

/// Validate caller-supplied financial parameters.
pub fn validate_financial(params: &FinancialParams) -> Vec<String> {
    let mut errors = Vec::new();

    require_positive(&mut errors, "financial.tariff_brl_per_kwh", params.tariff_brl_per_kwh, "Tariff must be positive");
    require_positive(&mut errors, "financial.cost_per_wp", params.cost_per_wp, "Cost per Wp must be positive");
    require_range(
        &mut errors,
        "financial.discount_rate_pct",
        params.discount_rate_pct,
        0.0,
        100.0,
        "Discount rate must be within 0-100%",
    );
    require_range(
        &mut errors,
        "financial.energy_inflation_pct",
        params.energy_inflation_pct,
        -50.0,
        100.0,
        "Energy inflation must be within -50% to 100%",
    );
    require_range(
        &mut errors,
        "financial.general_inflation_pct",
        params.general_inflation_pct,
        -50.0,
        100.0,
        "General inflation must be within -50% to 100%",
    );
    require_range(
        &mut errors,
        "financial.maintenance_pct",
        params.maintenance_pct,
        0.0,
        100.0,
        "Maintenance cost must be within 0-100% of the investment",
    );
    if !(1..=50).contains(&params.useful_life_years) {
        errors.push(
            CalcError::invalid_input(
                "financial.useful_life_years",
                params.useful_life_years.to_string(),
                "Useful life must be within 1-50 years",
            )
            .to_string(),
        );
    }

    errors
}

/// Run every validator and concatenate the messages in record order.
pub fn validate_all(input: &ProjectInput) -> Vec<String> {
    let mut errors = validate_site(&input.site);
    errors.extend(validate_customer(&input.customer));
    errors.extend(validate_equipment(&input.equipment));
    errors.extend(validate_financial(&input.financial));
    if let Some(cap) = input.optimization.max_power_kwp {
        require_positive(&mut errors, "optimization.max_power_kwp", cap, "Power ceiling must be positive");
    }
    errors
}

/// A complete record that passes [`validate_all`], for tests and demos.
pub fn sample_input() -> ProjectInput {
    ProjectInput::sample()
}
