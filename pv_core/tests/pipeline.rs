//! End-to-end checks of the sizing pipeline through the public API.

use pv_core::calculations::compatibility::{check_inverter, check_strings, RatioStatus};
use pv_core::calculations::financial::{self, FinancialResult};
use pv_core::calculations::objective;
use pv_core::equations;
use pv_core::input::{InstallationSurface, InverterSpec, ModuleSpec};
use pv_core::{calculate, CustomerData, EquipmentSpec, Objective, ProjectInput, SiteData};

fn project(irradiance: f64, objective: Objective) -> ProjectInput {
    let mut input = ProjectInput::sample();
    input.site = input.site.with_irradiance(irradiance);
    input.customer.objective = objective;
    input
}

#[test]
fn annual_is_twelve_times_monthly() {
    let objectives = [
        Objective::ZeroBill,
        Objective::GenerateKwh { monthly_kwh: 777.0 },
        Objective::SetPower { kwp: 3.3 },
        Objective::UseModuleCount { modules: 17 },
    ];
    for irradiance in [3.1, 4.5, 5.25, 6.9] {
        for objective in objectives {
            let result = calculate(&project(irradiance, objective));
            let report = result.report.expect("report");
            assert_eq!(
                report.energy.annual_generation_kwh,
                report.energy.monthly_generation_kwh * 12.0
            );
        }
    }
}

#[test]
fn scenario_a_zero_bill() {
    let result = calculate(&project(4.5, Objective::ZeroBill));
    assert!(result.valid, "{:?}", result.errors);

    let report = result.report.unwrap();
    assert_eq!(report.technical.module_count, 11);
    assert!((report.energy.monthly_generation_kwh - 522.72).abs() < 0.01);
    assert!((report.energy.compensation_pct - 104.54).abs() < 0.01);
}

#[test]
fn module_count_is_the_ceiling() {
    let site = SiteData::sample().with_irradiance(5.1);
    let equipment = EquipmentSpec::sample();
    for target in [50.0, 480.0, 1234.5, 9_000.0] {
        let customer = CustomerData {
            objective: Objective::GenerateKwh { monthly_kwh: target },
            ..CustomerData::sample()
        };
        let resolved = objective::resolve(&customer, &site, &equipment).unwrap();
        assert!(resolved.monthly_generation_kwh >= target);
        if resolved.module_count > 1 {
            let per_module = resolved.monthly_generation_kwh / f64::from(resolved.module_count);
            assert!(per_module * f64::from(resolved.module_count - 1) < target);
        }
    }

    for kwp in [0.4, 2.0, 7.77, 75.0] {
        let customer = CustomerData {
            objective: Objective::SetPower { kwp },
            ..CustomerData::sample()
        };
        let resolved = objective::resolve(&customer, &site, &equipment).unwrap();
        assert!(resolved.installed_power_kwp >= kwp - 1e-9);
        let one_less = f64::from(resolved.module_count - 1) * equipment.module.power_w / 1000.0;
        assert!(one_less < kwp);
    }
}

#[test]
fn set_power_and_module_count_agree() {
    let module_kwp = ModuleSpec::sample().power_w / 1000.0;
    for n in [1_u32, 6, 11, 24, 90] {
        let by_count = calculate(&project(4.8, Objective::UseModuleCount { modules: n }));
        let by_power = calculate(&project(4.8, Objective::SetPower { kwp: f64::from(n) * module_kwp }));
        let a = by_count.report.unwrap();
        let b = by_power.report.unwrap();
        assert_eq!(a.technical.module_count, n);
        assert_eq!(b.technical.module_count, n);
        assert_eq!(a.energy, b.energy);
    }
}

#[test]
fn identical_input_gives_identical_output() {
    let input = project(4.5, Objective::ZeroBill);
    let first = serde_json::to_string(&calculate(&input)).unwrap();
    let second = serde_json::to_string(&calculate(&input)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn irr_terminates_for_positive_savings() {
    for (investment, savings) in [(1_000.0, 1.0), (50_000.0, 10_000.0), (10_000.0, 90_000.0), (1e7, 3.0)] {
        let est = equations::irr(
            investment,
            25,
            |_| savings,
            equations::IRR_INITIAL_GUESS,
            equations::IRR_TOLERANCE,
            equations::IRR_MAX_ITERATIONS,
        );
        assert!(est.iterations <= equations::IRR_MAX_ITERATIONS);
        assert!(est.value.is_finite());
    }
}

#[test]
fn scenario_b_string_sizing() {
    let check = check_strings(16, &ModuleSpec::sample(), &InverterSpec::sample());
    assert_eq!(check.modules_per_string, 8);
    assert!((check.string_voltage_v - 333.6).abs() < 1e-9);
    assert!(check.compatible);
}

#[test]
fn scenario_c_simple_payback() {
    let result = FinancialResult {
        annual_generation_kwh: 40_000.0 / 3.0,
        monthly_savings: 10_000.0 / 12.0,
        annual_savings: 10_000.0,
        simple_payback_years: financial::simple_payback(50_000.0, 10_000.0),
        co2_avoided_t_per_year: 0.7333,
        total_investment: 50_000.0,
        cost_per_wp: 3.5,
    };
    assert_eq!(result.simple_payback_years, 5.0);
    assert!(financial::validate(&result).errors.is_empty());
}

#[test]
fn scenario_d_inverter_ratio() {
    // 12 × 550 W = 6 600 W on a 6 000 W inverter
    let check = check_inverter(12, &ModuleSpec::sample(), &InverterSpec::sample());
    assert!((check.power_ratio - 1.10).abs() < 1e-9);
    assert!(check.compatible);
    assert_eq!(check.status, RatioStatus::Adequate);
    assert!(check.notes.iter().all(|n| !n.contains("clipping")));
}

#[test]
fn input_errors_stop_the_pipeline() {
    let mut input = ProjectInput::sample();
    input.equipment.inverter.mppt_max_v = input.equipment.inverter.mppt_min_v;
    input.equipment.system_efficiency = 1.4;

    let result = calculate(&input);
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.report.is_none());
}

#[test]
fn result_round_trips_through_json() {
    let mut input = project(5.6, Objective::GenerateKwh { monthly_kwh: 1500.0 });
    input.site.surface = InstallationSurface::Ground;
    input.site.usable_area_m2 = None;

    let result = calculate(&input);
    let json = serde_json::to_string(&result).unwrap();
    let parsed: pv_core::CalculationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.valid, result.valid);
    assert_eq!(
        parsed.report.as_ref().map(|r| r.technical.module_count),
        result.report.as_ref().map(|r| r.technical.module_count)
    );
}
