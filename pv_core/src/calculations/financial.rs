//! # Financial Analysis
//!
//! Economic metrics for a resolved sizing: savings, investment, simple and
//! discounted payback, NPV, IRR, CO₂ avoided, a year-by-year projection net
//! of maintenance and a three-point sensitivity analysis.
//!
//! ## Formulas
//!
//! - Savings: S = E × tariff
//! - Investment: I = P_kWp × 1000 × cost_per_Wp
//! - Simple payback: I / S_year
//! - CO₂ avoided: E_year (MWh) × 0.055 t/MWh
//! - Savings in year t: S₁ × (1 + g_energy)^(t-1)
//! - Maintenance in year t: I × m × (1 + g_general)^(t-1)
//!
//! ## Example
//!
//! ```rust
//! use pv_core::calculations::financial::simple_payback;
//!
//! assert_eq!(simple_payback(50_000.0, 10_000.0), 5.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::objective::ObjectiveResult;
use crate::equations::finance as eq;
use crate::equations::generation::annual_from_monthly;
use crate::errors::{ensure_finite, CalcResult, Checked, Diagnostics};
use crate::units::{KilowattHours, KilowattPeak, MegawattHours, Watts};

/// Brazilian grid emission factor (t CO₂ per MWh)
pub const CO2_T_PER_MWH: f64 = 0.055;

/// Simple payback above which an investment is rejected (years)
pub const MAX_PAYBACK_YEARS: f64 = 25.0;

/// Tariff/generation multipliers for the sensitivity scenarios
pub const SENSITIVITY_FACTORS: [(ScenarioKind, f64); 3] = [
    (ScenarioKind::Pessimistic, 0.8),
    (ScenarioKind::Base, 1.0),
    (ScenarioKind::Optimistic, 1.2),
];

// ============================================================================
// Parameters
// ============================================================================

/// Economic assumptions. Rates are percentages; missing JSON fields take
/// the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialParams {
    /// Energy tariff (R$/kWh)
    pub tariff_brl_per_kwh: f64,
    /// Installed cost (R$/Wp)
    pub cost_per_wp: f64,
    /// Discount rate (%/year)
    pub discount_rate_pct: f64,
    /// Energy price inflation (%/year)
    pub energy_inflation_pct: f64,
    /// Analysis horizon (years)
    pub useful_life_years: u32,
    /// Annual maintenance as a share of the investment (%)
    pub maintenance_pct: f64,
    /// General inflation applied to maintenance (%/year)
    pub general_inflation_pct: f64,
}

impl Default for FinancialParams {
    fn default() -> Self {
        FinancialParams {
            tariff_brl_per_kwh: 0.75,
            cost_per_wp: 3.50,
            discount_rate_pct: 8.0,
            energy_inflation_pct: 5.0,
            useful_life_years: 25,
            maintenance_pct: 0.5,
            general_inflation_pct: 3.0,
        }
    }
}

impl FinancialParams {
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate_pct / 100.0
    }

    pub fn energy_inflation(&self) -> f64 {
        self.energy_inflation_pct / 100.0
    }

    pub fn general_inflation(&self) -> f64 {
        self.general_inflation_pct / 100.0
    }

    /// First-year maintenance cost for an investment (R$)
    pub fn maintenance_for(&self, investment: f64) -> f64 {
        investment * self.maintenance_pct / 100.0
    }
}

// ============================================================================
// Base analysis
// ============================================================================

/// Headline economic figures for a sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialResult {
    pub annual_generation_kwh: f64,
    /// First-year monthly savings (R$)
    pub monthly_savings: f64,
    /// First-year annual savings (R$)
    pub annual_savings: f64,
    pub simple_payback_years: f64,
    pub co2_avoided_t_per_year: f64,
    /// Total installed cost (R$)
    pub total_investment: f64,
    /// Cost per Wp used for the investment (R$)
    pub cost_per_wp: f64,
}

/// Years for constant savings to repay the investment
#[inline]
pub fn simple_payback(investment: f64, annual_savings: f64) -> f64 {
    investment / annual_savings
}

/// Tonnes of CO₂ avoided by a year's generation
pub fn co2_avoided_t(annual_generation: KilowattHours) -> f64 {
    MegawattHours::from(annual_generation).value() * CO2_T_PER_MWH
}

/// Installed cost of an array (R$)
pub fn investment_for(power: KilowattPeak, cost_per_wp: f64) -> f64 {
    Watts::from(power).value() * cost_per_wp
}

/// Compute the headline economics of a resolved sizing.
///
/// A payback that is not a finite number (zero savings that slipped past
/// validation) is reported as a calculation failure.
pub fn analyze(objective: &ObjectiveResult, params: &FinancialParams) -> CalcResult<FinancialResult> {
    let annual_generation_kwh = annual_from_monthly(objective.monthly_generation_kwh);
    let monthly_savings = objective.monthly_generation_kwh * params.tariff_brl_per_kwh;
    let annual_savings = annual_generation_kwh * params.tariff_brl_per_kwh;
    let total_investment = investment_for(KilowattPeak(objective.installed_power_kwp), params.cost_per_wp);
    let simple_payback_years = ensure_finite(
        "financial",
        "simple payback",
        simple_payback(total_investment, annual_savings),
    )?;

    let result = FinancialResult {
        annual_generation_kwh,
        monthly_savings,
        annual_savings,
        simple_payback_years,
        co2_avoided_t_per_year: co2_avoided_t(KilowattHours(annual_generation_kwh)),
        total_investment,
        cost_per_wp: params.cost_per_wp,
    };

    debug!(
        investment = result.total_investment,
        annual_savings = result.annual_savings,
        payback = result.simple_payback_years,
        "financial analysis complete"
    );
    Ok(result)
}

// ============================================================================
// Discounted metrics
// ============================================================================

/// Years until the discounted, inflating savings repay the investment.
///
/// Interpolates within the year the cumulative present value crosses the
/// investment. Returns the full useful life when it never does.
pub fn discounted_payback(investment: f64, first_year_savings: f64, params: &FinancialParams) -> f64 {
    payback_from(investment, params.useful_life_years, |t| {
        eq::present_value(
            eq::grown(first_year_savings, params.energy_inflation(), t),
            params.discount_rate(),
            t,
        )
    })
}

/// Year-by-year accumulation shared by every payback figure.
fn payback_from<F>(investment: f64, years: u32, inflow: F) -> f64
where
    F: Fn(u32) -> f64,
{
    let mut cumulative = 0.0;
    for year in 1..=years {
        let flow = inflow(year);
        if flow > 0.0 && cumulative + flow >= investment {
            let fraction = ((investment - cumulative) / flow).clamp(0.0, 1.0);
            return f64::from(year - 1) + fraction;
        }
        cumulative += flow;
    }
    f64::from(years)
}

/// NPV of the inflating savings at the configured discount rate (R$).
pub fn npv(investment: f64, first_year_savings: f64, params: &FinancialParams) -> f64 {
    eq::npv(params.discount_rate(), investment, params.useful_life_years, |t| {
        eq::grown(first_year_savings, params.energy_inflation(), t)
    })
}

/// IRR of the inflating savings, as a fraction.
pub fn irr(investment: f64, first_year_savings: f64, params: &FinancialParams) -> eq::RootEstimate {
    eq::irr(
        investment,
        params.useful_life_years,
        |t| eq::grown(first_year_savings, params.energy_inflation(), t),
        eq::IRR_INITIAL_GUESS,
        eq::IRR_TOLERANCE,
        eq::IRR_MAX_ITERATIONS,
    )
}

/// Savings minus maintenance in `year` (R$)
fn net_cash_flow(investment: f64, first_year_savings: f64, params: &FinancialParams, year: u32) -> f64 {
    eq::grown(first_year_savings, params.energy_inflation(), year)
        - eq::grown(params.maintenance_for(investment), params.general_inflation(), year)
}

/// Net-of-maintenance IRR
fn net_irr(investment: f64, first_year_savings: f64, params: &FinancialParams) -> eq::RootEstimate {
    eq::irr(
        investment,
        params.useful_life_years,
        |t| net_cash_flow(investment, first_year_savings, params, t),
        eq::IRR_INITIAL_GUESS,
        eq::IRR_TOLERANCE,
        eq::IRR_MAX_ITERATIONS,
    )
}

/// Net-of-maintenance NPV
fn net_npv(investment: f64, first_year_savings: f64, params: &FinancialParams) -> f64 {
    eq::npv(params.discount_rate(), investment, params.useful_life_years, |t| {
        net_cash_flow(investment, first_year_savings, params, t)
    })
}

fn irr_warning(label: &str, estimate: &eq::RootEstimate) -> String {
    format!(
        "Financial: {} IRR did not converge after {} iterations; last estimate {:.2}%",
        label,
        estimate.iterations,
        estimate.value * 100.0
    )
}

// ============================================================================
// Projection
// ============================================================================

/// One row of the cash-flow table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: u32,
    pub savings: f64,
    pub maintenance: f64,
    pub net_cash_flow: f64,
    /// Cumulative net cash flow including the investment
    pub cumulative: f64,
    pub discounted_net: f64,
    /// Cumulative discounted net cash flow including the investment
    pub discounted_cumulative: f64,
}

/// Lifetime projection net of maintenance, with the gross (savings-only)
/// figures alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub investment: f64,
    pub total_savings: f64,
    pub total_maintenance: f64,
    pub payback_years: f64,
    pub discounted_payback_years: f64,
    pub npv: f64,
    pub irr: eq::RootEstimate,
    /// Discounted payback on savings alone, before maintenance
    pub gross_discounted_payback_years: f64,
    /// NPV on savings alone, before maintenance
    pub gross_npv: f64,
    /// IRR on savings alone, before maintenance
    pub gross_irr: eq::RootEstimate,
    pub cash_flows: Vec<CashFlowYear>,
}

/// Build the year-by-year projection for a base analysis.
///
/// A non-converging IRR is reported as a warning alongside its last estimate.
pub fn project(result: &FinancialResult, params: &FinancialParams) -> CalcResult<Checked<FinancialProjection>> {
    let investment = result.total_investment;
    let savings = result.annual_savings;
    let mut diags = Diagnostics::new();

    let mut cumulative = -investment;
    let mut discounted_cumulative = -investment;
    let mut cash_flows = Vec::with_capacity(params.useful_life_years as usize);
    for year in 1..=params.useful_life_years {
        let year_savings = eq::grown(savings, params.energy_inflation(), year);
        let maintenance = eq::grown(params.maintenance_for(investment), params.general_inflation(), year);
        let net = year_savings - maintenance;
        let discounted_net = eq::present_value(net, params.discount_rate(), year);
        cumulative += net;
        discounted_cumulative += discounted_net;
        cash_flows.push(CashFlowYear {
            year,
            savings: year_savings,
            maintenance,
            net_cash_flow: net,
            cumulative,
            discounted_net,
            discounted_cumulative,
        });
    }

    let projected_irr = net_irr(investment, savings, params);
    if !projected_irr.converged {
        warn!(iterations = projected_irr.iterations, estimate = projected_irr.value, "projection IRR did not converge");
        diags.warn(irr_warning("projected", &projected_irr));
    }
    let gross_irr = irr(investment, savings, params);
    if !gross_irr.converged {
        diags.warn(irr_warning("gross", &gross_irr));
    }

    let projection = FinancialProjection {
        investment,
        total_savings: cash_flows.iter().map(|row| row.savings).sum(),
        total_maintenance: cash_flows.iter().map(|row| row.maintenance).sum(),
        payback_years: payback_from(investment, params.useful_life_years, |t| {
            net_cash_flow(investment, savings, params, t)
        }),
        discounted_payback_years: payback_from(investment, params.useful_life_years, |t| {
            eq::present_value(net_cash_flow(investment, savings, params, t), params.discount_rate(), t)
        }),
        npv: ensure_finite("financial", "projected NPV", net_npv(investment, savings, params))?,
        irr: projected_irr,
        gross_discounted_payback_years: discounted_payback(investment, savings, params),
        gross_npv: ensure_finite("financial", "gross NPV", npv(investment, savings, params))?,
        gross_irr,
        cash_flows,
    };

    debug!(
        npv = projection.npv,
        irr = projection.irr.value,
        payback = projection.payback_years,
        "financial projection complete"
    );
    Ok(Checked::new(projection, diags))
}

// ============================================================================
// Sensitivity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Pessimistic,
    Base,
    Optimistic,
}

impl ScenarioKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScenarioKind::Pessimistic => "Pessimistic",
            ScenarioKind::Base => "Base",
            ScenarioKind::Optimistic => "Optimistic",
        }
    }
}

/// Economics with generation and tariff both scaled by `factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityScenario {
    pub kind: ScenarioKind,
    pub factor: f64,
    pub annual_generation_kwh: f64,
    pub tariff_brl_per_kwh: f64,
    pub annual_savings: f64,
    pub simple_payback_years: f64,
    pub npv: f64,
    pub irr: eq::RootEstimate,
}

/// Pessimistic, base and optimistic scenarios (net of maintenance).
pub fn sensitivity(result: &FinancialResult, params: &FinancialParams) -> CalcResult<Checked<Vec<SensitivityScenario>>> {
    let mut diags = Diagnostics::new();
    let mut scenarios = Vec::with_capacity(SENSITIVITY_FACTORS.len());

    for (kind, factor) in SENSITIVITY_FACTORS {
        let annual_generation_kwh = result.annual_generation_kwh * factor;
        let tariff = params.tariff_brl_per_kwh * factor;
        let annual_savings = annual_generation_kwh * tariff;
        let investment = result.total_investment;

        let irr = net_irr(investment, annual_savings, params);
        if !irr.converged {
            diags.warn(irr_warning(&kind.display_name().to_lowercase(), &irr));
        }

        scenarios.push(SensitivityScenario {
            kind,
            factor,
            annual_generation_kwh,
            tariff_brl_per_kwh: tariff,
            annual_savings,
            simple_payback_years: ensure_finite(
                "financial",
                "scenario payback",
                simple_payback(investment, annual_savings),
            )?,
            npv: net_npv(investment, annual_savings, params),
            irr,
        });
    }

    Ok(Checked::new(scenarios, diags))
}

// ============================================================================
// Validation
// ============================================================================

/// Check the headline economics.
///
/// Payback outside (0, 25] years, non-positive savings and non-positive
/// investment are all errors.
pub fn validate(result: &FinancialResult) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if !(result.simple_payback_years > 0.0) {
        diags.error(format!(
            "Financial: payback must be positive (got {:.2} years)",
            result.simple_payback_years
        ));
    } else if result.simple_payback_years > MAX_PAYBACK_YEARS {
        diags.error(format!(
            "Financial: payback of {:.1} years exceeds {:.0} years",
            result.simple_payback_years, MAX_PAYBACK_YEARS
        ));
    }
    if !(result.annual_savings > 0.0) {
        diags.error("Financial: annual savings must be positive");
    }
    if !(result.total_investment > 0.0) {
        diags.error("Financial: investment must be positive");
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Objective;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn scenario_objective() -> ObjectiveResult {
        ObjectiveResult {
            objective: Objective::ZeroBill,
            module_count: 11,
            installed_power_kwp: 6.05,
            monthly_generation_kwh: 522.72,
            compensation_pct: 104.544,
        }
    }

    fn scenario_c() -> FinancialResult {
        FinancialResult {
            // 10 000 R$ at the default tariff
            annual_generation_kwh: 40_000.0 / 3.0,
            monthly_savings: 10_000.0 / 12.0,
            annual_savings: 10_000.0,
            simple_payback_years: simple_payback(50_000.0, 10_000.0),
            co2_avoided_t_per_year: 0.7333,
            total_investment: 50_000.0,
            cost_per_wp: 3.5,
        }
    }

    #[test]
    fn test_defaults() {
        let p = FinancialParams::default();
        assert_eq!(p.tariff_brl_per_kwh, 0.75);
        assert_eq!(p.cost_per_wp, 3.50);
        assert_eq!(p.discount_rate(), 0.08);
        assert_eq!(p.energy_inflation(), 0.05);
        assert_eq!(p.useful_life_years, 25);
    }

    #[test]
    fn test_partial_json_override() {
        let p: FinancialParams = serde_json::from_str(r#"{"tariff_brl_per_kwh": 0.92}"#).unwrap();
        assert_eq!(p.tariff_brl_per_kwh, 0.92);
        assert_eq!(p.cost_per_wp, 3.50);
        assert_eq!(p.maintenance_pct, 0.5);
    }

    #[test]
    fn test_analyze_scenario() {
        let r = analyze(&scenario_objective(), &FinancialParams::default()).unwrap();
        assert!(approx_eq(r.annual_generation_kwh, 6272.64, 1e-9));
        assert!(approx_eq(r.monthly_savings, 392.04, 1e-9));
        assert!(approx_eq(r.annual_savings, 4704.48, 1e-9));
        assert!(approx_eq(r.total_investment, 21_175.0, 1e-6));
        assert!(approx_eq(r.simple_payback_years, 21_175.0 / 4704.48, 1e-9));
        // 6.27264 MWh × 0.055
        assert!(approx_eq(r.co2_avoided_t_per_year, 0.3449952, 1e-9));
        assert!(validate(&r).errors.is_empty());
    }

    #[test]
    fn test_analyze_rejects_zero_savings() {
        let params = FinancialParams {
            tariff_brl_per_kwh: 0.0,
            ..FinancialParams::default()
        };
        assert!(analyze(&scenario_objective(), &params).is_err());
    }

    #[test]
    fn test_simple_payback_scenario_c() {
        let r = scenario_c();
        assert_eq!(r.simple_payback_years, 5.0);
        assert!(validate(&r).errors.is_empty());
    }

    #[test]
    fn test_validate_flags() {
        let mut r = scenario_c();
        r.simple_payback_years = 30.0;
        assert_eq!(validate(&r).errors.len(), 1);

        r.simple_payback_years = 0.0;
        r.annual_savings = 0.0;
        r.total_investment = -1.0;
        assert_eq!(validate(&r).errors.len(), 3);
    }

    #[test]
    fn test_discounted_payback_longer_than_simple() {
        let p = FinancialParams::default();
        let years = discounted_payback(50_000.0, 10_000.0, &p);
        assert!(years > 5.0 && years < 6.0, "discounted payback = {}", years);
    }

    #[test]
    fn test_discounted_payback_without_discounting() {
        let p = FinancialParams {
            discount_rate_pct: 0.0,
            energy_inflation_pct: 0.0,
            ..FinancialParams::default()
        };
        assert!(approx_eq(discounted_payback(50_000.0, 10_000.0, &p), 5.0, 1e-12));
    }

    #[test]
    fn test_discounted_payback_never_recovered() {
        let p = FinancialParams::default();
        assert_eq!(discounted_payback(1_000_000.0, 1_000.0, &p), 25.0);
    }

    #[test]
    fn test_irr_zeroes_npv() {
        let p = FinancialParams::default();
        let est = irr(50_000.0, 10_000.0, &p);
        assert!(est.converged);
        let at_irr = FinancialParams {
            discount_rate_pct: est.value * 100.0,
            ..p.clone()
        };
        assert!(npv(50_000.0, 10_000.0, &at_irr).abs() < 50.0);
        assert!(npv(50_000.0, 10_000.0, &p) > 0.0);
    }

    #[test]
    fn test_projection_table() {
        let p = FinancialParams::default();
        let checked = project(&scenario_c(), &p).unwrap();
        assert!(checked.diagnostics.warnings.is_empty());

        let proj = checked.value;
        assert_eq!(proj.cash_flows.len(), 25);

        let first = proj.cash_flows[0];
        assert_eq!(first.savings, 10_000.0);
        assert!(approx_eq(first.maintenance, 250.0, 1e-9));
        assert!(approx_eq(first.cumulative, -50_000.0 + 9_750.0, 1e-9));

        let last = proj.cash_flows[24];
        assert!(approx_eq(last.discounted_cumulative, proj.npv, 1e-6));
        assert!(proj.payback_years > 5.0);
        assert!(proj.discounted_payback_years > proj.payback_years);
        assert!(proj.irr.converged);
        assert!(proj.irr.value > p.discount_rate());
    }

    #[test]
    fn test_projection_carries_gross_figures() {
        let p = FinancialParams::default();
        let proj = project(&scenario_c(), &p).unwrap().value;

        assert_eq!(proj.gross_discounted_payback_years, discounted_payback(50_000.0, 10_000.0, &p));
        assert!(proj.gross_discounted_payback_years > 5.0);
        // Maintenance only delays recovery
        assert!(proj.gross_discounted_payback_years < proj.discounted_payback_years);
        assert!(proj.gross_npv > proj.npv);
        assert!(proj.gross_irr.converged);
        assert!(proj.gross_irr.value > proj.irr.value);
    }

    #[test]
    fn test_sensitivity_ordering() {
        let checked = sensitivity(&scenario_c(), &FinancialParams::default()).unwrap();
        let s = checked.value;
        assert_eq!(s.len(), 3);
        assert_eq!(s[1].kind, ScenarioKind::Base);
        assert!(approx_eq(s[1].annual_savings, 10_000.0, 1e-9));
        // Both tariff and generation move: 0.8² and 1.2²
        assert!(approx_eq(s[0].annual_savings, 6_400.0, 1e-9));
        assert!(approx_eq(s[2].annual_savings, 14_400.0, 1e-9));
        assert!(s[0].simple_payback_years > s[1].simple_payback_years);
        assert!(s[0].npv < s[1].npv && s[1].npv < s[2].npv);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&scenario_c()).unwrap();
        assert!(json.contains("\"simple_payback_years\":5.0"));
    }
}
