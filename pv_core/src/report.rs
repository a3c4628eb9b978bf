//! # Technical-Commercial Report
//!
//! Assembles the outputs of every stage into one [`TechnicalCommercialReport`]
//! and renders observation and recommendation text from them. Every figure in
//! the report was computed by an earlier stage; this module only selects and
//! formats.

use serde::{Deserialize, Serialize};

use crate::calculations::compatibility::CompatibilityReport;
use crate::calculations::financial::{FinancialProjection, FinancialResult, SensitivityScenario};
use crate::calculations::generation::{DeratedGeneration, GenerationResult};
use crate::calculations::objective::{Alternative, ObjectiveResult};
use crate::input::{CustomerData, EquipmentSpec, SiteData};

/// Payback at or below which an investment is rated excellent (years)
pub const EXCELLENT_PAYBACK_YEARS: f64 = 5.0;

/// Payback at or below which an investment is rated good (years)
pub const GOOD_PAYBACK_YEARS: f64 = 8.0;

/// Compensation band considered well sized (%)
pub const WELL_SIZED_COMPENSATION_PCT: (f64, f64) = (90.0, 110.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaybackRating {
    Excellent,
    Good,
    Elevated,
}

impl PaybackRating {
    pub fn from_years(years: f64) -> Self {
        if years <= EXCELLENT_PAYBACK_YEARS {
            PaybackRating::Excellent
        } else if years <= GOOD_PAYBACK_YEARS {
            PaybackRating::Good
        } else {
            PaybackRating::Elevated
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingRating {
    /// Generation falls short of consumption
    Partial,
    WellSized,
    Surplus,
}

impl SizingRating {
    pub fn from_compensation(pct: f64) -> Self {
        let (low, high) = WELL_SIZED_COMPENSATION_PCT;
        if pct < low {
            SizingRating::Partial
        } else if pct <= high {
            SizingRating::WellSized
        } else {
            SizingRating::Surplus
        }
    }
}

/// Hardware and layout at a glance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub module_count: u32,
    pub installed_power_kwp: f64,
    pub module: String,
    pub inverter: String,
    pub modules_per_string: u32,
    pub string_count: u32,
    pub power_ratio: f64,
    pub occupied_area_m2: f64,
}

/// Expected generation, with the seasonal and de-rated views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyProjection {
    pub monthly_generation_kwh: f64,
    pub annual_generation_kwh: f64,
    pub compensation_pct: f64,
    /// January first
    pub monthly_profile_kwh: [f64; 12],
    pub derated: DeratedGeneration,
}

/// The full result of a sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalCommercialReport {
    pub customer: CustomerData,
    pub site: SiteData,
    pub technical: TechnicalSummary,
    pub energy: EnergyProjection,
    pub financial: FinancialResult,
    pub payback_rating: PaybackRating,
    pub sizing_rating: SizingRating,
    pub projection: FinancialProjection,
    pub sensitivity: Vec<SensitivityScenario>,
    pub alternatives: Vec<Alternative>,
    pub compatibility: CompatibilityReport,
    pub suggestions: Vec<String>,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Stage outputs the report is built from
#[derive(Debug, Clone)]
pub struct ReportParts<'a> {
    pub customer: &'a CustomerData,
    pub site: &'a SiteData,
    pub equipment: &'a EquipmentSpec,
    pub objective: ObjectiveResult,
    pub generation: GenerationResult,
    pub derated: DeratedGeneration,
    pub monthly_profile_kwh: [f64; 12],
    pub compatibility: CompatibilityReport,
    pub suggestions: Vec<String>,
    pub financial: FinancialResult,
    pub projection: FinancialProjection,
    pub sensitivity: Vec<SensitivityScenario>,
    pub alternatives: Vec<Alternative>,
}

/// Build the report.
pub fn synthesize(parts: ReportParts<'_>) -> TechnicalCommercialReport {
    let technical = TechnicalSummary {
        module_count: parts.generation.module_count,
        installed_power_kwp: parts.generation.installed_power_kwp,
        module: parts.equipment.module.label(),
        inverter: parts.equipment.inverter.label(),
        modules_per_string: parts.compatibility.strings.modules_per_string,
        string_count: parts.compatibility.strings.string_count,
        power_ratio: parts.compatibility.inverter.power_ratio,
        occupied_area_m2: parts.compatibility.area.occupied_area_m2,
    };
    let energy = EnergyProjection {
        monthly_generation_kwh: parts.generation.energy_month_kwh,
        annual_generation_kwh: parts.generation.energy_year_kwh,
        compensation_pct: parts.objective.compensation_pct,
        monthly_profile_kwh: parts.monthly_profile_kwh,
        derated: parts.derated,
    };
    let payback_rating = PaybackRating::from_years(parts.financial.simple_payback_years);
    let sizing_rating = SizingRating::from_compensation(parts.objective.compensation_pct);

    let observations = observations(&technical, &energy, &parts.compatibility);
    let recommendations = recommendations(
        payback_rating,
        sizing_rating,
        &parts.financial,
        &energy,
        &parts.compatibility,
    );

    TechnicalCommercialReport {
        customer: parts.customer.clone(),
        site: parts.site.clone(),
        technical,
        energy,
        financial: parts.financial,
        payback_rating,
        sizing_rating,
        projection: parts.projection,
        sensitivity: parts.sensitivity,
        alternatives: parts.alternatives,
        compatibility: parts.compatibility,
        suggestions: parts.suggestions,
        observations,
        recommendations,
    }
}

fn observations(technical: &TechnicalSummary, energy: &EnergyProjection, compat: &CompatibilityReport) -> Vec<String> {
    let mut out = vec![
        format!(
            "System of {} modules ({:.2} kWp) generating about {:.0} kWh/month",
            technical.module_count, technical.installed_power_kwp, energy.monthly_generation_kwh
        ),
        format!("Modules: {}; inverter: {}", technical.module, technical.inverter),
    ];
    if technical.modules_per_string > 0 {
        out.push(format!(
            "Layout: {} string(s) of up to {} modules, DC/AC ratio {:.2}",
            technical.string_count, technical.modules_per_string, technical.power_ratio
        ));
    }
    if energy.derated.factors.combined < 1.0 {
        out.push(format!(
            "Orientation and site losses reduce the expected yield by {:.1}% to about {:.0} kWh/month",
            energy.derated.factors.loss_pct(),
            energy.derated.energy_month_kwh
        ));
    }
    out.extend(compat.notes().cloned());
    out
}

fn recommendations(
    payback: PaybackRating,
    sizing: SizingRating,
    financial: &FinancialResult,
    energy: &EnergyProjection,
    compat: &CompatibilityReport,
) -> Vec<String> {
    let years = financial.simple_payback_years;
    let mut out = vec![match payback {
        PaybackRating::Excellent => format!("Payback of {:.1} years is excellent", years),
        PaybackRating::Good => format!("Payback of {:.1} years is good", years),
        PaybackRating::Elevated => {
            format!("Payback of {:.1} years is elevated; evaluate the project's viability", years)
        }
    }];

    let pct = energy.compensation_pct;
    out.push(match sizing {
        SizingRating::WellSized => format!("System is well sized, offsetting {:.1}% of consumption", pct),
        SizingRating::Surplus => format!(
            "System generates a surplus ({:.1}% of consumption); consider remote self-consumption credits",
            pct
        ),
        SizingRating::Partial => format!("System does not fully offset consumption ({:.1}%)", pct),
    });

    if !compat.is_compatible() {
        out.push("Technical adjustment required before installation; see the suggestions".to_string());
    }

    out.push(format!(
        "Avoids about {:.2} t of CO₂ emissions per year",
        financial.co2_avoided_t_per_year
    ));
    out
}
