//! # Sizing Pipeline
//!
//! Runs the stages in a fixed order:
//!
//! ```text
//! validate → resolve objective → generation → compatibility → financial → report
//! ```
//!
//! Input validation errors stop the run before any calculation. Later stages
//! add warnings (and financial errors) without stopping it. A numeric fault
//! or panic inside a stage becomes one generic error message; nothing is
//! propagated to the caller except through [`CalculationResult`].
//!
//! ## Example
//!
//! ```rust
//! use pv_core::input::ProjectInput;
//! use pv_core::pipeline::calculate;
//!
//! let result = calculate(&ProjectInput::sample());
//! assert!(result.valid);
//! assert!(result.report.is_some());
//! ```

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::calculations::{compatibility, financial, generation, objective};
use crate::derating::SIGNIFICANT_DERATING;
use crate::errors::{CalcResult, Diagnostics};
use crate::input::ProjectInput;
use crate::report::{self, ReportParts, TechnicalCommercialReport};
use crate::validation;

/// Prefix of the message reported for a fault inside a stage
pub const UNEXPECTED_FAILURE: &str = "Unexpected calculation failure";

/// Outcome of a sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// `errors.is_empty()` after every stage that ran
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Absent when input validation failed or a stage faulted
    pub report: Option<TechnicalCommercialReport>,
}

impl CalculationResult {
    fn rejected(errors: Vec<String>) -> Self {
        CalculationResult {
            valid: false,
            errors,
            warnings: Vec::new(),
            report: None,
        }
    }

    fn completed(diags: Diagnostics, report: TechnicalCommercialReport) -> Self {
        CalculationResult {
            valid: !diags.has_errors(),
            errors: diags.errors,
            warnings: diags.warnings,
            report: Some(report),
        }
    }
}

/// Run the full pipeline on a project.
pub fn calculate(input: &ProjectInput) -> CalculationResult {
    let _span = debug_span!("calculate", objective = input.customer.objective.code()).entered();

    let errors = validation::validate_all(input);
    if !errors.is_empty() {
        debug!(count = errors.len(), "input rejected");
        return CalculationResult::rejected(errors);
    }

    match guarded(|| run_stages(input)) {
        Ok((report, diags)) => {
            debug!(
                errors = diags.errors.len(),
                warnings = diags.warnings.len(),
                modules = report.technical.module_count,
                "pipeline complete"
            );
            CalculationResult::completed(diags, report)
        }
        Err(message) => CalculationResult::rejected(vec![message]),
    }
}

/// Run a stage, turning an error or panic into the generic failure message.
fn guarded<T>(stage: impl FnOnce() -> CalcResult<T>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(stage)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(code = e.error_code(), error = %e, "stage failed");
            Err(format!("{}: {}", UNEXPECTED_FAILURE, e))
        }
        Err(_) => {
            warn!("stage panicked");
            Err(format!("{}: internal fault", UNEXPECTED_FAILURE))
        }
    }
}

/// Parse a JSON project, run it and serialize the result.
pub fn calculate_json(input: &str) -> CalcResult<String> {
    let input: ProjectInput = serde_json::from_str(input)?;
    Ok(serde_json::to_string(&calculate(&input))?)
}

fn run_stages(input: &ProjectInput) -> CalcResult<(TechnicalCommercialReport, Diagnostics)> {
    let site = &input.site;
    let customer = &input.customer;
    let equipment = &input.equipment;
    let params = &input.financial;
    let mut diags = Diagnostics::new();

    for w in validation::site_warnings(site) {
        diags.warn(w);
    }

    // Objective
    let mut resolved = objective::resolve(customer, site, equipment)?;
    if !input.optimization.is_noop() {
        resolved = objective::optimize(&resolved, &input.optimization, customer, site, equipment)?;
    }
    diags.merge(objective::validate(&resolved));
    let alternatives = objective::alternatives(customer, site, equipment)?;

    // Generation
    let energy = generation::for_site(resolved.module_count, site, equipment)?;
    diags.merge(generation::validate(&energy));
    let derated = generation::derate(&energy, site);
    if derated.factors.combined < SIGNIFICANT_DERATING {
        diags.warn(format!(
            "Generation: orientation and site losses reduce the yield by {:.1}% (about {:.0} kWh/month expected)",
            derated.factors.loss_pct(),
            derated.energy_month_kwh
        ));
    }
    let monthly_profile_kwh = generation::seasonal_for_site(energy.energy_year_kwh, site);

    // Compatibility
    let compat = compatibility::check_all(resolved.module_count, site, equipment);
    for w in compat.warnings() {
        diags.warn(w);
    }
    let suggestions = compatibility::suggestions(&compat, site, equipment);

    // Financial
    let fin = financial::analyze(&resolved, params)?;
    diags.merge(financial::validate(&fin));
    let projection = financial::project(&fin, params)?.drain_into(&mut diags);
    let sensitivity = financial::sensitivity(&fin, params)?.drain_into(&mut diags);

    let report = report::synthesize(ReportParts {
        customer,
        site,
        equipment,
        objective: resolved,
        generation: energy,
        derated,
        monthly_profile_kwh,
        compatibility: compat,
        suggestions,
        financial: fin,
        projection,
        sensitivity,
        alternatives,
    });
    Ok((report, diags))
}
