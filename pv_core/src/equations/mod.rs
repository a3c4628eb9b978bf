//! # Engineering and Financial Equations
//!
//! The closed-form formulas used by the calculation stages, kept in one
//! place so each can be checked against its reference independently of the
//! pipeline that composes them.
//!
//! ## Modules
//!
//! - [`generation`] - PV yield per module/array and inverse sizing mappings
//! - [`finance`] - Present value, NPV and the bounded IRR root finder
//!
//! ## Conventions
//!
//! - Power in W or kWp, energy in kWh, currency in R$
//! - Rates inside this module are fractions; percentages are converted by
//!   the callers in [`crate::calculations`]

pub mod finance;
pub mod generation;

pub use generation::{
    annual_from_monthly,
    array_energy_month,
    compensation_pct,
    energy_per_module_month,
    installed_power_kwp,
    max_modules_for_power,
    modules_for_energy,
    modules_for_power,
    DAYS_PER_MONTH,
    MONTHS_PER_YEAR,
};

pub use finance::{
    grown,
    irr,
    newton_raphson,
    npv,
    npv_derivative,
    present_value,
    RootEstimate,
    IRR_INITIAL_GUESS,
    IRR_MAX_ITERATIONS,
    IRR_TOLERANCE,
};
