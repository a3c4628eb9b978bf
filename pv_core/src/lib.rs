//! # pv_core - Photovoltaic Sizing Engine
//!
//! `pv_core` sizes a grid-tied photovoltaic system for a consumer unit and
//! produces a technical-commercial report: module count, expected generation,
//! inverter/string/area compatibility, and the economics of the investment.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Diagnostics, not panics**: Errors and warnings travel in the result
//! - **Deterministic**: The same input always yields the same output
//!
//! ## Quick Start
//!
//! ```rust
//! use pv_core::{calculate, ProjectInput};
//!
//! let input = ProjectInput::sample();
//! let result = calculate(&input);
//!
//! assert!(result.valid);
//! let report = result.report.unwrap();
//! println!("{} modules", report.technical.module_count);
//! ```
//!
//! ## Modules
//!
//! - [`input`] - Site, customer, equipment and project records
//! - [`validation`] - Field-level input checks
//! - [`calculations`] - Generation, objective, compatibility and financial stages
//! - [`report`] - Report assembly and recommendation text
//! - [`pipeline`] - Runs every stage and collects diagnostics
//! - [`equations`] - Closed-form yield and cash-flow formulas
//! - [`irradiance`] - Typical irradiance and seasonality per state
//! - [`derating`] - Orientation and site loss factors
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types and diagnostics

pub mod calculations;
pub mod derating;
pub mod equations;
pub mod errors;
pub mod input;
pub mod irradiance;
pub mod pipeline;
pub mod report;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculations::FinancialParams;
pub use errors::{CalcError, CalcResult, Diagnostics};
pub use input::{CustomerData, EquipmentSpec, Objective, ProjectInput, SiteData};
pub use pipeline::{calculate, calculate_json, CalculationResult};
pub use report::TechnicalCommercialReport;
