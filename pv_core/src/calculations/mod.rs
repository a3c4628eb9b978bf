//! # Sizing Calculations
//!
//! The stages of a PV sizing run. Each stage follows the same pattern:
//!
//! - `*Result` / `*Report` - Stage output (JSON-serializable)
//! - a calculation function returning `CalcResult<_>` for numeric faults
//! - `validate(&result) -> Diagnostics` - errors and advisory warnings
//!
//! ## Available Calculations
//!
//! - [`generation`] - Energy yield for a module count, de-rating, seasonality
//! - [`objective`] - Module count from the customer's objective
//! - [`compatibility`] - Inverter ratio, string sizing and area checks
//! - [`financial`] - Savings, payback, NPV/IRR, projection, sensitivity

pub mod compatibility;
pub mod financial;
pub mod generation;
pub mod objective;

// Re-export commonly used types
pub use compatibility::{AreaCheck, CompatibilityReport, InverterCheck, RatioStatus, StringCheck};
pub use financial::{
    CashFlowYear,
    FinancialParams,
    FinancialProjection,
    FinancialResult,
    ScenarioKind,
    SensitivityScenario,
};
pub use generation::{DeratedGeneration, GenerationResult};
pub use objective::{Alternative, AlternativeKind, ObjectiveResult};
