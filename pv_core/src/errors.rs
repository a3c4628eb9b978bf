//! # Error Types
//!
//! Structured error types for pv_core, plus the [`Diagnostics`] accumulator
//! that carries human-readable messages through the sizing pipeline.
//!
//! Two classes of message exist:
//!
//! - **Errors** - a field or computed figure violates a hard constraint.
//!   Input validation errors short-circuit the pipeline.
//! - **Warnings** - a computed-but-suspect condition (oversized array,
//!   clipping, long payback). Collected, never fatal.
//!
//! ## Example
//!
//! ```rust
//! use pv_core::errors::{CalcError, CalcResult};
//!
//! fn validate_tariff(tariff: f64) -> CalcResult<()> {
//!     if tariff <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "tariff_brl_per_kwh".to_string(),
//!             value: tariff.to_string(),
//!             reason: "Tariff must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pv_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing or blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A calculation stage produced an unusable figure
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError { reason: e.to_string() }
    }
}

/// Reject NaN/infinite intermediate figures before they reach a report.
pub(crate) fn ensure_finite(calculation_type: &str, name: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::calculation_failed(
            calculation_type,
            format!("{} is not a finite number ({})", name, value),
        ))
    }
}

/// Error and warning messages accumulated across pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Hard failures; any entry makes a result invalid
    pub errors: Vec<String>,
    /// Advisory cautions; the result stays valid
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append another set of diagnostics, keeping order
    pub fn merge(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A computed value together with the diagnostics raised while producing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checked<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Checked<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Checked { value, diagnostics }
    }

    /// Move the diagnostics into `sink` and return the bare value
    pub fn drain_into(self, sink: &mut Diagnostics) -> T {
        sink.merge(self.diagnostics);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("tilt_deg", "95", "Tilt must be within 0-90 degrees");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("InvalidInput"));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::calculation_failed("financial", "zero savings").error_code(),
            "CALCULATION_FAILED"
        );
    }

    #[test]
    fn test_file_error() {
        let error = CalcError::file_error("read", "project.json", "No such file or directory");
        assert_eq!(error.error_code(), "FILE_ERROR");
        assert_eq!(
            error.to_string(),
            "File error: read on 'project.json' - No such file or directory"
        );
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("generation", "energy", 12.5).unwrap(), 12.5);
        assert!(ensure_finite("generation", "energy", f64::NAN).is_err());
        assert!(ensure_finite("generation", "energy", f64::INFINITY).is_err());
    }

    #[test]
    fn test_diagnostics_merge_keeps_order() {
        let mut first = Diagnostics::new();
        first.error("a");
        first.warn("w1");

        let mut second = Diagnostics::new();
        second.error("b");
        second.warn("w2");

        first.merge(second);
        assert_eq!(first.errors, vec!["a", "b"]);
        assert_eq!(first.warnings, vec!["w1", "w2"]);
        assert!(first.has_errors());
    }

    #[test]
    fn test_checked_drain() {
        let mut diags = Diagnostics::new();
        diags.warn("oversized");
        let checked = Checked::new(42_u32, diags);

        let mut sink = Diagnostics::new();
        let value = checked.drain_into(&mut sink);
        assert_eq!(value, 42);
        assert_eq!(sink.warnings, vec!["oversized"]);
        assert!(!sink.has_errors());
    }
}
