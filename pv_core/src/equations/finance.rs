//! # Discounted Cash-Flow Formulas
//!
//! Present value, net present value and a bounded Newton–Raphson root
//! finder used for the internal rate of return.
//!
//! ## Notation
//!
//! - `r` = Discount rate per year, as a fraction (0.08 = 8 %)
//! - `g` = Growth (inflation) rate per year, as a fraction
//! - `I` = Initial investment at t = 0
//! - `CF(t)` = Cash flow at the end of year t, t = 1..n
//!
//! ## Conventions
//!
//! - The investment is an outflow at t = 0; every later cash flow is
//!   discounted by (1 + r)^t.
//! - Rates below [`MIN_RATE`] are clamped so (1 + r) stays positive.

use serde::{Deserialize, Serialize};

/// Lower bound on any rate fed into the discount factor
pub const MIN_RATE: f64 = -0.99;

/// Default IRR starting guess (10 %)
pub const IRR_INITIAL_GUESS: f64 = 0.10;

/// Default IRR step tolerance
pub const IRR_TOLERANCE: f64 = 1e-4;

/// Default IRR iteration cap
pub const IRR_MAX_ITERATIONS: u32 = 100;

/// Value at t = 0 of an amount received at the end of `year`
#[inline]
pub fn present_value(amount: f64, rate: f64, year: u32) -> f64 {
    amount / (1.0 + rate.max(MIN_RATE)).powi(year as i32)
}

/// Amount in `year` of a first-year figure growing at `growth` per year
///
/// # Formula
/// A(t) = A₁ × (1 + g)^(t-1)
#[inline]
pub fn grown(first_year_amount: f64, growth: f64, year: u32) -> f64 {
    first_year_amount * (1.0 + growth).powi(year.saturating_sub(1) as i32)
}

/// Net present value of an investment followed by `years` cash flows
///
/// # Formula
/// NPV(r) = -I + Σ CF(t) / (1 + r)^t
pub fn npv<F>(rate: f64, investment: f64, years: u32, cash_flow: F) -> f64
where
    F: Fn(u32) -> f64,
{
    (1..=years).fold(-investment, |acc, t| acc + present_value(cash_flow(t), rate, t))
}

/// Derivative of [`npv`] with respect to the rate
///
/// # Formula
/// dNPV/dr = Σ -t × CF(t) / (1 + r)^(t+1)
pub fn npv_derivative<F>(rate: f64, years: u32, cash_flow: F) -> f64
where
    F: Fn(u32) -> f64,
{
    let base = 1.0 + rate.max(MIN_RATE);
    (1..=years)
        .map(|t| -f64::from(t) * cash_flow(t) / base.powi(t as i32 + 1))
        .sum()
}

/// Outcome of a bounded root search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootEstimate {
    /// Converged root, or the last iterate when not converged
    pub value: f64,
    /// Iterations performed
    pub iterations: u32,
    /// Whether the step fell below the tolerance
    pub converged: bool,
}

/// Newton–Raphson iteration on `f`, which returns (f(x), f'(x)).
///
/// Stops when a step is smaller than `tolerance` or after `max_iterations`.
/// A zero or non-finite derivative ends the search early without converging.
/// Iterates are kept at or above [`MIN_RATE`].
pub fn newton_raphson<F>(f: F, initial_guess: f64, tolerance: f64, max_iterations: u32) -> RootEstimate
where
    F: Fn(f64) -> (f64, f64),
{
    let mut x = initial_guess;
    for iteration in 1..=max_iterations {
        let (fx, dfx) = f(x);
        if !fx.is_finite() || !dfx.is_finite() || dfx == 0.0 {
            return RootEstimate {
                value: x,
                iterations: iteration,
                converged: false,
            };
        }

        let next = (x - fx / dfx).max(MIN_RATE);
        if (next - x).abs() < tolerance {
            return RootEstimate {
                value: next,
                iterations: iteration,
                converged: true,
            };
        }
        x = next;
    }

    RootEstimate {
        value: x,
        iterations: max_iterations,
        converged: false,
    }
}

/// Internal rate of return: the rate at which [`npv`] is zero.
pub fn irr<F>(investment: f64, years: u32, cash_flow: F, initial_guess: f64, tolerance: f64, max_iterations: u32) -> RootEstimate
where
    F: Fn(u32) -> f64,
{
    newton_raphson(
        |r| (npv(r, investment, years, &cash_flow), npv_derivative(r, years, &cash_flow)),
        initial_guess,
        tolerance,
        max_iterations,
    )
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_present_value() {
        // 1100 in one year at 10 % is worth 1000 today
        assert!(approx_eq(present_value(1100.0, 0.10, 1), 1000.0, 1e-9));
        assert_eq!(present_value(500.0, 0.10, 0), 500.0);
    }

    #[test]
    fn test_grown() {
        assert_eq!(grown(1000.0, 0.05, 1), 1000.0);
        assert!(approx_eq(grown(1000.0, 0.05, 3), 1102.5, 1e-9));
    }

    #[test]
    fn test_npv_annuity() {
        // 10 years of 1000 at 8 %: annuity factor 6.7101
        let v = npv(0.08, 0.0, 10, |_| 1000.0);
        assert!(approx_eq(v, 6710.08, 0.01), "NPV = {}", v);
    }

    #[test]
    fn test_npv_derivative_matches_finite_difference() {
        let cf = |t: u32| 1000.0 * 1.05_f64.powi(t as i32 - 1);
        let r = 0.12;
        let h = 1e-6;
        let numeric = (npv(r + h, 5000.0, 20, cf) - npv(r - h, 5000.0, 20, cf)) / (2.0 * h);
        let analytic = npv_derivative(r, 20, cf);
        assert!(approx_eq(numeric, analytic, 1e-2), "{} vs {}", numeric, analytic);
    }

    #[test]
    fn test_irr_known_value() {
        // -1000, +1100 after one year → 10 %
        let est = irr(1000.0, 1, |_| 1100.0, 0.2, 1e-8, 100);
        assert!(est.converged);
        assert!(approx_eq(est.value, 0.10, 1e-6));
    }

    #[test]
    fn test_irr_zeroes_npv() {
        let est = irr(50_000.0, 25, |_| 10_000.0, IRR_INITIAL_GUESS, IRR_TOLERANCE, IRR_MAX_ITERATIONS);
        assert!(est.converged);
        assert!(est.iterations <= IRR_MAX_ITERATIONS);
        let residual = npv(est.value, 50_000.0, 25, |_| 10_000.0);
        assert!(residual.abs() < 10.0, "residual NPV = {}", residual);
        assert!(est.value > 0.19 && est.value < 0.20);
    }

    #[test]
    fn test_newton_respects_iteration_cap() {
        // x² + 1 has no real root: never converges
        let est = newton_raphson(|x| (x * x + 1.0, 2.0 * x), 3.0, 1e-12, 25);
        assert!(!est.converged);
        assert!(est.iterations <= 25);
    }

    #[test]
    fn test_newton_zero_derivative_stops() {
        let est = newton_raphson(|_| (1.0, 0.0), 0.1, 1e-6, 100);
        assert!(!est.converged);
        assert_eq!(est.iterations, 1);
        assert_eq!(est.value, 0.1);
    }
}
