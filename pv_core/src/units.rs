//! # Unit Types
//!
//! Type-safe wrappers for the power and energy units the engine converts
//! between. These are plain f64 newtypes that serialize as bare numbers.
//!
//! ## Units
//!
//! - Power: watts (W), kilowatts-peak (kWp)
//! - Energy: kilowatt-hours (kWh), megawatt-hours (MWh)
//!
//! ## Example
//!
//! ```rust
//! use pv_core::units::{KilowattPeak, Watts};
//!
//! let array = Watts(6600.0);
//! let kwp: KilowattPeak = array.into();
//! assert_eq!(kwp.0, 6.6);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Power Units
// ============================================================================

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Rated DC power in kilowatts-peak
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilowattPeak(pub f64);

impl From<Watts> for KilowattPeak {
    fn from(w: Watts) -> Self {
        KilowattPeak(w.0 / 1000.0)
    }
}

impl From<KilowattPeak> for Watts {
    fn from(kwp: KilowattPeak) -> Self {
        Watts(kwp.0 * 1000.0)
    }
}

// ============================================================================
// Energy Units
// ============================================================================

/// Energy in kilowatt-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilowattHours(pub f64);

/// Energy in megawatt-hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MegawattHours(pub f64);

impl From<KilowattHours> for MegawattHours {
    fn from(kwh: KilowattHours) -> Self {
        MegawattHours(kwh.0 / 1000.0)
    }
}

impl From<MegawattHours> for KilowattHours {
    fn from(mwh: MegawattHours) -> Self {
        KilowattHours(mwh.0 * 1000.0)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Watts);
impl_arithmetic!(KilowattPeak);
impl_arithmetic!(KilowattHours);
impl_arithmetic!(MegawattHours);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watts_to_kwp() {
        let kwp: KilowattPeak = Watts(550.0 * 12.0).into();
        assert!((kwp.0 - 6.6).abs() < 1e-12);

        let back: Watts = kwp.into();
        assert!((back.0 - 6600.0).abs() < 1e-9);
    }

    #[test]
    fn test_kwh_to_mwh() {
        let mwh: MegawattHours = KilowattHours(6270.0).into();
        assert!((mwh.0 - 6.27).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let a = KilowattHours(10.0);
        let b = KilowattHours(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 12.0).0, 120.0);
        assert_eq!((a / 2.0).value(), 5.0);
    }

    #[test]
    fn test_serialization() {
        let w = Watts(550.0);
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, "550.0");

        let roundtrip: Watts = serde_json::from_str(&json).unwrap();
        assert_eq!(w, roundtrip);
    }
}
