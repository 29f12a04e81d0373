//! # Unit Types
//!
//! Lightweight newtype wrappers for the three quantities an estimate deals
//! in: rentable area, dollars, and dollars per rentable square foot.
//!
//! Rates and totals in the engine's output are plain `f64` fields so the JSON
//! stays flat; these wrappers are used where the area arithmetic happens and
//! for display formatting in reports, comparisons and the CLI.
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::units::{Dollars, DollarsPerRsf, Rsf};
//!
//! let rate = DollarsPerRsf(150.0);
//! let area = Rsf(25_000.0);
//! let total: Dollars = rate * area;
//! assert_eq!(total.to_string(), "$3,750,000");
//! assert_eq!((total / area).0, 150.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Area
// ============================================================================

/// Rentable area in square feet (RSF)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rsf(pub f64);

// ============================================================================
// Money
// ============================================================================

/// An amount in US dollars
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dollars(pub f64);

/// A rate in US dollars per rentable square foot
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DollarsPerRsf(pub f64);

impl Mul<Rsf> for DollarsPerRsf {
    type Output = Dollars;
    fn mul(self, rhs: Rsf) -> Dollars {
        Dollars(self.0 * rhs.0)
    }
}

impl Div<Rsf> for Dollars {
    type Output = DollarsPerRsf;
    fn div(self, rhs: Rsf) -> DollarsPerRsf {
        DollarsPerRsf(self.0 / rhs.0)
    }
}

// ============================================================================
// Display
// ============================================================================

/// Insert thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Dollars {
    /// Whole dollars with separators: `$1,234,567`, `-$2,500`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        let digits = format!("{:.0}", rounded.abs());
        write!(f, "{}${}", sign, group_thousands(&digits))
    }
}

impl fmt::Display for DollarsPerRsf {
    /// Cents precision: `$251.64/RSF`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = format!("{:.2}", self.0.abs());
        let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
        let sign = if self.0 < 0.0 && formatted != "0.00" { "-" } else { "" };
        write!(f, "{}${}.{}/RSF", sign, group_thousands(whole), cents)
    }
}

impl fmt::Display for Rsf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = format!("{:.0}", self.0.abs());
        let sign = if self.0 < 0.0 { "-" } else { "" };
        write!(f, "{}{} RSF", sign, group_thousands(&digits))
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
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

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Rsf);
impl_arithmetic!(Dollars);
impl_arithmetic!(DollarsPerRsf);
