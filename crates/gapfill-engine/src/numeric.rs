//! Approximate floating-point comparison.

use serde::{Deserialize, Serialize};

/// Relative/absolute tolerance pair.
///
/// `a ≈ b` when `|a - b| <= absolute + relative * |b|`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-5,
            absolute: 1e-8,
        }
    }
}

impl Tolerance {
    pub fn eq(&self, a: f64, b: f64) -> bool {
        if !a.is_finite() || !b.is_finite() {
            return false;
        }
        (a - b).abs() <= self.absolute + self.relative * b.abs()
    }

    /// Every value approximately equal to `target`.
    pub fn all_eq(&self, values: impl IntoIterator<Item = f64>, target: f64) -> bool {
        values.into_iter().all(|v| self.eq(v, target))
    }
}

/// Round `v` to the nearest integer if it is within `1e-6` of one.
pub fn near_integer(v: f64) -> Option<i64> {
    if !v.is_finite() || v.abs() > 9.0e15 {
        return None;
    }
    let r = v.round();
    ((v - r).abs() <= 1e-6).then_some(r as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_allclose() {
        let tol = Tolerance::default();
        assert!(tol.eq(1.0, 1.0 + 1e-9));
        assert!(tol.eq(100_000.0, 100_000.5));
        assert!(!tol.eq(1.0, 1.001));
    }

    #[test]
    fn non_finite_never_equal() {
        let tol = Tolerance::default();
        assert!(!tol.eq(f64::NAN, f64::NAN));
        assert!(!tol.eq(f64::INFINITY, f64::INFINITY));
    }

    #[test]
    fn near_integer_accepts_float_noise() {
        assert_eq!(near_integer(4.000_000_000_1), Some(4));
        assert_eq!(near_integer(-3.0), Some(-3));
        assert_eq!(near_integer(2.5), None);
        assert_eq!(near_integer(f64::NAN), None);
    }
}
