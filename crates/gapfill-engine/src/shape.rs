//! Shape tests over one strided subsequence: constant, arithmetic,
//! geometric and Fibonacci-style recurrence, with their fill rules.
//!
//! Every test is inconclusive when the subsequence holds no unknown value,
//! since there is nothing for a confirmed rule to explain.

use std::collections::BTreeMap;

use gapfill_types::{known_values, Cell, RuleParameter, ShapeKind};

use crate::numeric::Tolerance;
use crate::verdict::Verdict;

/// Uniform test/fill contract shared by the shape test kinds.
pub trait ShapeTest {
    /// Decide whether the subsequence follows this shape.
    fn evaluate(&self, values: &[Cell], tol: &Tolerance) -> Verdict<RuleParameter>;

    /// Values for the unknown cells the confirmed rule can explain,
    /// as `(index within the subsequence, value)`.
    fn fill(&self, values: &[Cell], parameter: &RuleParameter) -> Vec<(usize, f64)>;
}

impl ShapeTest for ShapeKind {
    fn evaluate(&self, values: &[Cell], tol: &Tolerance) -> Verdict<RuleParameter> {
        match self {
            Self::Constant => constant_test(values, tol).map(RuleParameter::Scalar),
            Self::Arithmetic => arithmetic_test(values, tol).map(RuleParameter::Scalar),
            Self::Geometric => geometric_test(values, tol).map(RuleParameter::Scalar),
            Self::Fibonacci => fibonacci_test(values, tol).map(RuleParameter::Positions),
        }
    }

    fn fill(&self, values: &[Cell], parameter: &RuleParameter) -> Vec<(usize, f64)> {
        match (self, parameter) {
            (Self::Constant, RuleParameter::Scalar(c)) => constant_fill(values, *c),
            (Self::Arithmetic, RuleParameter::Scalar(d)) => arithmetic_fill(values, *d),
            (Self::Geometric, RuleParameter::Scalar(r)) => geometric_fill(values, *r),
            (Self::Fibonacci, RuleParameter::Positions(_)) => fibonacci_fill(values),
            _ => Vec::new(),
        }
    }
}

// ── Shared Helpers ──────────────────────────────────────────────────────

/// Common value of `known`, if all agree with the first.
pub(crate) fn common_value(known: &[(usize, f64)], tol: &Tolerance) -> Option<f64> {
    let &(_, first) = known.first()?;
    tol.all_eq(known.iter().map(|(_, v)| *v), first)
        .then_some(first)
}

/// Candidate step from the first two known values: `(v1 - v0) / (i1 - i0)`.
pub(crate) fn candidate_difference(known: &[(usize, f64)]) -> Option<f64> {
    let (i0, v0) = *known.first()?;
    let (i1, v1) = *known.get(1)?;
    Some((v1 - v0) / (i1 - i0) as f64)
}

/// Every consecutive known pair differs by `d` times its index gap.
pub(crate) fn consistent_difference(known: &[(usize, f64)], d: f64, tol: &Tolerance) -> bool {
    known
        .windows(2)
        .all(|w| tol.eq(d * (w[1].0 - w[0].0) as f64, w[1].1 - w[0].1))
}

/// Candidate ratio from the first two (non-zero) known values:
/// `(v1 / v0) ^ (1 / (i1 - i0))`. `None` when that is not a real number.
pub(crate) fn candidate_ratio(known: &[(usize, f64)]) -> Option<f64> {
    let (i0, v0) = *known.first()?;
    let (i1, v1) = *known.get(1)?;
    let r = (v1 / v0).powf(1.0 / (i1 - i0) as f64);
    (r.is_finite() && r != 0.0).then_some(r)
}

/// Every consecutive known pair has ratio `r` raised to its index gap.
pub(crate) fn consistent_ratio(known: &[(usize, f64)], r: f64, tol: &Tolerance) -> bool {
    known
        .windows(2)
        .all(|w| tol.eq(r.powi((w[1].0 - w[0].0) as i32), w[1].1 / w[0].1))
}

fn non_zero(known: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    known.into_iter().filter(|(_, v)| *v != 0.0).collect()
}

fn has_unknown(values: &[Cell]) -> bool {
    values.iter().any(Cell::is_unknown)
}

// ── Tests ───────────────────────────────────────────────────────────────

/// All known values equal. Needs at least two known values.
pub fn constant_test(values: &[Cell], tol: &Tolerance) -> Verdict<f64> {
    if !has_unknown(values) {
        return Verdict::Inconclusive;
    }
    let known = known_values(values);
    if known.len() < 2 {
        return Verdict::Inconclusive;
    }
    match common_value(&known, tol) {
        Some(c) => Verdict::Confirmed(c),
        None => Verdict::Rejected,
    }
}

/// Constant difference. Needs at least three known values.
pub fn arithmetic_test(values: &[Cell], tol: &Tolerance) -> Verdict<f64> {
    if !has_unknown(values) {
        return Verdict::Inconclusive;
    }
    let known = known_values(values);
    if known.len() < 3 {
        return Verdict::Inconclusive;
    }
    match candidate_difference(&known) {
        Some(d) if consistent_difference(&known, d, tol) => Verdict::Confirmed(d),
        Some(_) => Verdict::Rejected,
        None => Verdict::Inconclusive,
    }
}

/// Constant ratio. Needs at least three known non-zero values; zeros are ignored.
pub fn geometric_test(values: &[Cell], tol: &Tolerance) -> Verdict<f64> {
    if !has_unknown(values) {
        return Verdict::Inconclusive;
    }
    let known = non_zero(known_values(values));
    if known.len() < 3 {
        return Verdict::Inconclusive;
    }
    match candidate_ratio(&known) {
        Some(r) if consistent_ratio(&known, r, tol) => Verdict::Confirmed(r),
        Some(_) => Verdict::Rejected,
        None => Verdict::Inconclusive,
    }
}

/// What window `(i, i+1, i+2)` says about its single unknown cell, if it has exactly one.
fn deduce(i: usize, a: Option<f64>, b: Option<f64>, c: Option<f64>) -> Option<(usize, f64)> {
    match (a, b, c) {
        (None, Some(b), Some(c)) => Some((i, c - b)),
        (Some(a), None, Some(c)) => Some((i + 1, c - a)),
        (Some(a), Some(b), None) => Some((i + 2, a + b)),
        _ => None,
    }
}

/// Each value is the sum of the two before it.
///
/// A fully-known window `(i, i+1, i+2)` must satisfy the recurrence and
/// counts as one check. A window with exactly one unknown deduces it; every
/// further deduction of the same cell must agree and counts as one check.
/// Confirmed with two or more checks and no contradiction. The parameter is
/// the start index of every window that took part.
pub fn fibonacci_test(values: &[Cell], tol: &Tolerance) -> Verdict<Vec<usize>> {
    if !has_unknown(values) || values.len() < 3 {
        return Verdict::Inconclusive;
    }

    let mut checks = 0usize;
    let mut windows = Vec::new();
    let mut deduced: BTreeMap<usize, f64> = BTreeMap::new();

    for i in 0..values.len() - 2 {
        let (a, b, c) = (values[i].value(), values[i + 1].value(), values[i + 2].value());
        if let (Some(a), Some(b), Some(c)) = (a, b, c) {
            if !tol.eq(a + b, c) {
                return Verdict::Rejected;
            }
            checks += 1;
            windows.push(i);
            continue;
        }
        let Some((slot, value)) = deduce(i, a, b, c) else {
            continue;
        };
        windows.push(i);
        match deduced.get(&slot) {
            Some(previous) if !tol.eq(value, *previous) => return Verdict::Rejected,
            Some(_) => checks += 1,
            None => {
                deduced.insert(slot, value);
            }
        }
    }

    if checks >= 2 {
        Verdict::Confirmed(windows)
    } else {
        Verdict::Inconclusive
    }
}

// ── Fill Rules ──────────────────────────────────────────────────────────

pub fn constant_fill(values: &[Cell], c: f64) -> Vec<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_unknown())
        .map(|(i, _)| (i, c))
        .collect()
}

/// Each unknown from its nearest known anchor (earlier one on ties).
pub fn arithmetic_fill(values: &[Cell], d: f64) -> Vec<(usize, f64)> {
    let known = known_values(values);
    values
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_unknown())
        .filter_map(|(i, _)| {
            let &(a, v) = known.iter().min_by_key(|(j, _)| i.abs_diff(*j))?;
            Some((i, v + (i as f64 - a as f64) * d))
        })
        .collect()
}

/// Each unknown from the first known non-zero anchor.
pub fn geometric_fill(values: &[Cell], r: f64) -> Vec<(usize, f64)> {
    let Some((a, v)) = known_values(values).into_iter().find(|(_, v)| *v != 0.0) else {
        return Vec::new();
    };
    values
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_unknown())
        .map(|(i, _)| (i, v * r.powi(i as i32 - a as i32)))
        .collect()
}

/// Propagate the recurrence forward and backward until nothing more follows.
pub fn fibonacci_fill(values: &[Cell]) -> Vec<(usize, f64)> {
    let mut cells = values.to_vec();
    let mut writes = Vec::new();
    if cells.len() < 3 {
        return writes;
    }
    loop {
        let mut changed = false;
        for i in 0..cells.len() - 2 {
            let deduction = deduce(i, cells[i].value(), cells[i + 1].value(), cells[i + 2].value());
            if let Some((slot, value)) = deduction.filter(|(_, v)| v.is_finite()) {
                cells[slot] = Cell::Known(value);
                writes.push((slot, value));
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<f64>]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    fn tol() -> Tolerance {
        Tolerance::default()
    }

    #[test]
    fn constant_confirms_and_fills() {
        let v = cells(&[Some(5.0), Some(5.0), None, Some(5.0), Some(5.0)]);
        assert_eq!(constant_test(&v, &tol()), Verdict::Confirmed(5.0));
        assert_eq!(constant_fill(&v, 5.0), vec![(2, 5.0)]);
    }

    #[test]
    fn constant_needs_two_known() {
        let v = cells(&[Some(5.0), None, None]);
        assert_eq!(constant_test(&v, &tol()), Verdict::Inconclusive);
        let v = cells(&[Some(5.0), None, Some(6.0)]);
        assert_eq!(constant_test(&v, &tol()), Verdict::Rejected);
    }

    #[test]
    fn nothing_to_explain_is_inconclusive() {
        let v = cells(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(constant_test(&v, &tol()), Verdict::Inconclusive);
        assert_eq!(arithmetic_test(&v, &tol()), Verdict::Inconclusive);
        assert_eq!(geometric_test(&v, &tol()), Verdict::Inconclusive);
        assert_eq!(fibonacci_test(&v, &tol()), Verdict::Inconclusive);
    }

    #[test]
    fn arithmetic_confirms_with_gaps() {
        let v = cells(&[Some(1.0), Some(3.0), None, Some(7.0), Some(9.0)]);
        assert_eq!(arithmetic_test(&v, &tol()), Verdict::Confirmed(2.0));
        assert_eq!(arithmetic_fill(&v, 2.0), vec![(2, 5.0)]);

        let v = cells(&[Some(10.0), None, Some(6.0), None, Some(2.0), None]);
        assert_eq!(arithmetic_test(&v, &tol()), Verdict::Confirmed(-2.0));
        assert_eq!(
            arithmetic_fill(&v, -2.0),
            vec![(1, 8.0), (3, 4.0), (5, 0.0)]
        );
    }

    #[test]
    fn arithmetic_rejects_and_needs_three() {
        let v = cells(&[Some(1.0), Some(4.0), None, Some(9.0), Some(25.0)]);
        assert_eq!(arithmetic_test(&v, &tol()), Verdict::Rejected);
        let v = cells(&[Some(1.0), None, Some(3.0)]);
        assert_eq!(arithmetic_test(&v, &tol()), Verdict::Inconclusive);
    }

    #[test]
    fn geometric_confirms_and_fills() {
        let v = cells(&[Some(2.0), Some(4.0), None, Some(16.0), Some(32.0)]);
        assert_eq!(geometric_test(&v, &tol()), Verdict::Confirmed(2.0));
        assert_eq!(geometric_fill(&v, 2.0), vec![(2, 8.0)]);
    }

    #[test]
    fn geometric_fills_before_anchor() {
        let v = cells(&[None, Some(6.0), None, Some(54.0), Some(162.0)]);
        assert_eq!(geometric_test(&v, &tol()), Verdict::Confirmed(3.0));
        assert_eq!(geometric_fill(&v, 3.0), vec![(0, 2.0), (2, 18.0)]);
    }

    #[test]
    fn geometric_degenerate_cases() {
        // Only two non-zero values.
        let v = cells(&[Some(0.0), Some(2.0), None, Some(8.0)]);
        assert_eq!(geometric_test(&v, &tol()), Verdict::Inconclusive);
        // Negative base with an even gap has no real root.
        let v = cells(&[Some(1.0), None, Some(-4.0), Some(8.0), None]);
        assert_eq!(geometric_test(&v, &tol()), Verdict::Inconclusive);
        // Alternating sign with unit gap is fine.
        let v = cells(&[Some(1.0), Some(-2.0), Some(4.0), None]);
        assert_eq!(geometric_test(&v, &tol()), Verdict::Confirmed(-2.0));
    }

    #[test]
    fn fibonacci_deductions_must_agree() {
        // Three windows all deduce position 2 = 2.
        let v = cells(&[Some(1.0), Some(1.0), None, Some(3.0), Some(5.0)]);
        assert_eq!(fibonacci_test(&v, &tol()), Verdict::Confirmed(vec![0, 1, 2]));
        assert_eq!(fibonacci_fill(&v), vec![(2, 2.0)]);

        let v = cells(&[Some(5.0), Some(5.0), None, Some(5.0), Some(5.0)]);
        assert_eq!(fibonacci_test(&v, &tol()), Verdict::Rejected);
    }

    #[test]
    fn fibonacci_from_full_windows() {
        let v = cells(&[Some(1.0), Some(2.0), Some(3.0), Some(5.0), None, None]);
        assert_eq!(fibonacci_test(&v, &tol()), Verdict::Confirmed(vec![0, 1, 2]));
        assert_eq!(fibonacci_fill(&v), vec![(4, 8.0), (5, 13.0)]);
    }

    #[test]
    fn fibonacci_fills_backward() {
        let v = cells(&[None, None, Some(2.0), Some(3.0), Some(5.0), Some(8.0)]);
        assert!(fibonacci_test(&v, &tol()).is_confirmed());
        let mut writes = fibonacci_fill(&v);
        writes.sort_by_key(|(i, _)| *i);
        assert_eq!(writes, vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn fibonacci_single_window_is_not_enough() {
        let v = cells(&[Some(2.0), Some(3.0), Some(5.0), None, Some(11.0)]);
        // 3 + 5 would give 8 but 11 - 5 gives 6.
        assert_eq!(fibonacci_test(&v, &tol()), Verdict::Rejected);
        let v = cells(&[Some(1.0), Some(2.0), Some(3.0), None]);
        assert_eq!(fibonacci_test(&v, &tol()), Verdict::Inconclusive);
    }

    #[test]
    fn trait_dispatch_matches_free_functions() {
        let v = cells(&[Some(1.0), Some(3.0), None, Some(7.0), Some(9.0)]);
        let verdict = ShapeKind::Arithmetic.evaluate(&v, &tol());
        assert_eq!(verdict, Verdict::Confirmed(RuleParameter::Scalar(2.0)));
        assert_eq!(
            ShapeKind::Arithmetic.fill(&v, &RuleParameter::Scalar(2.0)),
            vec![(2, 5.0)]
        );
        // Mismatched parameter fills nothing.
        assert!(ShapeKind::Constant
            .fill(&v, &RuleParameter::Positions(vec![0]))
            .is_empty());
    }
}
