//! Mapping a resolved hypothesis back to the domain of the caller's sequence.
//!
//! A hypothesis found at depth 1 or 2 holds differences or quotients, and a
//! normalized one holds ordinals or roots. Reconstruction undoes both, one
//! ancestor at a time, until it reaches the depth-0 hypothesis.

use gapfill_types::{Cell, DerivationKind, Hypothesis, RuleRecord};
use serde::{Deserialize, Serialize};

use crate::element::PropertySource;
use crate::numeric::Tolerance;

/// How well a resolved hypothesis maps back to the root domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionStatus {
    /// Every position mapped back and every link agrees with the ancestors.
    Complete,
    /// Some positions could not be mapped back and stay unknown.
    Partial,
    /// A known ancestor value contradicts the derived series.
    Inconsistent,
}

/// A series mapped back to the root domain, with its status.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconstruction {
    pub values: Vec<Cell>,
    pub status: ReconstructionStatus,
}

/// The series of `hypothesis` expressed in the root domain.
///
/// Positions that cannot be mapped back (for instance an ordinal with no
/// matching prime in a reference list) come back unknown. Every ancestor
/// link is checked against the derived series after integration.
pub fn reconstruct(
    hypothesis: &Hypothesis,
    source: &dyn PropertySource,
    tol: &Tolerance,
) -> Reconstruction {
    let mut values = undo_normalizations(hypothesis.series(), hypothesis.rule_log(), source);
    let mut consistent = true;
    let mut current = hypothesis;
    while let Some(ancestor) = current.ancestor() {
        let origin = current.layer_origin();
        let parent = integrate(ancestor.series(), &values, origin);
        consistent &= links_hold(&parent, &values, origin, tol);
        values = undo_normalizations(&parent, ancestor.rule_log(), source);
        current = ancestor;
    }

    let status = if !consistent {
        ReconstructionStatus::Inconsistent
    } else if values.iter().any(Cell::is_unknown) {
        ReconstructionStatus::Partial
    } else {
        ReconstructionStatus::Complete
    };
    Reconstruction { values, status }
}

/// Undo the normalizations in `log`, latest first.
///
/// A position rewritten under sign `s` maps back as `v -> s * forward(s * v)`.
pub fn undo_normalizations(
    series: &[Cell],
    log: &[RuleRecord],
    source: &dyn PropertySource,
) -> Vec<Cell> {
    let mut out = series.to_vec();
    for rule in log.iter().rev() {
        let RuleRecord::Normalize {
            property,
            offset,
            stride,
            sign,
        } = rule
        else {
            continue;
        };
        let s = sign.factor();
        for p in (*offset..out.len()).step_by((*stride).max(1)) {
            out[p] = Cell::from(
                out[p]
                    .value()
                    .and_then(|v| source.forward(*property, s * v))
                    .map(|v| s * v),
            );
        }
    }
    out
}

type LinkOp = fn(f64, f64) -> f64;

/// Forward and backward step across one link of a derived series.
fn link_ops(origin: DerivationKind) -> Option<(LinkOp, LinkOp)> {
    match origin {
        DerivationKind::Difference => Some((|a: f64, d: f64| a + d, |b: f64, d: f64| b - d)),
        DerivationKind::Quotient => Some((|a: f64, q: f64| a * q, |b: f64, q: f64| b / q)),
        DerivationKind::Root | DerivationKind::ElementwiseNormalized => None,
    }
}

/// Fill the unknown cells of `parent` from a derived `child` series.
///
/// Each child value links two neighbouring parent cells; whenever one side
/// is known the other follows. Repeats until nothing changes. Known parent
/// values are never overwritten.
pub fn integrate(parent: &[Cell], child: &[Cell], origin: DerivationKind) -> Vec<Cell> {
    let mut out = parent.to_vec();
    if child.len() + 1 != out.len() {
        return out;
    }
    let Some((forward, backward)) = link_ops(origin) else {
        return out;
    };

    loop {
        let mut changed = false;
        for (i, link) in child.iter().enumerate() {
            let Some(link) = link.value() else {
                continue;
            };
            let next = match (out[i], out[i + 1]) {
                (Cell::Known(a), Cell::Unknown) => Some((i + 1, forward(a, link))),
                (Cell::Unknown, Cell::Known(b)) => Some((i, backward(b, link))),
                _ => None,
            };
            if let Some((slot, value)) = next.filter(|(_, v)| v.is_finite()) {
                out[slot] = Cell::Known(value);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    out
}

/// Whether every link of `child` whose two parent cells are known agrees
/// with them within `tol`.
pub fn links_hold(
    parent: &[Cell],
    child: &[Cell],
    origin: DerivationKind,
    tol: &Tolerance,
) -> bool {
    if child.len() + 1 != parent.len() {
        return false;
    }
    let Some((forward, _)) = link_ops(origin) else {
        return true;
    };
    child.iter().enumerate().all(|(i, link)| {
        match (parent[i].value(), link.value(), parent[i + 1].value()) {
            (Some(a), Some(link), Some(b)) => tol.eq(forward(a, link), b),
            _ => true,
        }
    })
}

/// The depth-0 hypothesis at the top of the ancestor chain.
pub fn chain_root(hypothesis: &Hypothesis) -> &Hypothesis {
    let mut current = hypothesis;
    while let Some(ancestor) = current.ancestor() {
        current = ancestor;
    }
    current
}

/// Whether `reconstruction` agrees with the truth carried by the chain root.
///
/// `None` when the root carries no truth.
pub fn matches_truth(
    hypothesis: &Hypothesis,
    reconstruction: &[Cell],
    tol: &Tolerance,
) -> Option<bool> {
    let truth = chain_root(hypothesis).truth()?;
    Some(
        truth.len() == reconstruction.len()
            && truth
                .iter()
                .zip(reconstruction)
                .all(|(t, c)| c.value().is_some_and(|v| tol.eq(v, *t))),
    )
}
