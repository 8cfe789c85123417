//! Layer transition: difference and quotient children.

use std::sync::Arc;

use gapfill_types::{Cell, DerivationKind, Hypothesis};
use tracing::debug;

/// `d[i] = s[i + 1] - s[i]`; unknown where either operand is.
pub fn difference_series(series: &[Cell]) -> Vec<Cell> {
    series
        .windows(2)
        .map(|w| w[1].zip_with(w[0], |next, prev| next - prev))
        .collect()
}

/// `q[i] = s[i + 1] / s[i]`; unknown where either operand is.
///
/// `None` when any known value is exactly zero or a quotient is not finite.
pub fn quotient_series(series: &[Cell]) -> Option<Vec<Cell>> {
    if series.iter().any(|c| c.value() == Some(0.0)) {
        return None;
    }
    let quotients: Vec<Cell> = series
        .windows(2)
        .map(|w| w[1].zip_with(w[0], |next, prev| next / prev))
        .collect();
    quotients
        .iter()
        .all(|c| c.value().map_or(true, f64::is_finite))
        .then_some(quotients)
}

/// Difference and (when defined) quotient children of `parent`.
///
/// Children start with an empty rule log; the parent's log stays on the
/// parent. A parent shorter than two positions has no children.
pub fn derive_children(parent: Arc<Hypothesis>) -> Vec<Hypothesis> {
    if parent.len() < 2 {
        return Vec::new();
    }
    let mut children = vec![Hypothesis::derived(
        difference_series(parent.series()),
        Arc::clone(&parent),
        DerivationKind::Difference,
        Vec::new(),
    )];
    if let Some(quotients) = quotient_series(parent.series()) {
        children.push(Hypothesis::derived(
            quotients,
            Arc::clone(&parent),
            DerivationKind::Quotient,
            Vec::new(),
        ));
    }
    children
}

/// Children of every candidate, in candidate order.
pub fn next_generation(candidates: Vec<Hypothesis>) -> Vec<Hypothesis> {
    let parents = candidates.len();
    let children: Vec<Hypothesis> = candidates
        .into_iter()
        .flat_map(|h| derive_children(Arc::new(h)))
        .collect();
    debug!(parents, children = children.len(), "layer transition");
    children
}
