//! # gapfill-engine
//!
//! Layered hypothesis search that infers the rule behind a numeric sequence
//! and fills its unknown positions.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────┐
//!   │ Root hypothesis     │  ← caller's sequence + unknown positions
//!   └──────────┬──────────┘
//!              ▼
//!   ┌─────────────────────┐
//!   │ Element phase       │  ← prime / square / cube normalization siblings
//!   └──────────┬──────────┘
//!              ▼
//!   ┌─────────────────────┐
//!   │ Shape phase         │  ← const / sum / fac / fib over strided samples
//!   └──────────┬──────────┘
//!              ▼
//!   ┌─────────────────────┐
//!   │ Block phase         │  ← const / sum / fac inside consecutive blocks
//!   └──────────┬──────────┘
//!              ▼
//!        any resolved? ── yes ──► Solved (reconstructed to the root domain)
//!              │ no
//!              ▼
//!   ┌─────────────────────┐
//!   │ Layer transition    │  ← difference and quotient children
//!   └──────────┬──────────┘
//!              ▼
//!        next depth (at most 0, 1, 2) ──► NoSolution
//! ```
//!
//! ## Key Principles
//!
//! - **Siblings, never mutation**: a confirmed rule fills a copy of the
//!   candidate; the original stays in the list untouched.
//! - **Unknowns only shrink**: a cell is filled at most once and never
//!   re-masked.
//! - **Inconclusive is not failure**: too little evidence or a degenerate
//!   numeric case simply does not confirm.
//! - **Bounded depth**: three layers, then a regular no-solution outcome.

#![deny(unsafe_code)]

pub mod block;
pub mod config;
pub mod element;
pub mod error;
pub mod extract;
pub mod layer;
pub mod numeric;
pub mod reconstruct;
pub mod search;
pub mod shape;
pub mod transition;
pub mod verdict;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use block::BlockTest;
pub use config::{PropertyMode, ResolvedTests, SearchConfig};
pub use element::{ComputedProperties, PropertySource, ReferenceLists, ReferenceListsSpec};
pub use error::{GapfillError, GapfillResult};
pub use extract::{
    block_combinations, extract_blocks, extract_strided, stride_bound, strided_combinations,
    BlockPartition, StridedSample,
};
pub use layer::{LayerEngine, LayerResult, LayerStats};
pub use numeric::Tolerance;
pub use reconstruct::{
    integrate, links_hold, matches_truth, reconstruct, undo_normalizations, Reconstruction,
    ReconstructionStatus,
};
pub use search::{
    LayerRules, SearchDriver, SearchOutcome, SearchReport, SearchState, Solution, MAX_LAYERS,
};
pub use shape::ShapeTest;
pub use transition::{derive_children, difference_series, next_generation, quotient_series};
pub use verdict::Verdict;

#[cfg(test)]
mod tests {
    use super::*;
    use gapfill_types::{Cell, DerivationKind, ElementProperty, RuleParameter, RuleRecord, ShapeKind};

    fn solve(values: &[f64], unknown: &[usize]) -> SearchReport {
        SearchDriver::new(SearchConfig::default())
            .unwrap()
            .solve(values.to_vec(), unknown.iter().copied())
            .unwrap()
    }

    fn shape_kinds(solution: &Solution) -> Vec<ShapeKind> {
        solution
            .rule_log
            .iter()
            .filter_map(|r| match r {
                RuleRecord::Shape { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn scenario_constant() {
        let report = solve(&[5.0, 5.0, 5.0, 5.0, 5.0], &[2]);
        assert!(matches!(report.outcome, SearchOutcome::Solved { depth: 0, .. }));
        for solution in report.solutions() {
            assert_eq!(solution.reconstruction[2], Cell::Known(5.0));
            assert_eq!(solution.matches_truth, Some(true));
        }
        assert!(report
            .solutions()
            .iter()
            .any(|s| s.rule_log.first() == Some(&RuleRecord::Shape {
                kind: ShapeKind::Constant,
                offset: 0,
                stride: 1,
                parameter: RuleParameter::Scalar(5.0),
            })));
    }

    #[test]
    fn scenario_arithmetic() {
        let report = solve(&[1.0, 3.0, 5.0, 7.0, 9.0], &[2]);
        assert!(matches!(report.outcome, SearchOutcome::Solved { depth: 0, .. }));
        let plain = report
            .solutions()
            .iter()
            .find(|s| shape_kinds(s) == vec![ShapeKind::Arithmetic])
            .unwrap();
        assert_eq!(plain.series[2], Cell::Known(5.0));
        assert_eq!(plain.lineage, vec![DerivationKind::Root]);
        assert!(report.solutions().iter().all(|s| s.matches_truth == Some(true)));
    }

    #[test]
    fn scenario_geometric() {
        let report = solve(&[2.0, 4.0, 8.0, 16.0, 32.0], &[2]);
        let solution = report
            .solutions()
            .iter()
            .find(|s| shape_kinds(s) == vec![ShapeKind::Geometric])
            .unwrap();
        assert_eq!(solution.series[2], Cell::Known(8.0));
        assert_eq!(solution.depth, 0);
    }

    #[test]
    fn scenario_fibonacci() {
        let report = solve(&[1.0, 1.0, 2.0, 3.0, 5.0], &[2]);
        let solution = report
            .solutions()
            .iter()
            .find(|s| shape_kinds(s) == vec![ShapeKind::Fibonacci])
            .unwrap();
        assert_eq!(solution.series[2], Cell::Known(2.0));
        assert_eq!(solution.matches_truth, Some(true));
    }

    #[test]
    fn scenario_no_solution() {
        let report = solve(&[1.0, 4.0, 16.0, 9.0, 25.0], &[2]);
        assert_eq!(
            report.outcome,
            SearchOutcome::NoSolution { layers_searched: 3 }
        );
        assert_eq!(report.layers.len(), MAX_LAYERS);
    }

    #[test]
    fn scenario_prime_normalization() {
        let report = solve(&[2.0, 3.0, 5.0, 7.0, 11.0], &[3]);
        assert!(matches!(report.outcome, SearchOutcome::Solved { depth: 0, .. }));
        let solution = report
            .solutions()
            .iter()
            .find(|s| {
                matches!(
                    s.rule_log.first(),
                    Some(RuleRecord::Normalize {
                        property: ElementProperty::Prime,
                        stride: 1,
                        ..
                    })
                )
            })
            .unwrap();
        assert_eq!(solution.series[3], Cell::Known(4.0));
        assert_eq!(
            solution.reconstruction,
            vec![
                Cell::Known(2.0),
                Cell::Known(3.0),
                Cell::Known(5.0),
                Cell::Known(7.0),
                Cell::Known(11.0)
            ]
        );
        assert_eq!(solution.matches_truth, Some(true));
    }

    #[test]
    fn second_order_sequence_resolves_at_depth_one() {
        // n^2 + 1: first differences 3, 5, 7, 9, 11 are arithmetic.
        let report = solve(&[2.0, 5.0, 10.0, 17.0, 26.0, 37.0], &[3]);
        match &report.outcome {
            SearchOutcome::Solved { depth, solutions } => {
                assert_eq!(*depth, 1);
                let found = solutions
                    .iter()
                    .find(|s| s.reconstruction[3] == Cell::Known(17.0))
                    .unwrap();
                assert_eq!(
                    found.lineage,
                    vec![DerivationKind::Root, DerivationKind::Difference]
                );
                assert_eq!(found.matches_truth, Some(true));
                assert_eq!(found.reconstruction_status, ReconstructionStatus::Complete);
            }
            other => panic!("expected a solution, got {:?}", other),
        }
    }
}
