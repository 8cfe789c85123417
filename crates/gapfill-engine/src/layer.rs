//! One layer of the search: element, shape and block phases over a
//! candidate list.
//!
//! ```text
//!   input ──► element phase ──► shape phase ──► block phase ──► output
//!            (+ normalized     (+ one filled    (+ one filled
//!             siblings)         sibling each)    sibling each)
//! ```
//!
//! Every phase reads its input list and appends siblings; no candidate is
//! ever modified once it is in a list.

use std::sync::Arc;

use gapfill_types::{Hypothesis, RuleRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::block::BlockTest;
use crate::config::ResolvedTests;
use crate::element::{normalize, PropertySource};
use crate::extract::{block_combinations, extract_blocks, extract_strided, strided_combinations};
use crate::numeric::Tolerance;
use crate::shape::ShapeTest;

// ── Layer Statistics ────────────────────────────────────────────────────

/// Candidate counts for one layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    pub depth: usize,
    /// Candidates entering the layer.
    pub input: usize,
    /// Siblings created by normalization.
    pub normalized: usize,
    /// Siblings created by shape tests.
    pub shaped: usize,
    /// Siblings created by block tests.
    pub blocked: usize,
    /// Candidates with no unknown position left.
    pub resolved: usize,
    /// Whether the candidate cap dropped any sibling.
    pub truncated: bool,
}

impl LayerStats {
    /// Candidates leaving the layer.
    pub fn output(&self) -> usize {
        self.input + self.normalized + self.shaped + self.blocked
    }
}

/// Candidate list after one layer, with each candidate's remaining-unknown count.
#[derive(Debug)]
pub struct LayerResult {
    pub candidates: Vec<Hypothesis>,
    /// Index-aligned with `candidates`.
    pub remaining: Vec<usize>,
    pub stats: LayerStats,
}

impl LayerResult {
    /// Candidates with nothing left to determine.
    pub fn resolved(&self) -> impl Iterator<Item = &Hypothesis> {
        self.candidates
            .iter()
            .zip(&self.remaining)
            .filter(|(_, n)| **n == 0)
            .map(|(h, _)| h)
    }
}

// ── Layer Engine ────────────────────────────────────────────────────────

/// Runs the three test phases of a layer.
pub struct LayerEngine {
    tests: ResolvedTests,
    tolerance: Tolerance,
    source: Arc<dyn PropertySource>,
    max_candidates: Option<usize>,
}

impl LayerEngine {
    pub fn new(
        tests: ResolvedTests,
        tolerance: Tolerance,
        source: Arc<dyn PropertySource>,
        max_candidates: Option<usize>,
    ) -> Self {
        Self {
            tests,
            tolerance,
            source,
            max_candidates,
        }
    }

    /// Run all three phases over `candidates`.
    pub fn run(&self, depth: usize, candidates: Vec<Hypothesis>) -> LayerResult {
        let mut stats = LayerStats {
            depth,
            input: candidates.len(),
            ..Default::default()
        };
        let mut list = candidates;

        let siblings: Vec<Hypothesis> = list
            .iter()
            .filter(|h| !h.is_resolved())
            .flat_map(|h| self.element_siblings(h))
            .collect();
        stats.normalized = self.extend_capped(&mut list, siblings, &mut stats.truncated);
        debug!(depth, phase = "element", siblings = stats.normalized, "phase complete");

        let siblings: Vec<Hypothesis> = list
            .iter()
            .filter(|h| !h.is_resolved())
            .filter_map(|h| self.shape_sibling(h))
            .collect();
        stats.shaped = self.extend_capped(&mut list, siblings, &mut stats.truncated);
        debug!(depth, phase = "shape", siblings = stats.shaped, "phase complete");

        let siblings: Vec<Hypothesis> = list
            .iter()
            .filter(|h| !h.is_resolved())
            .filter_map(|h| self.block_sibling(h))
            .collect();
        stats.blocked = self.extend_capped(&mut list, siblings, &mut stats.truncated);
        debug!(depth, phase = "block", siblings = stats.blocked, "phase complete");

        let remaining: Vec<usize> = list.iter().map(Hypothesis::unknown_count).collect();
        stats.resolved = remaining.iter().filter(|n| **n == 0).count();

        LayerResult {
            candidates: list,
            remaining,
            stats,
        }
    }

    /// Append siblings up to the candidate cap. Returns how many were kept.
    fn extend_capped(
        &self,
        list: &mut Vec<Hypothesis>,
        siblings: Vec<Hypothesis>,
        truncated: &mut bool,
    ) -> usize {
        let offered = siblings.len();
        let room = match self.max_candidates {
            Some(max) => max.saturating_sub(list.len()),
            None => usize::MAX,
        };
        let kept = offered.min(room);
        list.extend(siblings.into_iter().take(kept));
        if kept < offered {
            *truncated = true;
            debug!(dropped = offered - kept, "candidate cap reached");
        }
        kept
    }

    // ── Element Phase ───────────────────────────────────────────────────

    /// One independent normalized sibling per qualifying (property, stride, offset, sign).
    fn element_siblings(&self, candidate: &Hypothesis) -> Vec<Hypothesis> {
        let mut siblings = Vec::new();
        for &property in &self.tests.element {
            for (stride, offset) in strided_combinations(candidate.len()) {
                let sample = extract_strided(candidate.series(), offset, stride);
                for &sign in property.orientations() {
                    if let Some(sibling) =
                        normalize(candidate, &sample, property, sign, self.source.as_ref())
                    {
                        trace!(%property, offset, stride, %sign, "normalized");
                        siblings.push(sibling);
                    }
                }
            }
        }
        siblings
    }

    // ── Shape Phase ─────────────────────────────────────────────────────

    /// A copy of `candidate` filled by every shape rule that confirms, if any does.
    fn shape_sibling(&self, candidate: &Hypothesis) -> Option<Hypothesis> {
        let mut working = candidate.duplicate();
        let mut fired = false;

        'tests: for &kind in &self.tests.shape {
            for (stride, offset) in strided_combinations(working.len()) {
                let sample = extract_strided(working.series(), offset, stride);
                if !sample.has_unknown() {
                    continue;
                }
                let Some(parameter) = kind.evaluate(&sample.values, &self.tolerance).confirmed()
                else {
                    continue;
                };
                let writes: Vec<(usize, f64)> = kind
                    .fill(&sample.values, &parameter)
                    .into_iter()
                    .map(|(i, v)| (sample.position(i), v))
                    .collect();
                if working.fill(&writes) == 0 {
                    continue;
                }
                trace!(%kind, offset, stride, %parameter, "shape rule filled");
                working.record(RuleRecord::Shape {
                    kind,
                    offset,
                    stride,
                    parameter,
                });
                fired = true;
                if working.is_resolved() {
                    break 'tests;
                }
            }
        }

        fired.then_some(working)
    }

    // ── Block Phase ─────────────────────────────────────────────────────

    /// A copy of `candidate` filled by every block rule that confirms, if any does.
    fn block_sibling(&self, candidate: &Hypothesis) -> Option<Hypothesis> {
        let mut working = candidate.duplicate();
        let mut fired = false;
        let len = working.len();

        'tests: for &kind in &self.tests.block {
            for (stride, offset, block_length) in block_combinations(len) {
                let partition = extract_blocks(len, offset, block_length, stride);
                let Some(parameter) = kind
                    .evaluate(working.series(), &partition, &self.tolerance)
                    .confirmed()
                else {
                    continue;
                };
                let writes = kind.fill(working.series(), &partition, &parameter);
                if working.fill(&writes) == 0 {
                    continue;
                }
                trace!(%kind, offset, block_length, stride, %parameter, "block rule filled");
                working.record(RuleRecord::Block {
                    kind,
                    offset,
                    block_length,
                    stride,
                    parameter,
                });
                fired = true;
                if working.is_resolved() {
                    break 'tests;
                }
            }
        }

        fired.then_some(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::element::ComputedProperties;
    use gapfill_types::{BlockKind, Cell, RuleParameter, ShapeKind, Sign};

    fn engine(config: &SearchConfig) -> LayerEngine {
        let (tests, _) = config.resolve();
        LayerEngine::new(
            tests,
            config.tolerance,
            Arc::new(ComputedProperties),
            config.max_candidates,
        )
    }

    fn root(values: &[f64], unknown: &[usize]) -> Hypothesis {
        Hypothesis::root(values.to_vec(), unknown.iter().copied()).unwrap()
    }

    #[test]
    fn constant_sequence_resolves() {
        let result = engine(&SearchConfig::default()).run(0, vec![root(&[5.0; 5], &[2])]);
        let solved: Vec<_> = result.resolved().collect();
        assert!(!solved.is_empty());
        // Normalized siblings resolve in their own domain; the plain one gives 5.
        assert!(solved
            .iter()
            .filter(|h| h.rule_log().iter().all(|r| !matches!(r, RuleRecord::Normalize { .. })))
            .all(|h| h.series()[2] == Cell::Known(5.0)));
        assert!(solved.iter().any(|h| h.series()[2] == Cell::Known(5.0)));
        assert_eq!(result.stats.resolved, solved.len());
        assert_eq!(result.candidates.len(), result.stats.output());
    }

    #[test]
    fn input_candidates_survive_untouched() {
        let input = root(&[1.0, 3.0, 5.0, 7.0, 9.0], &[2]);
        let id = input.id().clone();
        let result = engine(&SearchConfig::default()).run(0, vec![input]);
        assert_eq!(result.candidates[0].id(), &id);
        assert_eq!(result.candidates[0].unknown_count(), 1);
        assert_eq!(result.remaining[0], 1);
    }

    #[test]
    fn shape_sibling_records_rule() {
        let config = SearchConfig {
            shape_tests: vec!["sum".into()],
            block_tests: vec![],
            element_tests: vec![],
            ..Default::default()
        };
        let result = engine(&config).run(0, vec![root(&[1.0, 3.0, 5.0, 7.0, 9.0], &[2])]);
        assert_eq!(result.candidates.len(), 2);
        let sibling = &result.candidates[1];
        assert_eq!(sibling.series()[2], Cell::Known(5.0));
        assert_eq!(
            sibling.rule_log(),
            &[RuleRecord::Shape {
                kind: ShapeKind::Arithmetic,
                offset: 0,
                stride: 1,
                parameter: RuleParameter::Scalar(2.0),
            }]
        );
    }

    #[test]
    fn interleaved_rules_combine_in_one_sibling() {
        // Even positions count up by 1, odd positions stay at 9.
        let config = SearchConfig {
            shape_tests: vec!["sum".into(), "const".into()],
            block_tests: vec![],
            element_tests: vec![],
            ..Default::default()
        };
        let values = [1.0, 9.0, 2.0, 9.0, 3.0, 9.0, 4.0, 9.0];
        let result = engine(&config).run(0, vec![root(&values, &[3, 4])]);
        let solved: Vec<_> = result.resolved().collect();
        assert_eq!(solved.len(), 1);
        assert_eq!(solved[0].resolved_values().unwrap(), values.to_vec());
        assert_eq!(solved[0].rule_log().len(), 2);
    }

    #[test]
    fn element_siblings_are_independent() {
        let config = SearchConfig {
            shape_tests: vec![],
            block_tests: vec![],
            element_tests: vec!["prime".into()],
            ..Default::default()
        };
        let result = engine(&config).run(0, vec![root(&[2.0, 3.0, 5.0, 7.0, 11.0], &[3])]);
        for sibling in &result.candidates[1..] {
            assert_eq!(sibling.rule_log().len(), 1);
            assert_eq!(sibling.unknown_count(), 1);
        }
        assert!(result
            .candidates
            .iter()
            .any(|h| h.series()[..3] == [Cell::Known(1.0), Cell::Known(2.0), Cell::Known(3.0)]));
    }

    #[test]
    fn cube_normalization_is_not_repeated_per_sign() {
        let config = SearchConfig {
            shape_tests: vec![],
            block_tests: vec![],
            element_tests: vec!["cube".into()],
            ..Default::default()
        };
        let result = engine(&config).run(0, vec![root(&[1.0, 8.0, 27.0, 64.0, 125.0], &[3])]);
        let siblings = &result.candidates[1..];
        // (stride 1, offset 0), (stride 2, offset 0), (stride 2, offset 1).
        assert_eq!(siblings.len(), 3);
        for (i, a) in siblings.iter().enumerate() {
            for b in &siblings[i + 1..] {
                assert_ne!(a.series(), b.series());
            }
        }
        assert!(siblings.iter().all(|h| matches!(
            h.rule_log(),
            [RuleRecord::Normalize {
                sign: Sign::Positive,
                ..
            }]
        )));
    }

    #[test]
    fn block_phase_fills_repeated_triples() {
        let config = SearchConfig {
            shape_tests: vec![],
            block_tests: vec!["const".into()],
            element_tests: vec![],
            ..Default::default()
        };
        let values = [4.0, 4.0, 4.0, 7.0, 7.0, 7.0, 1.0, 1.0, 1.0];
        let result = engine(&config).run(0, vec![root(&values, &[4])]);
        let solved: Vec<_> = result.resolved().collect();
        assert_eq!(solved.len(), 1);
        assert_eq!(solved[0].series()[4], Cell::Known(7.0));
        assert!(matches!(
            solved[0].rule_log()[0],
            RuleRecord::Block {
                kind: BlockKind::Constant,
                ..
            }
        ));
    }

    #[test]
    fn candidate_cap_drops_siblings() {
        let config = SearchConfig {
            max_candidates: Some(2),
            ..Default::default()
        };
        let result = engine(&config).run(0, vec![root(&[2.0, 3.0, 5.0, 7.0, 11.0], &[3])]);
        assert_eq!(result.candidates.len(), 2);
        assert!(result.stats.truncated);
    }

    #[test]
    fn short_series_has_nothing_to_test() {
        let result = engine(&SearchConfig::default()).run(0, vec![root(&[1.0, 2.0], &[1])]);
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.stats.resolved, 0);
    }
}
