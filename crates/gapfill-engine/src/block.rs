//! Block tests: constant, arithmetic and geometric structure inside each
//! block of a consecutive-block partition.
//!
//! Blocks are judged independently. A block with enough known values is
//! evidence and must confirm on its own; blocks with too few known values
//! cannot veto. Arithmetic and geometric blocks must also agree on a
//! single parameter across the partition.

use gapfill_types::{known_values, BlockKind, Cell, RuleParameter};

use crate::extract::BlockPartition;
use crate::numeric::Tolerance;
use crate::shape::{
    candidate_difference, candidate_ratio, common_value, consistent_difference,
    consistent_ratio,
};
use crate::verdict::Verdict;

/// Uniform test/fill contract shared by the block test kinds.
pub trait BlockTest {
    /// Decide whether every evidence block of `partition` follows this rule.
    fn evaluate(
        &self,
        series: &[Cell],
        partition: &BlockPartition,
        tol: &Tolerance,
    ) -> Verdict<RuleParameter>;

    /// Values for the unknown cells the confirmed rule can explain,
    /// as `(position in the series, value)`.
    fn fill(
        &self,
        series: &[Cell],
        partition: &BlockPartition,
        parameter: &RuleParameter,
    ) -> Vec<(usize, f64)>;
}

impl BlockTest for BlockKind {
    fn evaluate(
        &self,
        series: &[Cell],
        partition: &BlockPartition,
        tol: &Tolerance,
    ) -> Verdict<RuleParameter> {
        if !series.iter().any(Cell::is_unknown) {
            return Verdict::Inconclusive;
        }
        let blocks = partition.block_values(series);
        match self {
            Self::Constant => constant_blocks(&blocks, tol).map(RuleParameter::PerBlock),
            Self::Arithmetic => arithmetic_blocks(&blocks, tol).map(RuleParameter::Scalar),
            Self::Geometric => geometric_blocks(&blocks, tol).map(RuleParameter::Scalar),
        }
    }

    fn fill(
        &self,
        series: &[Cell],
        partition: &BlockPartition,
        parameter: &RuleParameter,
    ) -> Vec<(usize, f64)> {
        let blocks = partition.block_values(series);
        let local = match (self, parameter) {
            (Self::Constant, RuleParameter::PerBlock(values)) => {
                constant_block_fill(&blocks, values)
            }
            (Self::Arithmetic, RuleParameter::Scalar(d)) => arithmetic_block_fill(&blocks, *d),
            (Self::Geometric, RuleParameter::Scalar(r)) => geometric_block_fill(&blocks, *r),
            _ => return Vec::new(),
        };
        local
            .into_iter()
            .map(|(b, j, v)| (partition.blocks[b][j], v))
            .collect()
    }
}

// ── Evidence ────────────────────────────────────────────────────────────

const CONSTANT_EVIDENCE: usize = 2;
const PROGRESSION_EVIDENCE: usize = 3;

fn non_zero_known(block: &[Cell]) -> Vec<(usize, f64)> {
    known_values(block)
        .into_iter()
        .filter(|(_, v)| *v != 0.0)
        .collect()
}

/// One common value per evidence block, in block order.
fn constant_blocks(blocks: &[Vec<Cell>], tol: &Tolerance) -> Verdict<Vec<f64>> {
    let mut values = Vec::new();
    for block in blocks {
        let known = known_values(block);
        if known.len() < CONSTANT_EVIDENCE {
            continue;
        }
        match common_value(&known, tol) {
            Some(c) => values.push(c),
            None => return Verdict::Rejected,
        }
    }
    if values.is_empty() {
        Verdict::Inconclusive
    } else {
        Verdict::Confirmed(values)
    }
}

fn arithmetic_blocks(blocks: &[Vec<Cell>], tol: &Tolerance) -> Verdict<f64> {
    let known: Vec<_> = blocks.iter().map(|b| known_values(b)).collect();
    progression_blocks(&known, tol, candidate_difference, consistent_difference)
}

fn geometric_blocks(blocks: &[Vec<Cell>], tol: &Tolerance) -> Verdict<f64> {
    let known: Vec<_> = blocks.iter().map(|b| non_zero_known(b)).collect();
    progression_blocks(&known, tol, candidate_ratio, consistent_ratio)
}

/// Shared decision for arithmetic and geometric blocks.
///
/// Every evidence block derives its own candidate, all candidates must
/// agree, and any other block with two usable values must fit the result.
fn progression_blocks(
    known: &[Vec<(usize, f64)>],
    tol: &Tolerance,
    candidate: fn(&[(usize, f64)]) -> Option<f64>,
    consistent: fn(&[(usize, f64)], f64, &Tolerance) -> bool,
) -> Verdict<f64> {
    let mut parameter: Option<f64> = None;
    for block in known.iter().filter(|k| k.len() >= PROGRESSION_EVIDENCE) {
        let Some(p) = candidate(block) else {
            return Verdict::Inconclusive;
        };
        if !consistent(block, p, tol) {
            return Verdict::Rejected;
        }
        match parameter {
            Some(global) if !tol.eq(p, global) => return Verdict::Rejected,
            Some(_) => {}
            None => parameter = Some(p),
        }
    }
    let Some(p) = parameter else {
        return Verdict::Inconclusive;
    };
    let sparse_fit = known
        .iter()
        .filter(|k| (2..PROGRESSION_EVIDENCE).contains(&k.len()))
        .all(|k| consistent(k, p, tol));
    if sparse_fit {
        Verdict::Confirmed(p)
    } else {
        Verdict::Rejected
    }
}

// ── Fill Rules ──────────────────────────────────────────────────────────
//
// Writes come back as (block index, index within block, value).

fn unknown_slots(block: &[Cell]) -> impl Iterator<Item = usize> + '_ {
    block
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_unknown())
        .map(|(j, _)| j)
}

/// Each evidence block's unknowns get that block's own value.
fn constant_block_fill(blocks: &[Vec<Cell>], values: &[f64]) -> Vec<(usize, usize, f64)> {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| known_values(block).len() >= CONSTANT_EVIDENCE)
        .zip(values)
        .flat_map(|((b, block), &c)| unknown_slots(block).map(move |j| (b, j, c)))
        .collect()
}

fn arithmetic_block_fill(blocks: &[Vec<Cell>], d: f64) -> Vec<(usize, usize, f64)> {
    let mut writes = Vec::new();
    for (b, block) in blocks.iter().enumerate() {
        let Some((a, v)) = known_values(block).first().copied() else {
            continue;
        };
        writes.extend(unknown_slots(block).map(|j| (b, j, v + (j as f64 - a as f64) * d)));
    }
    writes
}

fn geometric_block_fill(blocks: &[Vec<Cell>], r: f64) -> Vec<(usize, usize, f64)> {
    let mut writes = Vec::new();
    for (b, block) in blocks.iter().enumerate() {
        let Some((a, v)) = non_zero_known(block).first().copied() else {
            continue;
        };
        writes.extend(unknown_slots(block).map(|j| (b, j, v * r.powi(j as i32 - a as i32))));
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_blocks;

    fn cells(values: &[Option<f64>]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    fn tol() -> Tolerance {
        Tolerance::default()
    }

    #[test]
    fn constant_blocks_keep_their_own_values() {
        // Pairs of repeated values: 4 4 | 7 ? | 9 9
        let series = cells(&[Some(4.0), Some(4.0), Some(7.0), None, Some(9.0), Some(9.0)]);
        let part = extract_blocks(series.len(), 0, 2, 2);
        let verdict = BlockKind::Constant.evaluate(&series, &part, &tol());
        assert_eq!(
            verdict,
            Verdict::Confirmed(RuleParameter::PerBlock(vec![4.0, 9.0]))
        );
        // The middle block has a single known value and is not evidence.
        let param = verdict.confirmed().unwrap();
        assert!(BlockKind::Constant.fill(&series, &part, &param).is_empty());
    }

    #[test]
    fn constant_blocks_fill_evidence_blocks() {
        let series = cells(&[
            Some(1.0), None, Some(1.0), Some(6.0), Some(6.0), None,
        ]);
        let part = extract_blocks(series.len(), 0, 3, 3);
        let param = BlockKind::Constant
            .evaluate(&series, &part, &tol())
            .confirmed()
            .unwrap();
        assert_eq!(param, RuleParameter::PerBlock(vec![1.0, 6.0]));
        assert_eq!(
            BlockKind::Constant.fill(&series, &part, &param),
            vec![(1, 1.0), (5, 6.0)]
        );
    }

    #[test]
    fn one_disagreeing_block_rejects() {
        let series = cells(&[Some(1.0), Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)]);
        let part = extract_blocks(series.len(), 0, 2, 2);
        assert_eq!(
            BlockKind::Constant.evaluate(&series, &part, &tol()),
            Verdict::Rejected
        );
    }

    #[test]
    fn arithmetic_blocks_share_one_difference() {
        // 1 2 3 | 10 ? 12
        let series = cells(&[Some(1.0), Some(2.0), Some(3.0), Some(10.0), None, Some(12.0)]);
        let part = extract_blocks(series.len(), 0, 3, 3);
        let verdict = BlockKind::Arithmetic.evaluate(&series, &part, &tol());
        assert_eq!(verdict, Verdict::Confirmed(RuleParameter::Scalar(1.0)));
        assert_eq!(
            BlockKind::Arithmetic.fill(&series, &part, &RuleParameter::Scalar(1.0)),
            vec![(4, 11.0)]
        );
    }

    #[test]
    fn arithmetic_blocks_must_agree() {
        let series = cells(&[
            Some(1.0), Some(2.0), Some(3.0), Some(10.0), Some(12.0), Some(14.0), None,
        ]);
        let part = extract_blocks(series.len(), 0, 3, 3);
        assert_eq!(
            BlockKind::Arithmetic.evaluate(&series, &part, &tol()),
            Verdict::Rejected
        );
    }

    #[test]
    fn sparse_block_must_fit_global_difference() {
        // Second block has only two known values, but they contradict d = 1.
        let series = cells(&[Some(1.0), Some(2.0), Some(3.0), Some(10.0), None, Some(20.0)]);
        let part = extract_blocks(series.len(), 0, 3, 3);
        assert_eq!(
            BlockKind::Arithmetic.evaluate(&series, &part, &tol()),
            Verdict::Rejected
        );
    }

    #[test]
    fn geometric_blocks_fill_from_first_anchor() {
        // 1 2 4 | ? 6 12
        let series = cells(&[Some(1.0), Some(2.0), Some(4.0), None, Some(6.0), Some(12.0)]);
        let part = extract_blocks(series.len(), 0, 3, 3);
        let verdict = BlockKind::Geometric.evaluate(&series, &part, &tol());
        assert_eq!(verdict, Verdict::Confirmed(RuleParameter::Scalar(2.0)));
        assert_eq!(
            BlockKind::Geometric.fill(&series, &part, &RuleParameter::Scalar(2.0)),
            vec![(3, 3.0)]
        );
    }

    #[test]
    fn no_evidence_or_nothing_unknown_is_inconclusive() {
        let series = cells(&[Some(1.0), None, Some(3.0), None]);
        let part = extract_blocks(series.len(), 0, 2, 2);
        assert_eq!(
            BlockKind::Arithmetic.evaluate(&series, &part, &tol()),
            Verdict::Inconclusive
        );

        let series = cells(&[Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
        assert_eq!(
            BlockKind::Constant.evaluate(&series, &part, &tol()),
            Verdict::Inconclusive
        );
    }
}
