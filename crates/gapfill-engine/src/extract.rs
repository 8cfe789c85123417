//! Subsequence extraction and the stride/offset/block-length enumeration.
//!
//! Everything here is pure: it reads a series and returns index sets and
//! values, never touching a hypothesis.

use gapfill_types::Cell;

/// Exclusive upper end of the stride (and block-length) range for a
/// sequence of length `len`: `floor((2 * len - 1) / 4) + 1`.
pub fn stride_bound(len: usize) -> usize {
    (2 * len).saturating_sub(1) / 4 + 1
}

/// All `(stride, offset)` pairs for a sequence of length `len`,
/// stride ascending then offset ascending.
pub fn strided_combinations(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (1..stride_bound(len)).flat_map(|stride| (0..stride).map(move |offset| (stride, offset)))
}

/// All `(stride, offset, block_length)` triples, ordered stride, offset, block length.
pub fn block_combinations(len: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    let bound = stride_bound(len);
    strided_combinations(len).flat_map(move |(stride, offset)| {
        (1..bound).map(move |block_length| (stride, offset, block_length))
    })
}

// ── Strided Samples ─────────────────────────────────────────────────────

/// Positions `offset, offset + stride, ...` of a series and the complement.
#[derive(Clone, Debug, PartialEq)]
pub struct StridedSample {
    pub offset: usize,
    pub stride: usize,
    /// Sampled positions, ascending.
    pub positions: Vec<usize>,
    /// Values at `positions`.
    pub values: Vec<Cell>,
    /// Values at every other position, ascending.
    pub rest: Vec<Cell>,
}

impl StridedSample {
    /// Position in the full series of the `i`-th sampled element.
    pub fn position(&self, i: usize) -> usize {
        self.offset + i * self.stride
    }

    pub fn has_unknown(&self) -> bool {
        self.values.iter().any(Cell::is_unknown)
    }
}

/// Sample every `stride`-th element starting at `offset`.
///
/// `offset` is expected in `[0, stride)`; a zero stride samples nothing.
pub fn extract_strided(series: &[Cell], offset: usize, stride: usize) -> StridedSample {
    let positions: Vec<usize> = if stride == 0 {
        Vec::new()
    } else {
        (offset..series.len()).step_by(stride).collect()
    };
    let values = positions.iter().map(|&p| series[p]).collect();
    let rest = series
        .iter()
        .enumerate()
        .filter(|(i, _)| stride == 0 || *i < offset || (i - offset) % stride != 0)
        .map(|(_, c)| *c)
        .collect();

    StridedSample {
        offset,
        stride,
        positions,
        values,
        rest,
    }
}

// ── Consecutive Blocks ──────────────────────────────────────────────────

/// Blocks of consecutive positions starting every `stride` positions.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPartition {
    pub offset: usize,
    pub block_length: usize,
    pub stride: usize,
    /// `[p, p + 1, ..., p + block_length - 1]` for each start `p` that fits.
    pub blocks: Vec<Vec<usize>>,
    /// `[p + block_length - 1, p + block_length]` boundary pairs, where both indices exist.
    pub remaining: Vec<[usize; 2]>,
}

impl BlockPartition {
    /// Values of each block, in block order.
    pub fn block_values(&self, series: &[Cell]) -> Vec<Vec<Cell>> {
        self.blocks
            .iter()
            .map(|block| block.iter().map(|&p| series[p]).collect())
            .collect()
    }
}

/// Partition positions of a series of length `len` into consecutive blocks.
///
/// Blocks that would run past the end are dropped.
pub fn extract_blocks(
    len: usize,
    offset: usize,
    block_length: usize,
    stride: usize,
) -> BlockPartition {
    let mut blocks = Vec::new();
    let mut remaining = Vec::new();

    if stride > 0 && block_length > 0 {
        for start in (offset..len).step_by(stride) {
            let end = start + block_length;
            if end <= len {
                blocks.push((start..end).collect());
            }
            if end < len {
                remaining.push([end - 1, end]);
            }
        }
    }

    BlockPartition {
        offset,
        block_length,
        stride,
        blocks,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<f64>]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    #[test]
    fn stride_bound_values() {
        assert_eq!(stride_bound(1), 1);
        assert_eq!(stride_bound(2), 1);
        assert_eq!(stride_bound(3), 2);
        assert_eq!(stride_bound(4), 2);
        assert_eq!(stride_bound(5), 3);
        assert_eq!(stride_bound(8), 4);
    }

    #[test]
    fn combinations_are_ordered() {
        let pairs: Vec<_> = strided_combinations(5).collect();
        assert_eq!(pairs, vec![(1, 0), (2, 0), (2, 1)]);

        let triples: Vec<_> = block_combinations(5).collect();
        assert_eq!(triples[0], (1, 0, 1));
        assert_eq!(triples[1], (1, 0, 2));
        assert_eq!(triples[2], (2, 0, 1));
        assert_eq!(triples.len(), 6);
    }

    #[test]
    fn short_series_has_no_combinations() {
        assert_eq!(strided_combinations(2).count(), 0);
        assert_eq!(block_combinations(1).count(), 0);
    }

    #[test]
    fn strided_sample_and_complement() {
        let series = cells(&[Some(0.0), Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)]);
        let sample = extract_strided(&series, 1, 2);
        assert_eq!(sample.positions, vec![1, 3, 5]);
        assert_eq!(sample.values, cells(&[Some(1.0), Some(3.0), Some(5.0)]));
        assert_eq!(sample.rest, cells(&[Some(0.0), None, Some(4.0)]));
        assert_eq!(sample.position(2), 5);
        assert!(!sample.has_unknown());
    }

    #[test]
    fn blocks_drop_incomplete_tail() {
        let part = extract_blocks(7, 0, 2, 3);
        assert_eq!(part.blocks, vec![vec![0, 1], vec![3, 4]]);
        assert_eq!(part.remaining, vec![[1, 2], [4, 5]]);
    }

    #[test]
    fn blocks_with_offset() {
        let part = extract_blocks(6, 1, 3, 2);
        assert_eq!(part.blocks, vec![vec![1, 2, 3], vec![3, 4, 5]]);
        assert_eq!(part.remaining, vec![[3, 4]]);
    }

    #[test]
    fn block_values_follow_blocks() {
        let series = cells(&[Some(1.0), None, Some(3.0), Some(4.0)]);
        let part = extract_blocks(series.len(), 0, 2, 2);
        assert_eq!(
            part.block_values(&series),
            vec![cells(&[Some(1.0), None]), cells(&[Some(3.0), Some(4.0)])]
        );
    }
}
