//! The normalization pass over one strided subsequence.

use gapfill_types::{Cell, ElementProperty, Hypothesis, RuleRecord, Sign};

use crate::extract::StridedSample;

use super::{invert_cells, test_cells, PropertySource};

/// Rewrite the known values of `sample` by the property inverse, if all of them qualify.
///
/// Under `sign` the property is tested on `sign * v` and the position is
/// rewritten to `sign * inverse(sign * v)`. At least one known value is
/// required. Returns a normalized duplicate of `hypothesis`, or `None` when
/// the subsequence does not qualify or nothing would change. The unknown
/// positions are left exactly as they were.
pub fn normalize(
    hypothesis: &Hypothesis,
    sample: &StridedSample,
    property: ElementProperty,
    sign: Sign,
    source: &dyn PropertySource,
) -> Option<Hypothesis> {
    let s = sign.factor();
    let oriented: Vec<Cell> = sample.values.iter().map(|c| c.map(|v| s * v)).collect();

    let known = oriented.iter().filter(|c| c.is_known()).count();
    if known == 0 {
        return None;
    }
    let passing = test_cells(source, property, &oriented)
        .into_iter()
        .filter(|ok| *ok)
        .count();
    if passing != known {
        return None;
    }

    let inverted = invert_cells(source, property, &oriented);
    let mut writes = Vec::with_capacity(known);
    for (i, (before, after)) in oriented.iter().zip(&inverted).enumerate() {
        if before.is_unknown() {
            continue;
        }
        writes.push((sample.position(i), s * after.value()?));
    }

    let series = hypothesis.series();
    if writes
        .iter()
        .all(|&(p, v)| series[p] == Cell::Known(v))
    {
        return None;
    }

    let mut sibling = hypothesis.duplicate();
    sibling.rewrite_known(&writes);
    sibling.record(RuleRecord::Normalize {
        property,
        offset: sample.offset,
        stride: sample.stride,
        sign,
    });
    Some(sibling)
}
