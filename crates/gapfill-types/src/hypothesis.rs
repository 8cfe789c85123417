//! The hypothesis record: the unit the search branches over.
//!
//! A hypothesis owns its sequence buffer outright. Siblings are independent
//! copies; the only shared state is the read-only back-reference to the
//! hypothesis it was derived from at a layer transition.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::Cell;
use crate::error::{TypesError, TypesResult};
use crate::rule::RuleRecord;

// ── Identifier ──────────────────────────────────────────────────────────

/// Unique identifier for a hypothesis.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HypothesisId(Uuid);

impl HypothesisId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hyp:{}", self.0)
    }
}

// ── Derivation Kind ─────────────────────────────────────────────────────

/// How a hypothesis' series relates to the series it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationKind {
    /// Built directly from the caller's sequence.
    Root,
    /// Consecutive differences of the ancestor.
    Difference,
    /// Consecutive quotients of the ancestor.
    Quotient,
    /// Known values rewritten in place by an element property inverse.
    ElementwiseNormalized,
}

impl std::fmt::Display for DerivationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Difference => write!(f, "dif"),
            Self::Quotient => write!(f, "quo"),
            Self::ElementwiseNormalized => write!(f, "normalized"),
        }
    }
}

// ── Hypothesis ──────────────────────────────────────────────────────────

/// A sequence with some positions unknown, plus its derivation history.
///
/// The unknown set always equals the set of `Cell::Unknown` positions in
/// `series` and never grows: cells are filled, never re-masked.
#[derive(Clone, Debug)]
pub struct Hypothesis {
    id: HypothesisId,
    series: Vec<Cell>,
    unknown: BTreeSet<usize>,
    truth: Option<Vec<f64>>,
    rule_log: Vec<RuleRecord>,
    ancestor: Option<Arc<Hypothesis>>,
    derivation: DerivationKind,
    layer_origin: DerivationKind,
    depth: usize,
}

impl Hypothesis {
    /// Build a root hypothesis from a fully-known sequence and the positions to withhold.
    ///
    /// The full sequence is kept as `truth` for external validation.
    /// Duplicate positions are ignored.
    pub fn root(
        values: Vec<f64>,
        unknown: impl IntoIterator<Item = usize>,
    ) -> TypesResult<Self> {
        if values.is_empty() {
            return Err(TypesError::EmptySeries);
        }
        let len = values.len();
        let mut masked = BTreeSet::new();
        for index in unknown {
            if index >= len {
                return Err(TypesError::IndexOutOfRange { index, len });
            }
            masked.insert(index);
        }

        let mut series = Vec::with_capacity(len);
        for (i, v) in values.iter().enumerate() {
            if masked.contains(&i) {
                series.push(Cell::Unknown);
            } else if v.is_finite() {
                series.push(Cell::Known(*v));
            } else {
                return Err(TypesError::NonFiniteValue { index: i });
            }
        }

        let truth = values.iter().all(|v| v.is_finite()).then_some(values);

        Ok(Self {
            id: HypothesisId::generate(),
            series,
            unknown: masked,
            truth,
            rule_log: Vec::new(),
            ancestor: None,
            derivation: DerivationKind::Root,
            layer_origin: DerivationKind::Root,
            depth: 0,
        })
    }

    /// Build a root hypothesis from cells that already mark the unknown positions.
    pub fn from_cells(cells: Vec<Cell>) -> TypesResult<Self> {
        if cells.is_empty() {
            return Err(TypesError::EmptySeries);
        }
        if let Some(index) = cells
            .iter()
            .position(|c| c.value().is_some_and(|v| !v.is_finite()))
        {
            return Err(TypesError::NonFiniteValue { index });
        }
        let unknown = crate::cell::unknown_indices(&cells).into_iter().collect();
        Ok(Self {
            id: HypothesisId::generate(),
            series: cells,
            unknown,
            truth: None,
            rule_log: Vec::new(),
            ancestor: None,
            derivation: DerivationKind::Root,
            layer_origin: DerivationKind::Root,
            depth: 0,
        })
    }

    /// Build a hypothesis one layer below `ancestor`.
    ///
    /// The unknown set is recomputed from `series`.
    pub fn derived(
        series: Vec<Cell>,
        ancestor: Arc<Hypothesis>,
        derivation: DerivationKind,
        rule_log: Vec<RuleRecord>,
    ) -> Self {
        let unknown = crate::cell::unknown_indices(&series).into_iter().collect();
        let depth = ancestor.depth + 1;
        Self {
            id: HypothesisId::generate(),
            series,
            unknown,
            truth: None,
            rule_log,
            ancestor: Some(ancestor),
            derivation,
            layer_origin: derivation,
            depth,
        }
    }

    /// An independent copy under a fresh identifier.
    pub fn duplicate(&self) -> Self {
        Self {
            id: HypothesisId::generate(),
            ..self.clone()
        }
    }

    /// Fill unknown positions with values.
    ///
    /// Positions that are already known, out of range, or paired with a
    /// non-finite value are skipped. Returns how many cells were filled.
    pub fn fill(&mut self, writes: &[(usize, f64)]) -> usize {
        let mut filled = 0;
        for &(index, value) in writes {
            if !value.is_finite() || !self.unknown.contains(&index) {
                continue;
            }
            self.series[index] = Cell::Known(value);
            self.unknown.remove(&index);
            filled += 1;
        }
        filled
    }

    /// Rewrite already-known positions in place and mark the series as normalized.
    ///
    /// Unknown positions are never touched. Returns how many cells changed.
    pub fn rewrite_known(&mut self, writes: &[(usize, f64)]) -> usize {
        let mut rewritten = 0;
        for &(index, value) in writes {
            if !value.is_finite() {
                continue;
            }
            match self.series.get_mut(index) {
                Some(cell) if cell.is_known() => {
                    *cell = Cell::Known(value);
                    rewritten += 1;
                }
                _ => {}
            }
        }
        if rewritten > 0 {
            self.derivation = DerivationKind::ElementwiseNormalized;
        }
        rewritten
    }

    /// Append a confirmed rule to the log.
    pub fn record(&mut self, rule: RuleRecord) {
        self.rule_log.push(rule);
    }

    pub fn id(&self) -> &HypothesisId {
        &self.id
    }

    pub fn series(&self) -> &[Cell] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn unknown_positions(&self) -> &BTreeSet<usize> {
        &self.unknown
    }

    pub fn unknown_count(&self) -> usize {
        self.unknown.len()
    }

    /// Terminal when nothing is left to determine.
    pub fn is_resolved(&self) -> bool {
        self.unknown.is_empty()
    }

    pub fn truth(&self) -> Option<&[f64]> {
        self.truth.as_deref()
    }

    pub fn rule_log(&self) -> &[RuleRecord] {
        &self.rule_log
    }

    pub fn ancestor(&self) -> Option<&Arc<Hypothesis>> {
        self.ancestor.as_ref()
    }

    pub fn derivation(&self) -> DerivationKind {
        self.derivation
    }

    /// How this hypothesis' layer was derived from its ancestor's series.
    ///
    /// Unlike [`derivation`](Self::derivation) this never changes after
    /// construction, so it still says difference or quotient after the
    /// series has been normalized.
    pub fn layer_origin(&self) -> DerivationKind {
        self.layer_origin
    }

    /// Layer at which this hypothesis lives (root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Layer origins from the root down to this hypothesis.
    pub fn lineage(&self) -> Vec<DerivationKind> {
        let mut chain = vec![self.layer_origin];
        let mut cursor = self.ancestor.as_deref();
        while let Some(h) = cursor {
            chain.push(h.layer_origin);
            cursor = h.ancestor.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Known values as plain numbers, if the series is fully resolved.
    pub fn resolved_values(&self) -> Option<Vec<f64>> {
        self.series.iter().map(Cell::value).collect()
    }
}
