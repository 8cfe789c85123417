//! The search driver: a bounded breadth-first walk over layers.
//!
//! ```text
//!   Depth0 ──(none resolved)──► Depth1 ──(none resolved)──► Depth2 ──► NoSolution
//!     │                           │                           │
//!     └──────(any resolved)───────┴──────(any resolved)───────┴──────► Solved
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gapfill_types::{Cell, DerivationKind, Hypothesis, HypothesisId, RuleRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{PropertyMode, SearchConfig};
use crate::element::{ComputedProperties, PropertySource, ReferenceLists};
use crate::error::{GapfillError, GapfillResult};
use crate::layer::{LayerEngine, LayerStats};
use crate::reconstruct::{matches_truth, reconstruct, ReconstructionStatus};
use crate::transition::next_generation;

/// Number of layers searched before giving up (depths 0, 1 and 2).
pub const MAX_LAYERS: usize = 3;

// ── Search State ────────────────────────────────────────────────────────

/// The layer the driver is about to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Depth0,
    Depth1,
    Depth2,
}

impl SearchState {
    pub fn depth(&self) -> usize {
        match self {
            Self::Depth0 => 0,
            Self::Depth1 => 1,
            Self::Depth2 => 2,
        }
    }

    /// The state after an unresolved layer; `None` once the bound is reached.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Depth0 => Some(Self::Depth1),
            Self::Depth1 => Some(Self::Depth2),
            Self::Depth2 => None,
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────────

/// The rules one layer of a lineage applied before handing on its series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerRules {
    pub depth: usize,
    pub origin: DerivationKind,
    pub rules: Vec<RuleRecord>,
}

impl LayerRules {
    /// One entry per layer from the chain root down to `hypothesis`.
    pub fn chain(hypothesis: &Hypothesis) -> Vec<Self> {
        let mut chain = Vec::with_capacity(hypothesis.depth() + 1);
        let mut cursor = Some(hypothesis);
        while let Some(h) = cursor {
            chain.push(Self {
                depth: h.depth(),
                origin: h.layer_origin(),
                rules: h.rule_log().to_vec(),
            });
            cursor = h.ancestor().map(|a| &**a);
        }
        chain.reverse();
        chain
    }
}

/// A fully resolved candidate, ready for presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub id: HypothesisId,
    pub depth: usize,
    /// Layer origins from the root down to this candidate.
    pub lineage: Vec<DerivationKind>,
    /// The candidate's own series, in its own domain.
    pub series: Vec<Cell>,
    /// Rules applied at this candidate's layer, in order.
    pub rule_log: Vec<RuleRecord>,
    /// Rules applied at every layer of the lineage, root first.
    pub rule_chain: Vec<LayerRules>,
    /// The series mapped back to the caller's domain.
    pub reconstruction: Vec<Cell>,
    /// Whether the reconstruction is whole and agrees with every ancestor.
    pub reconstruction_status: ReconstructionStatus,
    /// Whether the reconstruction agrees with the withheld values, when known.
    pub matches_truth: Option<bool>,
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one candidate resolved; all resolved candidates of that depth.
    Solved {
        depth: usize,
        solutions: Vec<Solution>,
    },
    /// No candidate resolved within the depth bound.
    NoSolution { layers_searched: usize },
}

/// Outcome of one search run plus its bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Name of the property source used.
    pub property_source: String,
    pub layers: Vec<LayerStats>,
    /// Configuration problems that were skipped, such as unknown test names.
    pub issues: Vec<String>,
    pub outcome: SearchOutcome,
}

impl SearchReport {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Solved { .. })
    }

    /// Solutions whose reconstruction is whole and consistent.
    pub fn complete_solutions(&self) -> impl Iterator<Item = &Solution> {
        self.solutions()
            .iter()
            .filter(|s| s.reconstruction_status == ReconstructionStatus::Complete)
    }

    pub fn solutions(&self) -> &[Solution] {
        match &self.outcome {
            SearchOutcome::Solved { solutions, .. } => solutions,
            SearchOutcome::NoSolution { .. } => &[],
        }
    }
}

// ── Driver ──────────────────────────────────────────────────────────────

/// Runs the layered search for one configuration.
pub struct SearchDriver {
    config: SearchConfig,
    engine: LayerEngine,
    source: Arc<dyn PropertySource>,
    issues: Vec<String>,
}

impl SearchDriver {
    /// Driver with computed properties.
    ///
    /// Fails when the configuration asks for reference lists.
    pub fn new(config: SearchConfig) -> GapfillResult<Self> {
        Self::from_config(config, None)
    }

    /// Driver whose property source follows `config.property_mode`.
    pub fn from_config(config: SearchConfig, lists: Option<ReferenceLists>) -> GapfillResult<Self> {
        let source: Arc<dyn PropertySource> = match (config.property_mode, lists) {
            (PropertyMode::Reference, Some(lists)) => Arc::new(lists),
            (PropertyMode::Reference, None) => {
                return Err(GapfillError::Configuration(
                    "reference property mode needs reference lists".into(),
                ))
            }
            (PropertyMode::Computed, Some(_)) => {
                warn!("reference lists supplied in computed mode; ignoring them");
                Arc::new(ComputedProperties)
            }
            (PropertyMode::Computed, None) => Arc::new(ComputedProperties),
        };
        Self::with_source(config, source)
    }

    /// Driver with an explicit property source.
    pub fn with_source(
        config: SearchConfig,
        source: Arc<dyn PropertySource>,
    ) -> GapfillResult<Self> {
        config.validate()?;
        let (tests, problems) = config.resolve();
        let issues = problems.iter().map(ToString::to_string).collect();
        let engine = LayerEngine::new(
            tests,
            config.tolerance,
            Arc::clone(&source),
            config.max_candidates,
        );
        Ok(Self {
            config,
            engine,
            source,
            issues,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Build a root from `values` with `unknown` withheld, then search.
    pub fn solve(
        &self,
        values: Vec<f64>,
        unknown: impl IntoIterator<Item = usize>,
    ) -> GapfillResult<SearchReport> {
        let root = Hypothesis::root(values, unknown)?;
        Ok(self.search(root))
    }

    /// Search from `root` until some depth resolves or the bound is reached.
    pub fn search(&self, root: Hypothesis) -> SearchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, len = root.len(), unknown = root.unknown_count(), "search started");

        let mut layers = Vec::with_capacity(MAX_LAYERS);
        let mut candidates = vec![root];
        let mut state = Some(SearchState::Depth0);
        let mut outcome = SearchOutcome::NoSolution { layers_searched: 0 };

        while let Some(current) = state {
            let depth = current.depth();
            info!(depth, candidates = candidates.len(), "entering layer");
            let result = self.engine.run(depth, candidates);
            layers.push(result.stats.clone());

            let solutions: Vec<Solution> =
                result.resolved().map(|h| self.solution(h)).collect();
            if !solutions.is_empty() {
                info!(depth, solutions = solutions.len(), "search solved");
                outcome = SearchOutcome::Solved { depth, solutions };
                break;
            }

            state = current.next();
            candidates = match state {
                Some(_) => next_generation(result.candidates),
                None => Vec::new(),
            };
        }

        if let SearchOutcome::NoSolution { layers_searched } = &mut outcome {
            *layers_searched = layers.len();
            info!(layers = layers.len(), "no solution within depth bound");
        }

        SearchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            property_source: self.source.name().to_string(),
            layers,
            issues: self.issues.clone(),
            outcome,
        }
    }

    fn solution(&self, hypothesis: &Hypothesis) -> Solution {
        let tol = &self.config.tolerance;
        let reconstruction = reconstruct(hypothesis, self.source.as_ref(), tol);
        if reconstruction.status != ReconstructionStatus::Complete {
            debug!(
                id = %hypothesis.id(),
                status = ?reconstruction.status,
                "reconstruction is not complete"
            );
        }
        let matches_truth = matches_truth(hypothesis, &reconstruction.values, tol);
        Solution {
            id: hypothesis.id().clone(),
            depth: hypothesis.depth(),
            lineage: hypothesis.lineage(),
            series: hypothesis.series().to_vec(),
            rule_log: hypothesis.rule_log().to_vec(),
            rule_chain: LayerRules::chain(hypothesis),
            reconstruction: reconstruction.values,
            reconstruction_status: reconstruction.status,
            matches_truth,
        }
    }
}
