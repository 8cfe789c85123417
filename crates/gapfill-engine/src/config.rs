//! Search configuration and test-name resolution.

use std::str::FromStr;

use gapfill_types::{BlockKind, ElementProperty, ShapeKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GapfillError, GapfillResult};
use crate::numeric::Tolerance;

/// Where element property answers come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyMode {
    /// Direct computation.
    #[default]
    Computed,
    /// Caller-supplied reference lists.
    Reference,
}

impl std::fmt::Display for PropertyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Computed => write!(f, "computed"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Configuration for a search run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shape tests by name, run in this order.
    pub shape_tests: Vec<String>,
    /// Block tests by name, run in this order.
    pub block_tests: Vec<String>,
    /// Element properties by name, run in this order.
    pub element_tests: Vec<String>,
    /// Floating-point comparison tolerance.
    pub tolerance: Tolerance,
    /// Where property answers come from.
    pub property_mode: PropertyMode,
    /// Cap on candidates per layer; `None` is unbounded.
    pub max_candidates: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            shape_tests: names(&ShapeKind::ALL),
            block_tests: names(&BlockKind::ALL),
            element_tests: names(&ElementProperty::ALL),
            tolerance: Tolerance::default(),
            property_mode: PropertyMode::Computed,
            max_candidates: None,
        }
    }
}

fn names<K: ToString>(kinds: &[K]) -> Vec<String> {
    kinds.iter().map(ToString::to_string).collect()
}

/// Test names resolved to their kinds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedTests {
    pub shape: Vec<ShapeKind>,
    pub block: Vec<BlockKind>,
    pub element: Vec<ElementProperty>,
}

impl SearchConfig {
    /// Resolve test names.
    ///
    /// Unknown names are skipped and returned as issues; repeated names run once.
    pub fn resolve(&self) -> (ResolvedTests, Vec<GapfillError>) {
        let mut issues = Vec::new();
        let tests = ResolvedTests {
            shape: resolve_names(&self.shape_tests, &mut issues),
            block: resolve_names(&self.block_tests, &mut issues),
            element: resolve_names(&self.element_tests, &mut issues),
        };
        (tests, issues)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> GapfillResult<()> {
        let Tolerance { relative, absolute } = self.tolerance;
        if !(relative.is_finite() && absolute.is_finite()) || relative < 0.0 || absolute < 0.0 {
            return Err(GapfillError::Configuration(format!(
                "tolerance must be finite and non-negative (relative {}, absolute {})",
                relative, absolute
            )));
        }
        if self.max_candidates == Some(0) {
            return Err(GapfillError::Configuration(
                "max_candidates must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn resolve_names<K>(names: &[String], issues: &mut Vec<GapfillError>) -> Vec<K>
where
    K: FromStr + PartialEq,
{
    let mut kinds = Vec::new();
    for name in names {
        match name.parse::<K>() {
            Ok(kind) if kinds.contains(&kind) => {}
            Ok(kind) => kinds.push(kind),
            Err(_) => {
                warn!(test = %name, "ignoring unknown test kind");
                issues.push(GapfillError::UnknownTestKind(name.trim().to_string()));
            }
        }
    }
    kinds
}
