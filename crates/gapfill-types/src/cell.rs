//! A single position of a sequence: either a known value or unknown.

use serde::{Deserialize, Serialize};

/// One position of a sequence under search.
///
/// Serialized untagged, so a known cell is a plain number and an unknown
/// cell is `null`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// A determined value.
    Known(f64),
    /// A position whose value has not been determined yet.
    Unknown,
}

impl Cell {
    /// The value if known.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Known(v) => Some(*v),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Apply `f` to a known value; unknown stays unknown.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Known(v) => Self::Known(f(v)),
            Self::Unknown => Self::Unknown,
        }
    }

    /// Combine two cells; the result is unknown if either operand is.
    pub fn zip_with(self, other: Cell, f: impl FnOnce(f64, f64) -> f64) -> Self {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => Self::Known(f(a, b)),
            _ => Self::Unknown,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Known(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Unknown, Self::Known)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(v) => write!(f, "{}", v),
            Self::Unknown => write!(f, "?"),
        }
    }
}

/// Indices of all unknown cells, ascending.
pub fn unknown_indices(cells: &[Cell]) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_unknown())
        .map(|(i, _)| i)
        .collect()
}

/// Known values paired with their index, ascending by index.
pub fn known_values(cells: &[Cell]) -> Vec<(usize, f64)> {
    cells
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.value().map(|v| (i, v)))
        .collect()
}
