//! # gapfill-types
//!
//! Shared data model for the gapfill hypothesis search.
//!
//! A [`Hypothesis`] is a sequence of [`Cell`]s, some of them unknown, together
//! with the [`RuleRecord`]s that explain every value filled so far and a
//! back-reference to the hypothesis it was derived from.

#![deny(unsafe_code)]

pub mod cell;
pub mod error;
pub mod hypothesis;
pub mod rule;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use cell::{known_values, unknown_indices, Cell};
pub use error::{TypesError, TypesResult};
pub use hypothesis::{DerivationKind, Hypothesis, HypothesisId};
pub use rule::{BlockKind, ElementProperty, RuleParameter, RuleRecord, ShapeKind, Sign};
