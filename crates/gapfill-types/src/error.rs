//! Error types for building hypotheses and parsing test kinds.

use thiserror::Error;

/// Errors raised at the data-model boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    /// A test name that matches no known test kind.
    #[error("unknown test kind: {0}")]
    UnknownTestKind(String),

    /// The input sequence has no elements.
    #[error("series is empty")]
    EmptySeries,

    /// A masked position does not index into the sequence.
    #[error("unknown position {index} out of range for series of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A known input value is NaN or infinite.
    #[error("value at position {index} is not finite")]
    NonFiniteValue { index: usize },
}

/// Result type for data-model operations.
pub type TypesResult<T> = Result<T, TypesError>;
