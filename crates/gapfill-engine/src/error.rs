//! Error types for the search engine.

use gapfill_types::TypesError;
use thiserror::Error;

/// Errors that can occur while configuring or running a search.
///
/// None of these is raised from inside a running search: insufficient
/// evidence and degenerate numeric cases are ordinary "not confirmed"
/// results, and an exhausted depth bound is a regular outcome.
#[derive(Debug, Error)]
pub enum GapfillError {
    /// Invalid input at the hypothesis boundary (empty series, bad index, ...).
    #[error(transparent)]
    Input(#[from] TypesError),

    /// A configured test name that matches no test kind.
    #[error("unknown test kind: {0}")]
    UnknownTestKind(String),

    /// A supplied reference list is malformed.
    #[error("invalid reference list: {0}")]
    InvalidReferenceList(String),

    /// Reference list JSON could not be decoded.
    #[error("reference list decode failed: {0}")]
    ReferenceDecode(#[from] serde_json::Error),

    /// Inconsistent configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for engine operations.
pub type GapfillResult<T> = Result<T, GapfillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = GapfillError::UnknownTestKind("lucas".into());
        assert_eq!(err.to_string(), "unknown test kind: lucas");

        let err = GapfillError::InvalidReferenceList("4 is not prime".into());
        assert_eq!(err.to_string(), "invalid reference list: 4 is not prime");

        let err: GapfillError = TypesError::EmptySeries.into();
        assert_eq!(err.to_string(), "series is empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GapfillError>();
    }
}
