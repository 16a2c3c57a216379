//! Error types for the filterbank engine

use thiserror::Error;

/// Result type alias for filterbank operations
pub type FilterbankResult<T> = Result<T, FilterbankError>;

/// Errors that can occur while building or applying a filterbank
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterbankError {
    /// Malformed construction parameter, negative or unordered frequency list
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Supplied matrix, spectrum or buffer does not match the filterbank shape
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked
        what: &'static str,
        /// Expected dimension (rendered)
        expected: String,
        /// Supplied dimension (rendered)
        actual: String,
    },
}

impl FilterbankError {
    /// Shorthand for a length mismatch on a one-dimensional input
    pub(crate) fn length(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Shorthand for a `(rows, cols)` mismatch
    pub(crate) fn shape(
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: format!("{} x {}", expected.0, expected.1),
            actual: format!("{} x {}", actual.0, actual.1),
        }
    }
}
