//! Error types for the match operations

use thiserror::Error;

/// Errors raised by the adjacency match engine and its operations
///
/// All of these are fatal at call time: either the full match table is
/// produced or the call fails outright, never a partial result.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A structurally required argument (group keys, target column) was
    /// not supplied or does not name a column of the table
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Caller-supplied extraction pattern failed to compile
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Column values are not of the kind the operation expects
    #[error("Type mismatch in column `{column}`: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Result type for match operations
pub type MatchResult<T> = Result<T, MatchError>;
