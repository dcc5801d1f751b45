//! Error types for filtering and aggregation.

use thiserror::Error;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while building filters or bucket schemes.
///
/// Evaluating a valid filter never fails; these only surface at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A predicate value does not fit the field's type.
    #[error("Type mismatch on '{field}': expected {expected}, got {value}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected value type.
        expected: String,
        /// Offending value.
        value: String,
    },

    /// A range predicate with bounds out of order.
    #[error("Invalid range on '{field}': {reason}")]
    InvalidRange {
        /// Field name.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Field name not recognized.
    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    /// Grouping key not recognized.
    #[error("Unknown grouping: {0}")]
    UnknownGrouping(String),

    /// AUM band edges that are empty, negative or not increasing.
    #[error("Invalid AUM bands: {0}")]
    InvalidBands(String),
}

impl FilterError {
    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            value: value.into(),
        }
    }

    /// Creates an invalid range error.
    #[must_use]
    pub fn invalid_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
