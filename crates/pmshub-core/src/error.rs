//! Error types for the PMS Hub data model.

use rust_decimal::Decimal;
use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or validating data model values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A field held a value the data model cannot accept.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Reason for invalidity.
        reason: String,
    },

    /// Two snapshots for the same client share a date.
    #[error("Duplicate snapshot for client {client_id} on {date}")]
    DuplicateSnapshot {
        /// Client identifier.
        client_id: String,
        /// Duplicated valuation date.
        date: String,
    },

    /// A benchmark series contains the same date twice.
    #[error("Duplicate benchmark point on {date}")]
    DuplicateBenchmarkPoint {
        /// Duplicated date.
        date: String,
    },

    /// Net corpus does not equal initial corpus + additions - withdrawals.
    #[error("Reconciliation mismatch for client {client_id} on {date}: expected {expected}, recorded {actual}")]
    Reconciliation {
        /// Client identifier.
        client_id: String,
        /// Snapshot date.
        date: String,
        /// Derived net corpus.
        expected: Decimal,
        /// Net corpus as recorded in the source.
        actual: Decimal,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
