//! Error types for the loader.

use thiserror::Error;

/// A specialized Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while reading or normalizing source rows.
///
/// `Validation` and `TypeCoercion` are per-row: they end up in the rejection
/// report and never abort a load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// A required field is missing or blank.
    #[error("row {row}: {field}: {reason}")]
    Validation {
        /// Row identifier.
        row: String,
        /// Canonical field name.
        field: String,
        /// What is wrong.
        reason: String,
    },

    /// A field could not be parsed to its semantic type.
    #[error("row {row}: {field}: cannot read '{value}' as {expected}")]
    TypeCoercion {
        /// Row identifier.
        row: String,
        /// Canonical field name.
        field: String,
        /// Offending raw value.
        value: String,
        /// Expected type.
        expected: String,
    },

    /// File could not be opened or read.
    #[error("I/O error: {0}")]
    Io(String),

    /// File contents are not well-formed CSV or JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Error from the data model.
    #[error("data model error: {0}")]
    Core(String),
}

impl LoadError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(row: impl Into<String>, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            row: row.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a type coercion error.
    #[must_use]
    pub fn coercion(
        row: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::TypeCoercion {
            row: row.into(),
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// True for errors that reject a single row.
    #[must_use]
    pub fn is_row_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::TypeCoercion { .. })
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            Self::Io(err.to_string())
        } else {
            Self::Parse(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<pmshub_core::CoreError> for LoadError {
    fn from(err: pmshub_core::CoreError) -> Self {
        Self::Core(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = LoadError::coercion("upload.csv:4", "aum", "abc", "decimal amount");
        assert_eq!(err.to_string(), "row upload.csv:4: aum: cannot read 'abc' as decimal amount");
        assert!(err.is_row_error());
        assert!(!LoadError::Io("gone".into()).is_row_error());
    }
}
