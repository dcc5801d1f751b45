//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Invalid amount.
    #[error("Invalid amount: {0}. Use a plain number such as 5000000.")]
    InvalidAmount(String),

    /// Unknown client id.
    #[error("Unknown client: {0}")]
    UnknownClient(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
