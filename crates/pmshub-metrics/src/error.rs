//! Error types for the metrics engine.
//!
//! Expected shortfalls (too few observations, a solver that does not
//! converge) are normally reported as a [`MetricOutcome`](crate::MetricOutcome)
//! rather than an error. The variants below are for callers that insist on a
//! hard value, and for programmer errors such as unsorted input.

use thiserror::Error;

/// A specialized Result type for metric computations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors raised by the metrics engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// Not enough observations for the metric.
    #[error("insufficient data for {metric}: {reason}")]
    InsufficientData {
        /// Metric name.
        metric: String,
        /// What was missing.
        reason: String,
    },

    /// XIRR solver exhausted its budget.
    #[error("XIRR did not converge after {iterations} iterations (residual: {residual:.2e})")]
    NonConvergence {
        /// Iterations used.
        iterations: u32,
        /// Final |NPV|.
        residual: f64,
    },

    /// The metric is mathematically undefined for this series.
    #[error("{metric} is undefined: {reason}")]
    Undefined {
        /// Metric name.
        metric: String,
        /// Why it is undefined.
        reason: String,
    },

    /// Input has the wrong shape (unsorted dates, non-finite values, ...).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Error from the numerical layer.
    #[error("math error: {0}")]
    MathError(String),
}

impl MetricsError {
    /// Creates a malformed input error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput(reason.into())
    }
}

impl From<pmshub_math::MathError> for MetricsError {
    fn from(err: pmshub_math::MathError) -> Self {
        MetricsError::MathError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetricsError::NonConvergence {
            iterations: 100,
            residual: 1e-3,
        };
        assert!(err.to_string().contains("100 iterations"));

        let err = MetricsError::malformed("snapshot dates out of order");
        assert!(err.to_string().starts_with("malformed input"));
    }
}
