//! Root-finding algorithms.
//!
//! - [`newton_raphson`]: Quadratic convergence near the root; needs a derivative
//!   and may diverge from a poor starting point
//! - [`bisection`]: Slow but guaranteed once a sign change is bracketed
//! - [`hybrid`]: Newton-Raphson first, bisection when Newton diverges, stalls
//!   on a flat derivative, or leaves the admissible interval
//!
//! # Example: IRR of a two-flow investment
//!
//! ```rust
//! use pmshub_math::solvers::{hybrid, SolverConfig};
//!
//! // -100 today, +121 in two years
//! let npv = |r: f64| -100.0 + 121.0 / (1.0 + r).powi(2);
//! let d_npv = |r: f64| -242.0 / (1.0 + r).powi(3);
//!
//! let result = hybrid(npv, d_npv, 0.05, Some((-0.99, 10.0)), &SolverConfig::default()).unwrap();
//! assert!((result.root - 0.10).abs() < 1e-9);
//! ```

mod bisection;
mod hybrid;
mod newton;

pub use bisection::bisection;
pub use hybrid::hybrid;
pub use newton::newton_raphson;

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}
