//! # PMS Hub Math
//!
//! Numerical utilities for the PMS Hub metrics engine.
//!
//! This crate provides:
//!
//! - **Solvers**: Root finding (Newton-Raphson, bisection, and a hybrid of the two)
//! - **Statistics**: Sample mean, variance, covariance, downside deviation
//!   and simple linear regression over `f64` slices
//!
//! Everything here is a pure function of its inputs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod solvers;
pub mod stats;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::solvers::{bisection, hybrid, newton_raphson, SolverConfig, SolverResult};
    pub use crate::stats::{
        downside_deviation, linear_regression, mean, sample_covariance,
        sample_std_dev, sample_variance, RegressionFit,
    };
}

pub use error::{MathError, MathResult};
