//! Metrics engine settings.

use serde::{Deserialize, Serialize};

use pmshub_core::YearBasis;
use pmshub_math::solvers::SolverConfig;

/// Settings for the XIRR root finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XirrConfig {
    /// Newton-Raphson starting rate.
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,

    /// Convergence tolerance on |NPV| and on the step size.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Iteration budget per solve.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Lowest admissible rate.
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f64,

    /// Highest admissible rate.
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,

    /// Further starting rates tried, in order, after a non-convergent solve.
    #[serde(default)]
    pub retry_guesses: Vec<f64>,
}

fn default_initial_guess() -> f64 {
    0.1
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> u32 {
    100
}

fn default_lower_bound() -> f64 {
    -0.99
}

fn default_upper_bound() -> f64 {
    10.0
}

impl Default for XirrConfig {
    fn default() -> Self {
        Self {
            initial_guess: default_initial_guess(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            lower_bound: default_lower_bound(),
            upper_bound: default_upper_bound(),
            retry_guesses: Vec::new(),
        }
    }
}

impl XirrConfig {
    /// Solver settings derived from this configuration.
    #[must_use]
    pub fn solver(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }

    /// Admissible rate interval.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower_bound, self.upper_bound)
    }
}

/// Settings shared by every metric computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Annual risk-free rate used by Sharpe and Sortino.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Return periods per year used for annualization.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,

    /// Derive periods per year from the mean snapshot spacing instead.
    #[serde(default)]
    pub infer_frequency: bool,

    /// Year basis for CAGR.
    #[serde(default)]
    pub year_basis: YearBasis,

    /// XIRR solver settings.
    #[serde(default)]
    pub xirr: XirrConfig,
}

fn default_risk_free_rate() -> f64 {
    0.06
}

fn default_periods_per_year() -> u32 {
    12
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            periods_per_year: default_periods_per_year(),
            infer_frequency: false,
            year_basis: YearBasis::default(),
            xirr: XirrConfig::default(),
        }
    }
}

impl MetricsConfig {
    /// Sets the risk-free rate.
    #[must_use]
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Sets the number of periods per year.
    #[must_use]
    pub fn with_periods_per_year(mut self, periods: u32) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// Sets the CAGR year basis.
    #[must_use]
    pub fn with_year_basis(mut self, basis: YearBasis) -> Self {
        self.year_basis = basis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetricsConfig::default();
        assert_eq!(config.risk_free_rate, 0.06);
        assert_eq!(config.periods_per_year, 12);
        assert_eq!(config.xirr.max_iterations, 100);
        assert_eq!(config.xirr.bounds(), (-0.99, 10.0));
        assert_eq!(config.year_basis, YearBasis::Anniversary);
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: MetricsConfig =
            serde_json::from_str(r#"{"risk_free_rate": 0.05, "xirr": {"tolerance": 1e-8}}"#)
                .unwrap();
        assert_eq!(config.risk_free_rate, 0.05);
        assert_eq!(config.periods_per_year, 12);
        assert_eq!(config.xirr.tolerance, 1e-8);
        assert_eq!(config.xirr.initial_guess, 0.1);
    }
}
