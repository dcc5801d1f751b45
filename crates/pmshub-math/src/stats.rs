//! Sample statistics over `f64` slices.
//!
//! Thin, checked wrappers around `statrs` so callers get a typed error
//! instead of a silent `NaN` when a sample is too short.

use statrs::statistics::Statistics;

use crate::error::{MathError, MathResult};

/// Arithmetic mean. Requires at least one value.
pub fn mean(values: &[f64]) -> MathResult<f64> {
    require(values, 1)?;
    Ok(values.iter().mean())
}

/// Unbiased sample variance (n - 1 denominator). Requires two values.
pub fn sample_variance(values: &[f64]) -> MathResult<f64> {
    require(values, 2)?;
    Ok(values.iter().variance())
}

/// Sample standard deviation (n - 1 denominator). Requires two values.
pub fn sample_std_dev(values: &[f64]) -> MathResult<f64> {
    require(values, 2)?;
    Ok(values.iter().std_dev())
}

/// Unbiased sample covariance of two equally long samples.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> MathResult<f64> {
    same_length(a, b)?;
    require(a, 2)?;
    Ok(a.iter().covariance(b.iter()))
}

/// Downside deviation below `threshold`, with an n - 1 denominator.
///
/// Observations at or above the threshold contribute zero.
pub fn downside_deviation(values: &[f64], threshold: f64) -> MathResult<f64> {
    require(values, 2)?;
    let sum_sq: f64 = values
        .iter()
        .map(|r| (r - threshold).min(0.0).powi(2))
        .sum();
    Ok((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Ordinary least squares fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionFit {
    /// Slope (beta when `x` is a benchmark).
    pub slope: f64,
    /// Intercept (per-period alpha when `x` is a benchmark).
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Number of paired observations.
    pub observations: usize,
}

/// Fits `y` on `x` by ordinary least squares.
///
/// # Errors
///
/// Fails with fewer than two pairs, unequal lengths, or a constant `x`
/// ([`MathError::DivisionByZero`]).
pub fn linear_regression(x: &[f64], y: &[f64]) -> MathResult<RegressionFit> {
    same_length(x, y)?;
    require(x, 2)?;

    let var_x = x.iter().variance();
    if var_x.abs() < 1e-15 {
        return Err(MathError::DivisionByZero { value: var_x });
    }
    let cov_xy = x.iter().covariance(y.iter());
    let slope = cov_xy / var_x;
    let intercept = y.iter().mean() - slope * x.iter().mean();

    let var_y = y.iter().variance();
    let r_squared = if var_y.abs() < 1e-15 {
        0.0
    } else {
        (cov_xy * cov_xy) / (var_x * var_y)
    };

    Ok(RegressionFit {
        slope,
        intercept,
        r_squared,
        observations: x.len(),
    })
}

fn require(values: &[f64], required: usize) -> MathResult<()> {
    if values.len() < required {
        return Err(MathError::insufficient_data(required, values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("sample contains non-finite values"));
    }
    Ok(())
}

fn same_length(a: &[f64], b: &[f64]) -> MathResult<()> {
    if a.len() != b.len() {
        return Err(MathError::invalid_input(format!(
            "samples differ in length: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let xs = [0.01, 0.02, 0.03, 0.04];
        assert_relative_eq!(mean(&xs).unwrap(), 0.025, epsilon = 1e-15);
        // sum of squared deviations = 5e-4, / 3
        assert_relative_eq!(sample_variance(&xs).unwrap(), 5e-4 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(
            sample_std_dev(&xs).unwrap(),
            (5e-4f64 / 3.0).sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_short_samples() {
        assert!(matches!(
            mean(&[]),
            Err(MathError::InsufficientData { required: 1, actual: 0 })
        ));
        assert!(sample_std_dev(&[0.1]).is_err());
        assert!(sample_covariance(&[0.1, 0.2], &[0.1]).is_err());
    }

    #[test]
    fn test_covariance() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert_relative_eq!(sample_covariance(&a, &b).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_downside_deviation() {
        let xs = [0.02, -0.01, 0.03, -0.03];
        // (0.01^2 + 0.03^2) / 3
        let expected = ((0.0001 + 0.0009) / 3.0f64).sqrt();
        assert_relative_eq!(downside_deviation(&xs, 0.0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_regression_exact_line() {
        let x = [0.01, 0.02, -0.01, 0.03];
        let y: Vec<f64> = x.iter().map(|v| 0.002 + 1.5 * v).collect();
        let fit = linear_regression(&x, &y).unwrap();
        assert_relative_eq!(fit.slope, 1.5, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 0.002, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert_eq!(fit.observations, 4);
    }

    #[test]
    fn test_regression_constant_x() {
        let fit = linear_regression(&[0.01, 0.01, 0.01], &[0.0, 0.1, 0.2]);
        assert!(matches!(fit, Err(MathError::DivisionByZero { .. })));
    }
}
