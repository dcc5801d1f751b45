//! Newton-Raphson root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Consecutive residual blow-ups tolerated before declaring divergence.
const MAX_DIVERGENT_STEPS: u32 = 3;

/// Newton-Raphson root-finding algorithm.
///
/// Uses the iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)`.
///
/// Converges when `|f(x)| < tolerance` or the step shrinks below `tolerance`.
/// When `domain` is given, an iterate outside `[min, max]` stops the search
/// with [`MathError::OutOfDomain`]. Three consecutive steps that more than
/// double the residual are reported as a convergence failure.
///
/// # Example
///
/// ```rust
/// use pmshub_math::solvers::{newton_raphson, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
/// let df = |x: f64| 2.0 * x;
///
/// let result = newton_raphson(f, df, 1.5, None, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn newton_raphson<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    domain: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut x = initial_guess;
    let mut prev_residual = f64::MAX;
    let mut divergent_steps = 0;

    for iteration in 0..config.max_iterations {
        let fx = f(x);
        let residual = fx.abs();

        if !fx.is_finite() {
            return Err(MathError::invalid_input(format!("f({x}) is not finite")));
        }

        if residual < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if residual > prev_residual * 2.0 {
            divergent_steps += 1;
            if divergent_steps >= MAX_DIVERGENT_STEPS {
                return Err(MathError::convergence_failed(iteration, residual));
            }
        } else {
            divergent_steps = 0;
        }
        prev_residual = residual;

        let dfx = df(x);
        if dfx.abs() < 1e-15 || !dfx.is_finite() {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx / dfx;
        x -= step;

        if !x.is_finite() {
            return Err(MathError::invalid_input("Newton produced non-finite value"));
        }
        if let Some((min, max)) = domain {
            if x < min || x > max {
                return Err(MathError::OutOfDomain { x, min, max });
            }
        }

        if step.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration + 1,
                residual: f(x),
            });
        }
    }

    Err(MathError::convergence_failed(
        config.max_iterations,
        f(x).abs(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;
        let df = |x: f64| 2.0 * x;

        let result = newton_raphson(f, df, 1.5, None, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
        assert!(result.iterations < 10);
    }

    #[test]
    fn test_zero_derivative() {
        let f = |x: f64| x * x + 1.0;
        let df = |x: f64| 2.0 * x;

        let result = newton_raphson(f, df, 0.0, None, &SolverConfig::default());
        assert!(matches!(result, Err(MathError::DivisionByZero { .. })));
    }

    #[test]
    fn test_leaves_domain() {
        // Root at 3, but starting left of the minimum of (x-1)^2 - 4 throws far left.
        let f = |x: f64| (x - 1.0) * (x - 1.0) - 4.0;
        let df = |x: f64| 2.0 * (x - 1.0);

        let result = newton_raphson(f, df, 0.9, Some((0.0, 5.0)), &SolverConfig::default());
        assert!(matches!(result, Err(MathError::OutOfDomain { .. })));
    }

    #[test]
    fn test_max_iterations() {
        // atan has a root at 0 but Newton diverges from |x| > ~1.39
        let f = |x: f64| x.atan();
        let df = |x: f64| 1.0 / (1.0 + x * x);

        let config = SolverConfig::default().with_max_iterations(50);
        assert!(newton_raphson(f, df, 2.0, None, &config).is_err());
    }
}
