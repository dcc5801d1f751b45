//! Hybrid root-finding: Newton-Raphson with a bisection safety net.

use crate::error::{MathError, MathResult};
use crate::solvers::{bisection, newton_raphson, SolverConfig, SolverResult};

/// Hybrid root-finding algorithm.
///
/// 1. Run Newton-Raphson from `initial_guess`, confined to `bounds` if given
/// 2. If Newton fails for any reason, bisect over `bounds`
/// 3. Without bounds, search for a bracket by expanding around the guess
///
/// The reported iteration count covers both phases.
///
/// # Example
///
/// ```rust
/// use pmshub_math::solvers::{hybrid, SolverConfig};
///
/// let f = |x: f64| x * x * x - x - 2.0;
/// let df = |x: f64| 3.0 * x * x - 1.0;
///
/// let result = hybrid(f, df, 1.5, Some((1.0, 2.0)), &SolverConfig::default()).unwrap();
/// assert!(f(result.root).abs() < 1e-9);
/// ```
pub fn hybrid<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let newton_error = match newton_raphson(&f, &df, initial_guess, bounds, config) {
        Ok(result) => return Ok(result),
        Err(err) => err,
    };
    let newton_iterations = match newton_error {
        MathError::ConvergenceFailed { iterations, .. } => iterations,
        _ => 0,
    };
    log::debug!("Newton-Raphson failed from {initial_guess} ({newton_error}); bisecting");

    let (a, b) = match bounds {
        Some(bounds) => bounds,
        None => find_bracket(&f, initial_guess).ok_or(newton_error)?,
    };

    match bisection(&f, a, b, config) {
        Ok(mut result) => {
            result.iterations += newton_iterations;
            Ok(result)
        }
        Err(MathError::ConvergenceFailed {
            iterations,
            residual,
        }) => Err(MathError::convergence_failed(
            iterations + newton_iterations,
            residual,
        )),
        Err(err) => Err(err),
    }
}

/// Expands symmetrically around `initial_guess` until a sign change appears.
fn find_bracket<F>(f: &F, initial_guess: f64) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let f_init = f(initial_guess);
    let mut delta = 0.1;

    for _ in 0..50 {
        let left = initial_guess - delta;
        let right = initial_guess + delta;

        if f(left) * f_init < 0.0 {
            return Some((left, initial_guess));
        }
        if f(right) * f_init < 0.0 {
            return Some((initial_guess, right));
        }

        delta *= 2.0;
        if delta > 1e6 {
            break;
        }
    }

    None
}
