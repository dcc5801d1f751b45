//! Return-based risk and risk-adjusted metrics.
//!
//! All inputs are periodic returns; annualization multiplies by
//! `sqrt(periods_per_year)` for dispersion measures and ratios.

use pmshub_math::stats::{downside_deviation, linear_regression, mean, sample_std_dev};
use pmshub_math::MathError;

use crate::result::{ComputationWindow, MetricOutcome};
use crate::returns::{returns_window, AlignedReturns, PeriodReturn};

/// Standard deviations below this are treated as zero.
const MIN_DISPERSION: f64 = 1e-12;

fn window_or_insufficient(
    returns: &[PeriodReturn],
    metric: &str,
) -> Result<ComputationWindow, MetricOutcome> {
    match returns_window(returns) {
        Some(window) if returns.len() >= 2 => Ok(window),
        _ => Err(MetricOutcome::insufficient(format!(
            "{metric} needs two return periods, have {}",
            returns.len()
        ))),
    }
}

fn math_outcome(metric: &str, err: &MathError) -> MetricOutcome {
    match err {
        MathError::InsufficientData { required, actual } => MetricOutcome::insufficient(format!(
            "{metric} needs {required} observations, have {actual}"
        )),
        MathError::DivisionByZero { .. } => {
            MetricOutcome::undefined(format!("{metric}: zero variance"))
        }
        other => MetricOutcome::undefined(format!("{metric}: {other}")),
    }
}

fn values(returns: &[PeriodReturn]) -> Vec<f64> {
    returns.iter().map(|r| r.value).collect()
}

/// Annualized sample standard deviation of returns.
#[must_use]
pub fn volatility(returns: &[PeriodReturn], periods_per_year: u32) -> MetricOutcome {
    let window = match window_or_insufficient(returns, "volatility") {
        Ok(w) => w,
        Err(outcome) => return outcome,
    };
    match sample_std_dev(&values(returns)) {
        Ok(sd) => MetricOutcome::value(sd * f64::from(periods_per_year).sqrt(), window),
        Err(e) => math_outcome("volatility", &e),
    }
}

/// Sharpe ratio: `(mean(r) - rf / ppy) / sd(r) * sqrt(ppy)`.
///
/// Undefined when the returns have zero dispersion.
#[must_use]
pub fn sharpe(returns: &[PeriodReturn], risk_free_rate: f64, periods_per_year: u32) -> MetricOutcome {
    let window = match window_or_insufficient(returns, "Sharpe") {
        Ok(w) => w,
        Err(outcome) => return outcome,
    };
    let xs = values(returns);
    let ppy = f64::from(periods_per_year);
    let (avg, sd) = match (mean(&xs), sample_std_dev(&xs)) {
        (Ok(m), Ok(s)) => (m, s),
        (Err(e), _) | (_, Err(e)) => return math_outcome("Sharpe", &e),
    };
    if sd < MIN_DISPERSION {
        return MetricOutcome::undefined("Sharpe: returns have zero variance");
    }
    MetricOutcome::value((avg - risk_free_rate / ppy) / sd * ppy.sqrt(), window)
}

/// Sortino ratio: excess return over downside deviation below `rf / ppy`.
#[must_use]
pub fn sortino(returns: &[PeriodReturn], risk_free_rate: f64, periods_per_year: u32) -> MetricOutcome {
    let window = match window_or_insufficient(returns, "Sortino") {
        Ok(w) => w,
        Err(outcome) => return outcome,
    };
    let xs = values(returns);
    let ppy = f64::from(periods_per_year);
    let target = risk_free_rate / ppy;
    let (avg, dd) = match (mean(&xs), downside_deviation(&xs, target)) {
        (Ok(m), Ok(d)) => (m, d),
        (Err(e), _) | (_, Err(e)) => return math_outcome("Sortino", &e),
    };
    if dd < MIN_DISPERSION {
        return MetricOutcome::undefined("Sortino: no returns below the risk-free rate");
    }
    MetricOutcome::value((avg - target) / dd * ppy.sqrt(), window)
}

/// Alpha and beta of portfolio returns regressed on benchmark returns.
///
/// Beta is `cov(r, b) / var(b)`; alpha is the per-period intercept
/// `mean(r) - beta * mean(b)`. Returns `(alpha, beta)`.
#[must_use]
pub fn alpha_beta(aligned: &AlignedReturns) -> (MetricOutcome, MetricOutcome) {
    let Some(window) = aligned.window().filter(|_| aligned.len() >= 2) else {
        let outcome = MetricOutcome::insufficient(format!(
            "alpha/beta need two aligned periods, have {}",
            aligned.len()
        ));
        return (outcome.clone(), outcome);
    };
    match linear_regression(&aligned.benchmark, &aligned.portfolio) {
        Ok(fit) => {
            log::debug!(
                "regression over {} periods: beta {:.6}, alpha {:.6}, r2 {:.4}",
                fit.observations,
                fit.slope,
                fit.intercept,
                fit.r_squared
            );
            (
                MetricOutcome::value(fit.intercept, window),
                MetricOutcome::value(fit.slope, window),
            )
        }
        Err(MathError::DivisionByZero { .. }) => {
            let outcome = MetricOutcome::undefined("benchmark returns have zero variance");
            (outcome.clone(), outcome)
        }
        Err(e) => {
            let outcome = math_outcome("alpha/beta", &e);
            (outcome.clone(), outcome)
        }
    }
}

/// Annualized standard deviation of active returns.
#[must_use]
pub fn tracking_error(aligned: &AlignedReturns, periods_per_year: u32) -> MetricOutcome {
    let Some(window) = aligned.window().filter(|_| aligned.len() >= 2) else {
        return MetricOutcome::insufficient(format!(
            "tracking error needs two aligned periods, have {}",
            aligned.len()
        ));
    };
    match sample_std_dev(&aligned.active()) {
        Ok(sd) => MetricOutcome::value(sd * f64::from(periods_per_year).sqrt(), window),
        Err(e) => math_outcome("tracking error", &e),
    }
}

/// Mean active return over its dispersion, annualized.
#[must_use]
pub fn information_ratio(aligned: &AlignedReturns, periods_per_year: u32) -> MetricOutcome {
    let Some(window) = aligned.window().filter(|_| aligned.len() >= 2) else {
        return MetricOutcome::insufficient(format!(
            "information ratio needs two aligned periods, have {}",
            aligned.len()
        ));
    };
    let active = aligned.active();
    let (avg, sd) = match (mean(&active), sample_std_dev(&active)) {
        (Ok(m), Ok(s)) => (m, s),
        (Err(e), _) | (_, Err(e)) => return math_outcome("information ratio", &e),
    };
    if sd < MIN_DISPERSION {
        return MetricOutcome::undefined("information ratio: zero tracking error");
    }
    MetricOutcome::value(avg / sd * f64::from(periods_per_year).sqrt(), window)
}

/// Calmar ratio: CAGR over the magnitude of the maximum drawdown.
///
/// Shortfalls in either input carry through unchanged.
#[must_use]
pub fn calmar(cagr: &MetricOutcome, max_drawdown: &MetricOutcome) -> MetricOutcome {
    let (growth, window) = match cagr {
        MetricOutcome::Value { value, window } => (*value, *window),
        other => return other.clone(),
    };
    let drawdown = match max_drawdown {
        MetricOutcome::Value { value, .. } => value.abs(),
        other => return other.clone(),
    };
    if drawdown < MIN_DISPERSION {
        return MetricOutcome::undefined("Calmar: no drawdown");
    }
    MetricOutcome::value(growth / drawdown, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pmshub_core::Date;

    fn returns(values: &[f64]) -> Vec<PeriodReturn> {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| PeriodReturn {
                start: start.add_days(30 * i as i64),
                end: start.add_days(30 * (i as i64 + 1)),
                value: v,
            })
            .collect()
    }

    fn aligned(portfolio: &[f64], benchmark: &[f64]) -> AlignedReturns {
        AlignedReturns {
            portfolio: portfolio.to_vec(),
            benchmark: benchmark.to_vec(),
            periods: returns(portfolio),
        }
    }

    #[test]
    fn test_sharpe_known_value() {
        let r = returns(&[0.01, 0.03]);
        // mean 0.02, sd sqrt(2e-4), rf/ppy 0.005
        let expected = 0.015 / 2e-4f64.sqrt() * 12f64.sqrt();
        assert_relative_eq!(sharpe(&r, 0.06, 12).as_value().unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_sharpe_zero_variance_undefined() {
        let r = returns(&[0.01, 0.01, 0.01]);
        assert!(matches!(sharpe(&r, 0.06, 12), MetricOutcome::Undefined { .. }));
    }

    #[test]
    fn test_sharpe_single_period_insufficient() {
        let r = returns(&[0.01]);
        assert!(matches!(sharpe(&r, 0.06, 12), MetricOutcome::InsufficientData { .. }));
    }

    #[test]
    fn test_volatility_annualized() {
        let r = returns(&[0.01, 0.03]);
        assert_relative_eq!(
            volatility(&r, 12).as_value().unwrap(),
            2e-4f64.sqrt() * 12f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sortino_only_penalizes_downside() {
        let r = returns(&[0.05, -0.02, 0.04]);
        let target = 0.06 / 12.0;
        let dd = (((-0.02 - target) as f64).powi(2) / 2.0).sqrt();
        let expected = ((0.05 - 0.02 + 0.04) / 3.0 - target) / dd * 12f64.sqrt();
        assert_relative_eq!(sortino(&r, 0.06, 12).as_value().unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_identical_returns_beta_one_alpha_zero() {
        let xs = [0.01, -0.02, 0.03, 0.015];
        let (alpha, beta) = alpha_beta(&aligned(&xs, &xs));
        assert_relative_eq!(beta.as_value().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(alpha.as_value().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_leveraged_returns() {
        let bench = [0.01, -0.02, 0.03];
        let port: Vec<f64> = bench.iter().map(|b| 0.001 + 2.0 * b).collect();
        let (alpha, beta) = alpha_beta(&aligned(&port, &bench));
        assert_relative_eq!(beta.as_value().unwrap(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(alpha.as_value().unwrap(), 0.001, epsilon = 1e-10);
    }

    #[test]
    fn test_alpha_beta_flat_benchmark_undefined() {
        let (alpha, beta) = alpha_beta(&aligned(&[0.01, 0.02], &[0.0, 0.0]));
        assert!(matches!(alpha, MetricOutcome::Undefined { .. }));
        assert!(matches!(beta, MetricOutcome::Undefined { .. }));
    }

    #[test]
    fn test_alpha_beta_one_period_insufficient() {
        let (_, beta) = alpha_beta(&aligned(&[0.01], &[0.02]));
        assert!(matches!(beta, MetricOutcome::InsufficientData { .. }));
    }

    #[test]
    fn test_tracking_error_and_ir() {
        let a = aligned(&[0.02, 0.04], &[0.01, 0.01]);
        let te = tracking_error(&a, 12).as_value().unwrap();
        assert_relative_eq!(te, 2e-4f64.sqrt() * 12f64.sqrt(), epsilon = 1e-12);
        let ir = information_ratio(&a, 12).as_value().unwrap();
        assert_relative_eq!(ir, 0.02 / 2e-4f64.sqrt() * 12f64.sqrt(), epsilon = 1e-10);

        let same = aligned(&[0.02, 0.04], &[0.02, 0.04]);
        assert!(matches!(information_ratio(&same, 12), MetricOutcome::Undefined { .. }));
    }

    #[test]
    fn test_calmar() {
        let d = Date::from_ymd(2024, 1, 1).unwrap();
        let w = ComputationWindow::new(d, d.add_days(365), 2);
        let c = calmar(&MetricOutcome::value(0.2, w), &MetricOutcome::value(-0.1, w));
        assert_relative_eq!(c.as_value().unwrap(), 2.0, epsilon = 1e-12);

        let flat = calmar(&MetricOutcome::value(0.2, w), &MetricOutcome::value(0.0, w));
        assert!(matches!(flat, MetricOutcome::Undefined { .. }));

        let short = calmar(&MetricOutcome::insufficient("x"), &MetricOutcome::value(-0.1, w));
        assert!(matches!(short, MetricOutcome::InsufficientData { .. }));
    }
}
