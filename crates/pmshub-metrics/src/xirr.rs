//! Extended internal rate of return over irregularly dated cashflows.
//!
//! Flows are signed from the investor's side: money paid into the portfolio
//! is negative, money received (including the terminal valuation) is
//! positive. Time is measured in days / 365 from the earliest flow.

use pmshub_core::Date;
use pmshub_math::solvers::hybrid;
use pmshub_math::MathError;

use crate::config::XirrConfig;
use crate::result::{ComputationWindow, MetricOutcome};
use crate::series::{FlowPoint, ValuePoint};

const DAYS_PER_YEAR: f64 = 365.0;

/// XIRR from the configured initial guess.
///
/// # Example
///
/// ```rust
/// use pmshub_core::Date;
/// use pmshub_metrics::config::XirrConfig;
/// use pmshub_metrics::xirr::xirr;
///
/// let t0 = Date::from_ymd(2023, 1, 1).unwrap();
/// let flows = [(t0, -1000.0), (t0.add_days(365), 1100.0)];
///
/// let rate = xirr(&flows, &XirrConfig::default()).as_value().unwrap();
/// assert!((rate - 0.10).abs() < 1e-6);
/// ```
#[must_use]
pub fn xirr(flows: &[(Date, f64)], config: &XirrConfig) -> MetricOutcome {
    xirr_with_guess(flows, config.initial_guess, config)
}

/// XIRR starting Newton-Raphson from `guess`.
///
/// Falls back to bisection over the configured bounds; if that also fails
/// the outcome is [`MetricOutcome::NonConvergent`].
#[must_use]
pub fn xirr_with_guess(flows: &[(Date, f64)], guess: f64, config: &XirrConfig) -> MetricOutcome {
    if flows.len() < 2 {
        return MetricOutcome::insufficient(format!("XIRR needs two cashflows, have {}", flows.len()));
    }
    if !flows.iter().any(|(_, a)| *a > 0.0) || !flows.iter().any(|(_, a)| *a < 0.0) {
        return MetricOutcome::insufficient("XIRR needs at least one inflow and one outflow");
    }

    let mut sorted = flows.to_vec();
    sorted.sort_by_key(|(d, _)| *d);
    let (start, end) = (sorted[0].0, sorted[sorted.len() - 1].0);
    if start == end {
        return MetricOutcome::insufficient("all cashflows fall on one date");
    }

    let timed: Vec<(f64, f64)> = sorted
        .iter()
        .map(|(d, a)| (start.days_between(d) as f64 / DAYS_PER_YEAR, *a))
        .collect();
    let npv = |r: f64| -> f64 { timed.iter().map(|(t, a)| a * (1.0 + r).powf(-t)).sum() };
    let d_npv = |r: f64| -> f64 {
        timed
            .iter()
            .map(|(t, a)| -t * a * (1.0 + r).powf(-t - 1.0))
            .sum()
    };

    match hybrid(npv, d_npv, guess, Some(config.bounds()), &config.solver()) {
        Ok(result) => {
            log::debug!(
                "XIRR {start}..{end}: {:.6} after {} iterations (residual {:.2e})",
                result.root,
                result.iterations,
                result.residual
            );
            MetricOutcome::value(result.root, ComputationWindow::new(start, end, sorted.len()))
        }
        Err(MathError::ConvergenceFailed {
            iterations,
            residual,
        }) => MetricOutcome::NonConvergent {
            iterations,
            residual,
        },
        Err(MathError::InvalidBracket { fa, fb, .. }) => MetricOutcome::NonConvergent {
            iterations: config.max_iterations,
            residual: fa.abs().min(fb.abs()),
        },
        Err(err) => {
            log::debug!("XIRR solver error: {err}");
            MetricOutcome::NonConvergent {
                iterations: config.max_iterations,
                residual: npv(guess).abs(),
            }
        }
    }
}

/// Investor-signed cashflows for a valuation series.
///
/// Each portfolio cashflow is negated. The last valuation is appended as a
/// terminal inflow. When no cashflow is dated on or before the first
/// valuation, the first valuation is treated as the opening investment.
/// Cashflows after the last valuation are ignored.
#[must_use]
pub fn investor_flows(values: &[ValuePoint], flows: &[FlowPoint]) -> Vec<(Date, f64)> {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Vec::new();
    };
    let funded_by_flows = flows.iter().any(|f| f.date <= first.date);

    let mut out = Vec::with_capacity(flows.len() + 2);
    if !funded_by_flows {
        out.push((first.date, -first.value));
    }
    out.extend(
        flows
            .iter()
            .filter(|f| f.date <= last.date && (funded_by_flows || f.date > first.date))
            .map(|f| (f.date, -f.amount)),
    );
    out.push((last.date, last.value));
    out
}

/// XIRR of a valuation series, retrying configured seeds on non-convergence.
#[must_use]
pub fn xirr_of_series(values: &[ValuePoint], flows: &[FlowPoint], config: &XirrConfig) -> MetricOutcome {
    if values.is_empty() {
        return MetricOutcome::insufficient("XIRR needs a terminal valuation");
    }
    let investor = investor_flows(values, flows);
    let mut outcome = xirr(&investor, config);
    for &guess in &config.retry_guesses {
        if !matches!(outcome, MetricOutcome::NonConvergent { .. }) {
            break;
        }
        log::debug!("XIRR retry from {guess}");
        outcome = xirr_with_guess(&investor, guess, config);
    }
    if let MetricOutcome::NonConvergent { iterations, residual } = outcome {
        log::warn!("XIRR did not converge after {iterations} iterations (residual {residual:.2e})");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_simple_ten_percent() {
        let t0 = date(2023, 1, 1);
        let flows = [(t0, -1000.0), (t0.add_days(365), 1100.0)];
        let outcome = xirr(&flows, &XirrConfig::default());
        assert_relative_eq!(outcome.as_value().unwrap(), 0.10, epsilon = 1e-6);
        assert_eq!(outcome.window().unwrap().observations, 2);
    }

    #[test]
    fn test_multiple_flows_recovers_rate() {
        let rate: f64 = 0.18;
        let t0 = date(2021, 3, 15);
        let offsets = [0i64, 45, 200, 410];
        let mut flows: Vec<(Date, f64)> = offsets
            .iter()
            .map(|&o| (t0.add_days(o), -10_000.0))
            .collect();
        let end = t0.add_days(900);
        let terminal: f64 = offsets
            .iter()
            .map(|&o| 10_000.0 * (1.0 + rate).powf((900 - o) as f64 / 365.0))
            .sum();
        flows.push((end, terminal));

        let outcome = xirr(&flows, &XirrConfig::default());
        assert_relative_eq!(outcome.as_value().unwrap(), rate, epsilon = 1e-4);
    }

    #[test]
    fn test_unsorted_input() {
        let t0 = date(2023, 1, 1);
        let flows = [(t0.add_days(365), 1100.0), (t0, -1000.0)];
        assert_relative_eq!(xirr(&flows, &XirrConfig::default()).as_value().unwrap(), 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_return() {
        let t0 = date(2023, 1, 1);
        let flows = [(t0, -1000.0), (t0.add_days(365), 700.0)];
        assert_relative_eq!(xirr(&flows, &XirrConfig::default()).as_value().unwrap(), -0.30, epsilon = 1e-6);
    }

    #[test]
    fn test_same_sign_is_insufficient() {
        let t0 = date(2023, 1, 1);
        let flows = [(t0, -1000.0), (t0.add_days(30), -1000.0)];
        assert!(matches!(
            xirr(&flows, &XirrConfig::default()),
            MetricOutcome::InsufficientData { .. }
        ));
    }

    #[test]
    fn test_rate_outside_bounds_is_non_convergent() {
        // 10x in one month: annualized rate far above the upper bound.
        let t0 = date(2023, 1, 1);
        let flows = [(t0, -100.0), (t0.add_days(30), 1000.0)];
        assert!(matches!(
            xirr(&flows, &XirrConfig::default()),
            MetricOutcome::NonConvergent { .. }
        ));
    }

    #[test]
    fn test_investor_flows_seed_opening_value() {
        let values = [
            ValuePoint { date: date(2023, 1, 1), value: 1000.0 },
            ValuePoint { date: date(2024, 1, 1), value: 1200.0 },
        ];
        let flows = [FlowPoint { date: date(2023, 6, 1), amount: 100.0 }];
        let investor = investor_flows(&values, &flows);
        assert_eq!(
            investor,
            vec![
                (date(2023, 1, 1), -1000.0),
                (date(2023, 6, 1), -100.0),
                (date(2024, 1, 1), 1200.0),
            ]
        );
    }

    #[test]
    fn test_investor_flows_funded_by_events() {
        let values = [
            ValuePoint { date: date(2023, 1, 1), value: 1000.0 },
            ValuePoint { date: date(2024, 1, 1), value: 1200.0 },
        ];
        let flows = [
            FlowPoint { date: date(2023, 1, 1), amount: 1000.0 },
            FlowPoint { date: date(2024, 6, 1), amount: 500.0 },
        ];
        let investor = investor_flows(&values, &flows);
        assert_eq!(investor, vec![(date(2023, 1, 1), -1000.0), (date(2024, 1, 1), 1200.0)]);
    }
}
