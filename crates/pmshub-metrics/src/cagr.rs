//! Compound annual growth rate.

use pmshub_core::{Date, YearBasis};

use crate::result::{ComputationWindow, MetricOutcome};
use crate::series::ValuePoint;

/// CAGR between two valuations: `(end / begin)^(1 / years) - 1`.
///
/// Insufficient data when `begin <= 0` or the span is not positive.
///
/// # Example
///
/// ```rust
/// use pmshub_core::{Date, YearBasis};
/// use pmshub_metrics::cagr::cagr;
///
/// let start = Date::from_ymd(2020, 1, 1).unwrap();
/// let end = Date::from_ymd(2021, 1, 1).unwrap();
///
/// let outcome = cagr(start, 100.0, end, 120.0, YearBasis::Anniversary);
/// assert!((outcome.as_value().unwrap() - 0.20).abs() < 1e-12);
/// ```
#[must_use]
pub fn cagr(start: Date, begin: f64, end: Date, ending: f64, basis: YearBasis) -> MetricOutcome {
    if begin <= 0.0 {
        return MetricOutcome::insufficient(format!("beginning value {begin} is not positive"));
    }
    let years = basis.year_fraction(start, end);
    if years <= 0.0 {
        return MetricOutcome::insufficient(format!("no elapsed time between {start} and {end}"));
    }
    if ending < 0.0 {
        return MetricOutcome::undefined(format!("ending value {ending} is negative"));
    }

    let value = (ending / begin).powf(1.0 / years) - 1.0;
    log::debug!("CAGR {start}..{end}: {years:.4} years ({basis}) -> {value:.6}");
    MetricOutcome::value(value, ComputationWindow::new(start, end, 2))
}

/// CAGR from the first to the last valuation of a series.
#[must_use]
pub fn cagr_of_series(values: &[ValuePoint], basis: YearBasis) -> MetricOutcome {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() >= 2 => {
            match cagr(first.date, first.value, last.date, last.value, basis) {
                MetricOutcome::Value { value, window } => MetricOutcome::value(
                    value,
                    ComputationWindow::new(window.start, window.end, values.len()),
                ),
                other => other,
            }
        }
        _ => MetricOutcome::insufficient(format!(
            "CAGR needs two valuations, have {}",
            values.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_one_year_twenty_percent() {
        let outcome = cagr(date(2020, 1, 1), 100.0, date(2021, 1, 1), 120.0, YearBasis::Anniversary);
        assert_relative_eq!(outcome.as_value().unwrap(), 0.20, epsilon = 1e-12);
        let window = outcome.window().unwrap();
        assert_eq!(window.start, date(2020, 1, 1));
        assert_eq!(window.end, date(2021, 1, 1));
    }

    #[test]
    fn test_actual_basis_differs_over_leap_year() {
        let outcome = cagr(date(2020, 1, 1), 100.0, date(2021, 1, 1), 120.0, YearBasis::Act36525);
        let years = 366.0 / 365.25;
        assert_relative_eq!(outcome.as_value().unwrap(), 1.2f64.powf(1.0 / years) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_holds() {
        let (start, end) = (date(2019, 4, 1), date(2024, 9, 15));
        let basis = YearBasis::Act36525;
        let value = cagr(start, 250.0, end, 410.0, basis).as_value().unwrap();
        let years = basis.year_fraction(start, end);
        assert_relative_eq!((1.0 + value).powf(years), 410.0 / 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_insufficient_cases() {
        let d = date(2020, 1, 1);
        assert!(matches!(
            cagr(d, 0.0, date(2021, 1, 1), 10.0, YearBasis::Anniversary),
            MetricOutcome::InsufficientData { .. }
        ));
        assert!(matches!(
            cagr(d, 100.0, d, 120.0, YearBasis::Anniversary),
            MetricOutcome::InsufficientData { .. }
        ));
        assert!(matches!(
            cagr_of_series(&[ValuePoint { date: d, value: 1.0 }], YearBasis::Anniversary),
            MetricOutcome::InsufficientData { .. }
        ));
    }

    #[test]
    fn test_total_loss() {
        let outcome = cagr(date(2020, 1, 1), 100.0, date(2022, 1, 1), 0.0, YearBasis::Anniversary);
        assert_relative_eq!(outcome.as_value().unwrap(), -1.0);
    }
}
