//! Periodic returns and benchmark alignment.

use serde::{Deserialize, Serialize};

use pmshub_core::year_basis::DAYS_PER_YEAR;
use pmshub_core::{BenchmarkSeries, Date};

use crate::result::ComputationWindow;
use crate::series::{FlowPoint, ValuePoint};

/// Return over one valuation interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    /// Interval start (previous valuation).
    pub start: Date,
    /// Interval end (this valuation).
    pub end: Date,
    /// Flow-adjusted simple return.
    pub value: f64,
}

/// Flow-adjusted returns between consecutive valuations.
///
/// `r = (V_t - V_{t-1} - F) / V_{t-1}` where `F` is the net cashflow dated
/// after the previous valuation and on or before this one. Intervals that
/// start from a non-positive value are skipped.
#[must_use]
pub fn periodic_returns(values: &[ValuePoint], flows: &[FlowPoint]) -> Vec<PeriodReturn> {
    values
        .windows(2)
        .filter_map(|w| {
            let (prev, cur) = (w[0], w[1]);
            if prev.value <= 0.0 {
                log::debug!("skipping period {} -> {}: opening value {}", prev.date, cur.date, prev.value);
                return None;
            }
            let net_flow: f64 = flows
                .iter()
                .filter(|f| f.date > prev.date && f.date <= cur.date)
                .map(|f| f.amount)
                .sum();
            Some(PeriodReturn {
                start: prev.date,
                end: cur.date,
                value: (cur.value - prev.value - net_flow) / prev.value,
            })
        })
        .collect()
}

/// Window spanned by a run of period returns.
#[must_use]
pub fn returns_window(returns: &[PeriodReturn]) -> Option<ComputationWindow> {
    let (first, last) = (returns.first()?, returns.last()?);
    Some(ComputationWindow::new(first.start, last.end, returns.len()))
}

/// Portfolio and benchmark returns over the same intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedReturns {
    /// Portfolio returns.
    pub portfolio: Vec<f64>,
    /// Benchmark returns over the same intervals.
    pub benchmark: Vec<f64>,
    /// Intervals kept.
    pub periods: Vec<PeriodReturn>,
}

impl AlignedReturns {
    /// Number of aligned intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.portfolio.len()
    }

    /// True if nothing aligned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty()
    }

    /// Window covered by the aligned intervals.
    #[must_use]
    pub fn window(&self) -> Option<ComputationWindow> {
        returns_window(&self.periods)
    }

    /// Portfolio minus benchmark, per interval.
    #[must_use]
    pub fn active(&self) -> Vec<f64> {
        self.portfolio
            .iter()
            .zip(&self.benchmark)
            .map(|(p, b)| p - b)
            .collect()
    }
}

/// Pairs each portfolio return with the benchmark return over the same
/// interval, using as-of benchmark levels at both ends.
///
/// Intervals whose start predates the benchmark are dropped.
#[must_use]
pub fn align_with_benchmark(returns: &[PeriodReturn], benchmark: &BenchmarkSeries) -> AlignedReturns {
    let mut aligned = AlignedReturns::default();
    for period in returns {
        let (Some(open), Some(close)) = (
            benchmark.level_as_of(period.start),
            benchmark.level_as_of(period.end),
        ) else {
            continue;
        };
        aligned.portfolio.push(period.value);
        aligned.benchmark.push(close / open - 1.0);
        aligned.periods.push(*period);
    }
    aligned
}

/// Periods per year implied by a mean valuation spacing.
#[must_use]
pub fn infer_periods_per_year(mean_spacing_days: f64) -> u32 {
    if !mean_spacing_days.is_finite() || mean_spacing_days <= 0.0 {
        return 1;
    }
    (DAYS_PER_YEAR / mean_spacing_days).round().clamp(1.0, 366.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn vp(d: Date, value: f64) -> ValuePoint {
        ValuePoint { date: d, value }
    }

    #[test]
    fn test_returns_without_flows() {
        let values = [vp(date(2024, 1, 31), 100.0), vp(date(2024, 2, 29), 110.0), vp(date(2024, 3, 31), 99.0)];
        let r = periodic_returns(&values, &[]);
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0].value, 0.10, epsilon = 1e-12);
        assert_relative_eq!(r[1].value, -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_strip_contributions() {
        let values = [vp(date(2024, 1, 31), 100.0), vp(date(2024, 2, 29), 160.0)];
        let flows = [
            FlowPoint { date: date(2024, 1, 31), amount: 1000.0 }, // on the opening date: excluded
            FlowPoint { date: date(2024, 2, 15), amount: 50.0 },
        ];
        let r = periodic_returns(&values, &flows);
        assert_relative_eq!(r[0].value, 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_skip_zero_opening_value() {
        let values = [vp(date(2024, 1, 31), 0.0), vp(date(2024, 2, 29), 100.0), vp(date(2024, 3, 31), 105.0)];
        let r = periodic_returns(&values, &[]);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].start, date(2024, 2, 29));
    }

    #[test]
    fn test_align_uses_as_of_levels() {
        let bench = BenchmarkSeries::new(
            "IDX",
            vec![(date(2024, 1, 30), 100.0), (date(2024, 2, 28), 105.0)],
        )
        .unwrap();
        let returns = [
            PeriodReturn { start: date(2024, 1, 1), end: date(2024, 1, 31), value: 0.01 },
            PeriodReturn { start: date(2024, 1, 31), end: date(2024, 2, 29), value: 0.02 },
        ];
        let aligned = align_with_benchmark(&returns, &bench);
        assert_eq!(aligned.len(), 1);
        assert_relative_eq!(aligned.benchmark[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(aligned.active()[0], -0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_infer_periods_per_year() {
        assert_eq!(infer_periods_per_year(30.4), 12);
        assert_eq!(infer_periods_per_year(91.0), 4);
        assert_eq!(infer_periods_per_year(1.0), 365);
        assert_eq!(infer_periods_per_year(0.0), 1);
    }
}
