//! Computes a set of metrics for one series in a single pass.

use pmshub_core::{BenchmarkSeries, Dataset};

use crate::cagr::cagr_of_series;
use crate::config::MetricsConfig;
use crate::drawdown::max_drawdown;
use crate::error::{MetricsError, MetricsResult};
use crate::hwm::high_water_mark;
use crate::kind::{MetricKind, MetricSet};
use crate::result::{MetricDetail, MetricOutcome, MetricResult};
use crate::returns::{align_with_benchmark, infer_periods_per_year, AlignedReturns, PeriodReturn};
use crate::risk;
use crate::series::ClientSeries;
use crate::xirr::xirr_of_series;

/// Computes every metric in `metrics` for `series`.
///
/// Results come back in the set's order. Shortfalls are reported per metric
/// as [`MetricOutcome`] values; only a malformed configuration is an error.
///
/// # Example
///
/// ```rust
/// use pmshub_core::{ClientId, Date};
/// use pmshub_metrics::prelude::*;
///
/// let d0 = Date::from_ymd(2020, 1, 1).unwrap();
/// let d1 = Date::from_ymd(2021, 1, 1).unwrap();
/// let series = ClientSeries::new(
///     Subject::Client(ClientId::new("C001")),
///     vec![ValuePoint { date: d0, value: 100.0 }, ValuePoint { date: d1, value: 120.0 }],
///     vec![],
/// )
/// .unwrap();
///
/// let metrics = MetricSet::new().with(MetricKind::Cagr).with(MetricKind::Beta);
/// let results = compute_metrics(&series, &metrics, None, &MetricsConfig::default()).unwrap();
///
/// assert!((results[0].outcome.as_value().unwrap() - 0.20).abs() < 1e-12);
/// assert!(!results[1].outcome.is_value()); // no benchmark
/// ```
pub fn compute_metrics(
    series: &ClientSeries,
    metrics: &MetricSet,
    benchmark: Option<&BenchmarkSeries>,
    config: &MetricsConfig,
) -> MetricsResult<Vec<MetricResult>> {
    if config.periods_per_year == 0 {
        return Err(MetricsError::malformed("periods_per_year must be positive"));
    }
    if !config.risk_free_rate.is_finite() {
        return Err(MetricsError::malformed("risk_free_rate must be finite"));
    }

    let ppy = if config.infer_frequency {
        series
            .mean_spacing_days()
            .map_or(config.periods_per_year, infer_periods_per_year)
    } else {
        config.periods_per_year
    };

    let mut ctx = Context {
        series,
        benchmark,
        config,
        ppy,
        returns: None,
        aligned: None,
    };

    let results = metrics
        .iter()
        .map(|kind| {
            let (outcome, detail) = ctx.compute(kind);
            let result = MetricResult::new(series.subject().clone(), kind, outcome);
            match detail {
                Some(detail) => result.with_detail(detail),
                None => result,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "{}: computed {} metrics at {ppy} periods/year",
        series.subject(),
        results.len()
    );
    Ok(results)
}

/// Computes `metrics` for every client in `dataset`, client by client.
pub fn compute_for_dataset(
    dataset: &Dataset,
    metrics: &MetricSet,
    benchmark: Option<&BenchmarkSeries>,
    config: &MetricsConfig,
) -> MetricsResult<Vec<MetricResult>> {
    let mut out = Vec::with_capacity(dataset.len() * metrics.len());
    for id in dataset.client_ids() {
        let series = ClientSeries::for_client(dataset, &id)?;
        out.extend(compute_metrics(&series, metrics, benchmark, config)?);
    }
    Ok(out)
}

struct Context<'a> {
    series: &'a ClientSeries,
    benchmark: Option<&'a BenchmarkSeries>,
    config: &'a MetricsConfig,
    ppy: u32,
    returns: Option<Vec<PeriodReturn>>,
    aligned: Option<Option<AlignedReturns>>,
}

impl Context<'_> {
    fn returns(&mut self) -> &[PeriodReturn] {
        let series = self.series;
        self.returns.get_or_insert_with(|| series.periodic_returns())
    }

    fn aligned(&mut self) -> Option<&AlignedReturns> {
        if self.aligned.is_none() {
            let benchmark = self.benchmark;
            let aligned = benchmark.map(|b| align_with_benchmark(self.returns(), b));
            self.aligned = Some(aligned);
        }
        self.aligned.as_ref().and_then(Option::as_ref)
    }

    fn compute(&mut self, kind: MetricKind) -> (MetricOutcome, Option<MetricDetail>) {
        let series = self.series;
        let values = series.values();
        let growth = series.growth_values();
        let rf = self.config.risk_free_rate;
        let ppy = self.ppy;

        match kind {
            MetricKind::Cagr => (cagr_of_series(growth, self.config.year_basis), None),
            MetricKind::Xirr => (
                xirr_of_series(values, series.flows(), &self.config.xirr),
                None,
            ),
            MetricKind::MaxDrawdown => {
                let (outcome, detail) = max_drawdown(growth);
                (outcome, detail.map(MetricDetail::Drawdown))
            }
            MetricKind::HighWaterMark => {
                let (outcome, detail) = high_water_mark(values);
                (outcome, detail.map(MetricDetail::HighWaterMark))
            }
            MetricKind::Calmar => {
                let annual = cagr_of_series(growth, self.config.year_basis);
                let (drawdown, _) = max_drawdown(growth);
                (risk::calmar(&annual, &drawdown), None)
            }
            MetricKind::Sharpe => (risk::sharpe(self.returns(), rf, ppy), None),
            MetricKind::Sortino => (risk::sortino(self.returns(), rf, ppy), None),
            MetricKind::Volatility => (risk::volatility(self.returns(), ppy), None),
            MetricKind::Alpha | MetricKind::Beta => {
                let Some(aligned) = self.aligned() else {
                    return (no_benchmark(kind), None);
                };
                let (alpha, beta) = risk::alpha_beta(aligned);
                (if kind == MetricKind::Alpha { alpha } else { beta }, None)
            }
            MetricKind::TrackingError => match self.aligned() {
                Some(aligned) => (risk::tracking_error(aligned, ppy), None),
                None => (no_benchmark(kind), None),
            },
            MetricKind::InformationRatio => match self.aligned() {
                Some(aligned) => (risk::information_ratio(aligned, ppy), None),
                None => (no_benchmark(kind), None),
            },
        }
    }
}

fn no_benchmark(kind: MetricKind) -> MetricOutcome {
    MetricOutcome::insufficient(format!("{kind} requires a benchmark series"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Subject;
    use crate::series::ValuePoint;
    use approx::assert_relative_eq;
    use pmshub_core::{ClientId, Date};

    fn series(values: &[f64]) -> ClientSeries {
        let start = Date::from_ymd(2023, 1, 31).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ValuePoint { date: start.add_months(i as i32).unwrap(), value: v })
            .collect();
        ClientSeries::new(Subject::Client(ClientId::new("C1")), points, vec![]).unwrap()
    }

    #[test]
    fn test_results_follow_set_order() {
        let s = series(&[100.0, 102.0, 99.0, 104.0]);
        let results = compute_metrics(&s, &MetricSet::all(), None, &MetricsConfig::default()).unwrap();
        let kinds: Vec<MetricKind> = results.iter().map(|r| r.metric).collect();
        assert_eq!(kinds, MetricSet::all().iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_single_snapshot_all_insufficient() {
        let s = series(&[100.0]);
        let results = compute_metrics(&s, &MetricSet::standard(), None, &MetricsConfig::default()).unwrap();
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, MetricOutcome::InsufficientData { .. })));
    }

    #[test]
    fn test_details_attached() {
        let s = series(&[100.0, 120.0, 90.0]);
        let metrics = MetricSet::new()
            .with(MetricKind::MaxDrawdown)
            .with(MetricKind::HighWaterMark);
        let results = compute_metrics(&s, &metrics, None, &MetricsConfig::default()).unwrap();
        assert!(matches!(results[0].detail, Some(MetricDetail::Drawdown(_))));
        assert!(matches!(results[1].detail, Some(MetricDetail::HighWaterMark(_))));
        assert_relative_eq!(results[0].outcome.as_value().unwrap(), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_benchmark_metrics_use_alignment() {
        let s = series(&[100.0, 101.0, 103.0, 102.0]);
        let levels = s.values().iter().map(|p| (p.date, p.value * 10.0)).collect();
        let bench = BenchmarkSeries::new("SAME", levels).unwrap();
        let metrics = MetricSet::new().with(MetricKind::Alpha).with(MetricKind::Beta);
        let results = compute_metrics(&s, &metrics, Some(&bench), &MetricsConfig::default()).unwrap();
        assert_relative_eq!(results[0].outcome.as_value().unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(results[1].outcome.as_value().unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_periods_per_year_rejected() {
        let s = series(&[100.0, 110.0]);
        let config = MetricsConfig::default().with_periods_per_year(0);
        let err = compute_metrics(&s, &MetricSet::standard(), None, &config).unwrap_err();
        assert!(matches!(err, MetricsError::MalformedInput(_)));
    }
}
