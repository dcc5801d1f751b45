//! Metric identifiers and metric sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::MetricsError;

/// A metric the engine knows how to compute.
///
/// Declaration order is the order results are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Compound annual growth rate of AUM.
    #[serde(rename = "CAGR")]
    Cagr,
    /// Money-weighted return over dated cashflows.
    #[serde(rename = "XIRR")]
    Xirr,
    /// Regression intercept against a benchmark, per period.
    Alpha,
    /// Regression slope against a benchmark.
    Beta,
    /// Annualized excess return per unit of volatility.
    Sharpe,
    /// Worst peak-to-trough decline, reported as a non-positive fraction.
    MaxDrawdown,
    /// Running maximum AUM.
    HighWaterMark,
    /// Annualized standard deviation of periodic returns.
    Volatility,
    /// Annualized excess return per unit of downside deviation.
    Sortino,
    /// Annualized standard deviation of active returns.
    TrackingError,
    /// Annualized active return per unit of tracking error.
    InformationRatio,
    /// CAGR divided by the magnitude of the maximum drawdown.
    Calmar,
}

impl MetricKind {
    /// Every metric, in reporting order.
    pub const ALL: [MetricKind; 12] = [
        MetricKind::Cagr,
        MetricKind::Xirr,
        MetricKind::Alpha,
        MetricKind::Beta,
        MetricKind::Sharpe,
        MetricKind::MaxDrawdown,
        MetricKind::HighWaterMark,
        MetricKind::Volatility,
        MetricKind::Sortino,
        MetricKind::TrackingError,
        MetricKind::InformationRatio,
        MetricKind::Calmar,
    ];

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Cagr => "CAGR",
            MetricKind::Xirr => "XIRR",
            MetricKind::Alpha => "Alpha",
            MetricKind::Beta => "Beta",
            MetricKind::Sharpe => "Sharpe",
            MetricKind::MaxDrawdown => "MaxDrawdown",
            MetricKind::HighWaterMark => "HighWaterMark",
            MetricKind::Volatility => "Volatility",
            MetricKind::Sortino => "Sortino",
            MetricKind::TrackingError => "TrackingError",
            MetricKind::InformationRatio => "InformationRatio",
            MetricKind::Calmar => "Calmar",
        }
    }

    /// True for metrics that need a benchmark series.
    #[must_use]
    pub fn needs_benchmark(&self) -> bool {
        matches!(
            self,
            MetricKind::Alpha
                | MetricKind::Beta
                | MetricKind::TrackingError
                | MetricKind::InformationRatio
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "cagr" => Ok(MetricKind::Cagr),
            "xirr" => Ok(MetricKind::Xirr),
            "alpha" => Ok(MetricKind::Alpha),
            "beta" => Ok(MetricKind::Beta),
            "sharpe" | "sharperatio" => Ok(MetricKind::Sharpe),
            "maxdrawdown" | "mdd" | "drawdown" => Ok(MetricKind::MaxDrawdown),
            "highwatermark" | "hwm" => Ok(MetricKind::HighWaterMark),
            "volatility" | "vol" => Ok(MetricKind::Volatility),
            "sortino" | "sortinoratio" => Ok(MetricKind::Sortino),
            "trackingerror" | "te" => Ok(MetricKind::TrackingError),
            "informationratio" | "ir" => Ok(MetricKind::InformationRatio),
            "calmar" | "calmarratio" => Ok(MetricKind::Calmar),
            _ => Err(MetricsError::malformed(format!("unknown metric '{s}'"))),
        }
    }
}

/// An ordered, duplicate-free set of metrics to compute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeSet<MetricKind>);

impl MetricSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven headline metrics: CAGR, XIRR, Alpha, Beta, Sharpe,
    /// MaxDrawdown and HighWaterMark.
    #[must_use]
    pub fn standard() -> Self {
        MetricKind::ALL[..7].iter().copied().collect()
    }

    /// Every metric the engine supports.
    #[must_use]
    pub fn all() -> Self {
        MetricKind::ALL.iter().copied().collect()
    }

    /// Parses a comma-separated list such as `"cagr, xirr, sharpe"`.
    ///
    /// `"all"` and `"standard"` select the predefined sets.
    pub fn parse_list(list: &str) -> Result<Self, MetricsError> {
        match list.trim().to_ascii_lowercase().as_str() {
            "all" => return Ok(Self::all()),
            "standard" | "" => return Ok(Self::standard()),
            _ => {}
        }
        list.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<MetricKind>())
            .collect()
    }

    /// Adds a metric.
    #[must_use]
    pub fn with(mut self, kind: MetricKind) -> Self {
        self.0.insert(kind);
        self
    }

    /// True if `kind` is requested.
    #[must_use]
    pub fn contains(&self, kind: MetricKind) -> bool {
        self.0.contains(&kind)
    }

    /// Metrics in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.0.iter().copied()
    }

    /// Number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no metric is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MetricKind> for MetricSet {
    fn from_iter<I: IntoIterator<Item = MetricKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("CAGR".parse::<MetricKind>().unwrap(), MetricKind::Cagr);
        assert_eq!("max_drawdown".parse::<MetricKind>().unwrap(), MetricKind::MaxDrawdown);
        assert_eq!("HWM".parse::<MetricKind>().unwrap(), MetricKind::HighWaterMark);
        assert!("treynor".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_parse_list_dedups_and_orders() {
        let set = MetricSet::parse_list("sharpe, cagr, Sharpe").unwrap();
        let kinds: Vec<MetricKind> = set.iter().collect();
        assert_eq!(kinds, vec![MetricKind::Cagr, MetricKind::Sharpe]);
    }

    #[test]
    fn test_standard_set() {
        let set = MetricSet::standard();
        assert_eq!(set.len(), 7);
        assert!(set.contains(MetricKind::HighWaterMark));
        assert!(!set.contains(MetricKind::Calmar));
        assert_eq!(MetricSet::parse_list("all").unwrap(), MetricSet::all());
    }
}
