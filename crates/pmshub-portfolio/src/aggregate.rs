//! Summary aggregates over a set of clients.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pmshub_core::Dataset;

use crate::bucketing::{
    bucket_by_aum_band, bucket_by_category, bucket_by_city, bucket_by_risk_profile, bucket_by_rm,
    AumBands, Distribution,
};
use crate::facts::ClientFacts;

/// Latest-AUM statistics.
///
/// Average, minimum, maximum and median are taken over clients that have at
/// least one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AumStats {
    /// Clients with a valuation.
    pub valued_clients: usize,
    /// Sum of latest AUM.
    pub total: Decimal,
    /// Mean latest AUM.
    pub average: Decimal,
    /// Smallest latest AUM.
    pub min: Option<Decimal>,
    /// Largest latest AUM.
    pub max: Option<Decimal>,
    /// Median latest AUM.
    pub median: Option<Decimal>,
}

impl AumStats {
    /// Statistics of `values`, in any order.
    #[must_use]
    pub fn from_values(mut values: Vec<Decimal>) -> Self {
        values.sort();
        let total: Decimal = values.iter().copied().sum();
        let n = values.len();
        let median = match n {
            0 => None,
            n if n % 2 == 1 => Some(values[n / 2]),
            n => Some((values[n / 2 - 1] + values[n / 2]) / Decimal::TWO),
        };
        Self {
            valued_clients: n,
            total,
            average: if n == 0 { Decimal::ZERO } else { total / Decimal::from(n) },
            min: values.first().copied(),
            max: values.last().copied(),
            median,
        }
    }
}

/// Corpus figures summed over the clients' latest snapshots.
///
/// Missing components count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusTotals {
    /// Initial corpus.
    pub initial: Decimal,
    /// Additions.
    pub additions: Decimal,
    /// Withdrawals, as a magnitude.
    pub withdrawals: Decimal,
    /// Net corpus.
    pub net: Decimal,
}

/// Summary of a filtered client set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregates {
    /// Clients in the set.
    pub client_count: usize,
    /// Latest-AUM statistics.
    pub aum: AumStats,
    /// Corpus totals.
    pub corpus: CorpusTotals,
    /// Snapshots flagged by reconciliation, across all dates.
    pub flagged_snapshots: usize,
    /// Breakdown by portfolio category.
    pub by_category: Distribution,
    /// Breakdown by relationship manager.
    pub by_rm: Distribution,
    /// Breakdown by risk profile.
    pub by_risk_profile: Distribution,
    /// Breakdown by city.
    pub by_city: Distribution,
    /// Breakdown by AUM band.
    pub by_aum_band: Distribution,
    /// True when the set is empty; every other figure is then zero.
    pub no_data: bool,
}

impl Aggregates {
    /// Aggregates over every client in `dataset`.
    #[must_use]
    pub fn compute(dataset: &Dataset, bands: &AumBands) -> Self {
        let clients = ClientFacts::collect(dataset);
        if clients.is_empty() {
            return Self {
                no_data: true,
                ..Self::default()
            };
        }

        let aum = AumStats::from_values(clients.iter().filter_map(ClientFacts::aum).collect());

        let mut corpus = CorpusTotals::default();
        for snapshot in clients.iter().filter_map(|c| c.latest) {
            corpus.initial += snapshot.initial_corpus.unwrap_or_default();
            corpus.additions += snapshot.additions.unwrap_or_default();
            corpus.withdrawals += snapshot.withdrawals.unwrap_or_default().abs();
            corpus.net += snapshot
                .net_corpus
                .or_else(|| snapshot.derived_net_corpus())
                .unwrap_or_default();
        }

        Self {
            client_count: clients.len(),
            aum,
            corpus,
            flagged_snapshots: dataset.flagged_snapshots().count(),
            by_category: bucket_by_category(&clients),
            by_rm: bucket_by_rm(&clients),
            by_risk_profile: bucket_by_risk_profile(&clients),
            by_city: bucket_by_city(&clients),
            by_aum_band: bucket_by_aum_band(&clients, bands),
            no_data: false,
        }
    }
}
