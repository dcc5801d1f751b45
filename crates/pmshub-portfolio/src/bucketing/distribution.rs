//! Bucket metrics and distributions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::facts::ClientFacts;

use super::bands::AumBands;

/// Aggregated metrics for one bucket of clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BucketMetrics {
    /// Clients in the bucket.
    pub count: usize,
    /// Sum of latest AUM.
    pub total_aum: Decimal,
    /// Mean latest AUM over clients that have one.
    pub average_aum: Decimal,
    /// Share of the distribution's total AUM, 0-100.
    pub weight_pct: f64,
}

impl BucketMetrics {
    /// Returns true if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Clients grouped by a classification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    /// Metrics by bucket key.
    pub by_bucket: BTreeMap<String, BucketMetrics>,
    /// Total AUM across all buckets, unclassified included.
    pub total_aum: Decimal,
    /// Clients the classifier could not place.
    pub unclassified: BucketMetrics,
}

impl Distribution {
    /// Metrics for one bucket.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BucketMetrics> {
        self.by_bucket.get(key)
    }

    /// Buckets sorted by weight, heaviest first; ties by key.
    #[must_use]
    pub fn sorted_by_weight(&self) -> Vec<(&str, &BucketMetrics)> {
        let mut result: Vec<_> = self.by_bucket.iter().map(|(k, m)| (k.as_str(), m)).collect();
        result.sort_by(|a, b| b.1.total_aum.cmp(&a.1.total_aum).then_with(|| a.0.cmp(b.0)));
        result
    }

    /// Number of distinct buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.by_bucket.len()
    }

    /// Clients across all buckets, unclassified included.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.by_bucket.values().map(|m| m.count).sum::<usize>() + self.unclassified.count
    }
}

/// Buckets clients by portfolio category.
#[must_use]
pub fn bucket_by_category(clients: &[ClientFacts<'_>]) -> Distribution {
    bucket_by_classifier(clients, |c| c.category().map(str::to_string))
}

/// Buckets clients by RM name, or RM id when the name is unknown.
#[must_use]
pub fn bucket_by_rm(clients: &[ClientFacts<'_>]) -> Distribution {
    bucket_by_classifier(clients, |c| c.rm().map(str::to_string))
}

/// Buckets clients by risk profile.
#[must_use]
pub fn bucket_by_risk_profile(clients: &[ClientFacts<'_>]) -> Distribution {
    bucket_by_classifier(clients, |c| c.risk_profile().map(|p| p.as_str().to_string()))
}

/// Buckets clients by city.
#[must_use]
pub fn bucket_by_city(clients: &[ClientFacts<'_>]) -> Distribution {
    bucket_by_classifier(clients, |c| c.city().map(str::to_string))
}

/// Buckets clients by latest-AUM band. Clients without a valuation are
/// unclassified.
#[must_use]
pub fn bucket_by_aum_band(clients: &[ClientFacts<'_>], bands: &AumBands) -> Distribution {
    bucket_by_classifier(clients, |c| c.aum().map(|aum| bands.label_for(aum)))
}

/// Generic bucketing by a classifier function.
///
/// Keys are used as given; bucket order is the key order.
#[must_use]
pub fn bucket_by_classifier<F>(clients: &[ClientFacts<'_>], classifier: F) -> Distribution
where
    F: Fn(&ClientFacts<'_>) -> Option<String>,
{
    let mut grouped: BTreeMap<Option<String>, Vec<&ClientFacts<'_>>> = BTreeMap::new();
    for client in clients {
        grouped.entry(classifier(client)).or_default().push(client);
    }

    let total_aum: Decimal = clients.iter().filter_map(ClientFacts::aum).sum();

    let mut by_bucket = BTreeMap::new();
    let mut unclassified = BucketMetrics::default();
    for (key, members) in grouped {
        let metrics = bucket_metrics(&members, total_aum);
        match key {
            Some(key) => {
                by_bucket.insert(key, metrics);
            }
            None => unclassified = metrics,
        }
    }

    Distribution {
        by_bucket,
        total_aum,
        unclassified,
    }
}

fn bucket_metrics(members: &[&ClientFacts<'_>], total_aum: Decimal) -> BucketMetrics {
    let valued: Vec<Decimal> = members.iter().filter_map(|c| c.aum()).collect();
    let bucket_total: Decimal = valued.iter().copied().sum();
    BucketMetrics {
        count: members.len(),
        total_aum: bucket_total,
        average_aum: mean(bucket_total, valued.len()),
        weight_pct: weight_pct(bucket_total, total_aum),
    }
}

fn mean(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

fn weight_pct(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (part / total * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pmshub_core::prelude::*;
    use rust_decimal_macros::dec;

    fn dataset() -> Dataset {
        let date = Date::from_ymd(2024, 3, 31).unwrap();
        let mut ds = Dataset::new();
        let rows = [
            ("C1", Some("Equity"), dec!(200)),
            ("C2", Some("Equity"), dec!(100)),
            ("C3", Some("Debt"), dec!(100)),
            ("C4", None, dec!(0)),
        ];
        for (id, category, aum) in rows {
            let id = ClientId::new(id);
            let mut record = ClientRecord::new(id.clone(), id.as_str());
            record.category = category.map(str::to_string);
            ds.upsert_client(record, MergeMode::Merge);
            ds.upsert_snapshot(PortfolioSnapshot::new(id, date, aum), MergeMode::Merge);
        }
        ds.upsert_client(ClientRecord::new(ClientId::new("C5"), "Unvalued"), MergeMode::Merge);
        ds
    }

    #[test]
    fn test_bucket_by_category() {
        let ds = dataset();
        let clients = ClientFacts::collect(&ds);
        let dist = bucket_by_category(&clients);

        assert_eq!(dist.bucket_count(), 2);
        assert_eq!(dist.total_aum, dec!(400));
        let equity = dist.get("Equity").unwrap();
        assert_eq!(equity.count, 2);
        assert_eq!(equity.average_aum, dec!(150));
        assert_relative_eq!(equity.weight_pct, 75.0);
        assert_eq!(dist.unclassified.count, 2);
        assert_eq!(dist.client_count(), 5);
    }

    #[test]
    fn test_sorted_by_weight() {
        let ds = dataset();
        let clients = ClientFacts::collect(&ds);
        let dist = bucket_by_category(&clients);
        let keys: Vec<&str> = dist
            .sorted_by_weight()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["Equity", "Debt"]);
    }

    #[test]
    fn test_aum_band_skips_unvalued() {
        let ds = dataset();
        let clients = ClientFacts::collect(&ds);
        let dist = bucket_by_aum_band(&clients, &AumBands::default());
        assert_eq!(dist.get("< 10 L").unwrap().count, 4);
        assert_eq!(dist.unclassified.count, 1);
    }

    #[test]
    fn test_empty_input() {
        let dist = bucket_by_rm(&[]);
        assert_eq!(dist.bucket_count(), 0);
        assert_eq!(dist.total_aum, Decimal::ZERO);
    }
}
