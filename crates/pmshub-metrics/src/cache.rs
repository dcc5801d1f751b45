//! Version-keyed memoization of metric results.

use std::sync::Arc;

use pmshub_core::{BenchmarkSeries, ClientId, Dataset, MemoStats, VersionedMemo};

use crate::config::MetricsConfig;
use crate::engine::compute_metrics;
use crate::error::MetricsResult;
use crate::kind::MetricSet;
use crate::result::{MetricResult, Subject};
use crate::series::ClientSeries;

type CacheKey = (Subject, MetricSet, Option<String>);

/// Caches metric results per (dataset version, subject, metric set, benchmark).
///
/// Entries are dropped as soon as a newer dataset version is seen. The
/// configuration is fixed for the life of the cache.
pub struct MetricsCache {
    config: MetricsConfig,
    memo: VersionedMemo<CacheKey, Vec<MetricResult>>,
}

impl MetricsCache {
    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(config: MetricsConfig, capacity: usize) -> Self {
        Self {
            config,
            memo: VersionedMemo::new(capacity),
        }
    }

    /// Configuration used for every computation.
    #[must_use]
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Metrics for one client of `dataset`.
    pub fn client_metrics(
        &self,
        dataset: &Dataset,
        id: &ClientId,
        metrics: &MetricSet,
        benchmark: Option<&BenchmarkSeries>,
    ) -> MetricsResult<Arc<Vec<MetricResult>>> {
        let key = (
            Subject::Client(id.clone()),
            metrics.clone(),
            benchmark.map(|b| b.name().to_string()),
        );
        self.memo.try_get_or_compute(dataset.version(), &key, || {
            let series = ClientSeries::for_client(dataset, id)?;
            compute_metrics(&series, metrics, benchmark, &self.config)
        })
    }

    /// Metrics for a group whose members are exactly the clients of `members`.
    ///
    /// `key` must identify the membership uniquely within one dataset
    /// version (for example `"rm:RM01"`).
    pub fn group_metrics(
        &self,
        key: &str,
        members: &Dataset,
        metrics: &MetricSet,
        benchmark: Option<&BenchmarkSeries>,
    ) -> MetricsResult<Arc<Vec<MetricResult>>> {
        let cache_key = (
            Subject::Group(key.to_string()),
            metrics.clone(),
            benchmark.map(|b| b.name().to_string()),
        );
        self.memo.try_get_or_compute(members.version(), &cache_key, || {
            let series = ClientSeries::for_group(key, members)?;
            compute_metrics(&series, metrics, benchmark, &self.config)
        })
    }

    /// Hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> MemoStats {
        self.memo.stats()
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.memo.clear();
    }
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new(MetricsConfig::default(), 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::MetricKind;
    use pmshub_core::{Date, MergeMode, PortfolioSnapshot};
    use rust_decimal_macros::dec;

    fn dataset() -> Dataset {
        let mut ds = Dataset::new();
        let id = ClientId::new("C1");
        let d0 = Date::from_ymd(2020, 1, 1).unwrap();
        let d1 = Date::from_ymd(2021, 1, 1).unwrap();
        ds.upsert_snapshot(PortfolioSnapshot::new(id.clone(), d0, dec!(100)), MergeMode::Merge);
        ds.upsert_snapshot(PortfolioSnapshot::new(id, d1, dec!(120)), MergeMode::Merge);
        ds
    }

    #[test]
    fn test_hit_then_invalidate_on_new_version() {
        let cache = MetricsCache::default();
        let ds = dataset();
        let id = ClientId::new("C1");
        let metrics = MetricSet::new().with(MetricKind::Cagr);

        let first = cache.client_metrics(&ds, &id, &metrics, None).unwrap();
        let second = cache.client_metrics(&ds, &id, &metrics, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);

        let newer = ds.clone().with_version(ds.version() + 1);
        let third = cache.client_metrics(&newer, &id, &metrics, None).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
        assert_eq!(cache.stats().version, newer.version());
    }

    #[test]
    fn test_metric_set_is_part_of_key() {
        let cache = MetricsCache::default();
        let ds = dataset();
        let id = ClientId::new("C1");
        let a = cache
            .client_metrics(&ds, &id, &MetricSet::new().with(MetricKind::Cagr), None)
            .unwrap();
        let b = cache.client_metrics(&ds, &id, &MetricSet::standard(), None).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 7);
        assert_eq!(cache.stats().misses, 2);
    }
}
