//! Filtered views: the subset plus its aggregates.

use std::sync::Arc;

use pmshub_core::{Dataset, MemoStats, VersionedMemo};

use crate::aggregate::Aggregates;
use crate::bucketing::AumBands;
use crate::facts::ClientFacts;
use crate::filter::FilterSpec;

/// Result of applying a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Clients passing every predicate, with all their snapshots and
    /// cashflows. Carries the source version.
    pub dataset: Dataset,
    /// Aggregates computed from `dataset` alone.
    pub aggregates: Aggregates,
}

/// Filters `dataset` and aggregates the result, using the default AUM bands.
///
/// # Example
///
/// ```rust
/// use rust_decimal_macros::dec;
/// use pmshub_core::prelude::*;
/// use pmshub_portfolio::prelude::*;
///
/// let date = Date::from_ymd(2024, 3, 31).unwrap();
/// let mut ds = Dataset::new();
/// for (id, aum) in [("C1", dec!(100)), ("C2", dec!(250)), ("C3", dec!(400))] {
///     ds.upsert_snapshot(PortfolioSnapshot::new(ClientId::new(id), date, aum), MergeMode::Merge);
/// }
///
/// let spec = FilterSpec::new([Predicate::between(FilterField::Aum, Some(dec!(100)), Some(dec!(250)))]).unwrap();
/// let view = apply_filter(&ds, &spec);
///
/// assert_eq!(view.aggregates.client_count, 2);
/// assert_eq!(view.aggregates.aum.total, dec!(350));
/// ```
#[must_use]
pub fn apply_filter(dataset: &Dataset, spec: &FilterSpec) -> FilterOutcome {
    apply_filter_with(dataset, spec, &AumBands::default())
}

/// Filters `dataset` and aggregates the result over the given AUM bands.
#[must_use]
pub fn apply_filter_with(dataset: &Dataset, spec: &FilterSpec, bands: &AumBands) -> FilterOutcome {
    let filtered = if spec.is_empty() {
        dataset.clone()
    } else {
        let facts = ClientFacts::collect(dataset);
        let keep: std::collections::BTreeSet<_> = facts
            .into_iter()
            .filter(|f| spec.matches(f))
            .map(|f| f.id)
            .collect();
        dataset.subset(|id| keep.contains(id))
    };
    let aggregates = Aggregates::compute(&filtered, bands);
    log::debug!(
        "filter [{spec}] on v{}: {} of {} clients",
        dataset.version(),
        aggregates.client_count,
        dataset.len()
    );
    FilterOutcome {
        dataset: filtered,
        aggregates,
    }
}

/// Memoized [`apply_filter_with`], keyed by dataset version and filter spec.
///
/// A dataset with a newer version drops every cached view.
#[derive(Debug)]
pub struct ViewCache {
    bands: AumBands,
    memo: VersionedMemo<FilterSpec, FilterOutcome>,
}

impl ViewCache {
    /// Creates a cache holding up to `capacity` views.
    #[must_use]
    pub fn new(bands: AumBands, capacity: usize) -> Self {
        Self {
            bands,
            memo: VersionedMemo::new(capacity),
        }
    }

    /// AUM bands used for aggregation.
    #[must_use]
    pub fn bands(&self) -> &AumBands {
        &self.bands
    }

    /// The view for `spec` over `dataset`.
    pub fn apply(&self, dataset: &Dataset, spec: &FilterSpec) -> Arc<FilterOutcome> {
        self.memo.get_or_compute(dataset.version(), spec, || {
            apply_filter_with(dataset, spec, &self.bands)
        })
    }

    /// Hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> MemoStats {
        self.memo.stats()
    }

    /// Drops every cached view.
    pub fn clear(&self) {
        self.memo.clear();
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new(AumBands::default(), 256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterField, Predicate};
    use pmshub_core::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn dataset(version: u64) -> Dataset {
        let date = Date::from_ymd(2024, 3, 31).unwrap();
        let mut ds = Dataset::new().with_version(version);
        for (id, rm, aum) in [("C1", "RM01", dec!(100)), ("C2", "RM01", dec!(200)), ("C3", "RM02", dec!(300))] {
            let id = ClientId::new(id);
            let mut record = ClientRecord::new(id.clone(), id.as_str());
            record.rm_id = Some(RmId::new(rm));
            ds.upsert_client(record, MergeMode::Merge);
            ds.upsert_snapshot(PortfolioSnapshot::new(id, date, aum), MergeMode::Merge);
        }
        ds
    }

    #[test]
    fn test_aggregates_follow_filter() {
        let ds = dataset(1);
        let spec = FilterSpec::new([Predicate::equals(FilterField::Rm, "rm01")]).unwrap();
        let view = apply_filter(&ds, &spec);
        assert_eq!(view.dataset.len(), 2);
        assert_eq!(view.aggregates.aum.total, dec!(300));
        assert_eq!(view.aggregates.by_rm.get("RM01").unwrap().count, 2);
        assert!(view.aggregates.by_rm.get("RM02").is_none());
    }

    #[test]
    fn test_empty_result_flags_no_data() {
        let ds = dataset(1);
        let spec = FilterSpec::new([Predicate::equals(FilterField::Rm, "RM99")]).unwrap();
        let view = apply_filter(&ds, &spec);
        assert!(view.dataset.is_empty());
        assert!(view.aggregates.no_data);
        assert_eq!(view.aggregates.aum.average, Decimal::ZERO);
    }

    #[test]
    fn test_empty_spec_keeps_everything() {
        let ds = dataset(3);
        let view = apply_filter(&ds, &FilterSpec::all());
        assert_eq!(view.dataset, ds);
        assert_eq!(view.aggregates.client_count, 3);
    }

    #[test]
    fn test_view_cache() {
        let cache = ViewCache::default();
        let spec = FilterSpec::new([Predicate::at_least(FilterField::Aum, dec!(150))]).unwrap();

        let first = cache.apply(&dataset(1), &spec);
        let again = cache.apply(&dataset(1), &spec);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.stats().hits, 1);

        let mut newer = dataset(2);
        newer.upsert_snapshot(
            PortfolioSnapshot::new(ClientId::new("C1"), Date::from_ymd(2024, 4, 30).unwrap(), dec!(500)),
            MergeMode::Merge,
        );
        let fresh = cache.apply(&newer, &spec);
        assert_eq!(fresh.aggregates.client_count, 3);
        assert_eq!(cache.stats().version, 2);
    }
}
