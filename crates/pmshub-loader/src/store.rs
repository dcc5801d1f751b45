//! The committed dataset and its single-writer merge discipline.

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::sync::Arc;

use pmshub_core::dataset::MergeSummary;
use pmshub_core::{Dataset, MergeMode};

use crate::audit::AuditSink;
use crate::error::LoadResult;
use crate::load::{load_with_audit, merge_into, reconcile_all, LoadReport};
use crate::mapping::MappingConfig;
use crate::raw::RawRow;

/// Holds the last committed dataset.
///
/// Readers take an `Arc` snapshot and never wait on a merge beyond the
/// pointer swap. Merges are serialized by a writer lock and each publishes
/// a new version.
pub struct DatasetStore {
    current: RwLock<Arc<Dataset>>,
    writer: Mutex<()>,
    tolerance: Decimal,
}

impl DatasetStore {
    /// Creates a store holding `dataset`.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
            writer: Mutex::new(()),
            tolerance: Decimal::new(1, 2),
        }
    }

    /// Sets the reconciliation tolerance applied after merges.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The committed dataset.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.current.read())
    }

    /// Version of the committed dataset.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    /// Merges `batch` into the committed dataset and publishes the result.
    pub fn merge(&self, batch: Dataset, mode: MergeMode) -> MergeSummary {
        let _writer = self.writer.lock();
        let base = self.snapshot();
        let (mut merged, summary) = merge_into(&base, batch, mode);
        let flagged = reconcile_all(&mut merged, self.tolerance);
        if flagged > 0 {
            log::warn!("dataset v{}: {flagged} snapshots flagged by reconciliation", merged.version());
        }
        *self.current.write() = Arc::new(merged);
        summary
    }

    /// Loads `rows` and merges the accepted records.
    ///
    /// The report describes the batch on its own; the store publishes the
    /// merged result.
    pub fn load(
        &self,
        rows: &[RawRow],
        config: &MappingConfig,
        audit: &dyn AuditSink,
    ) -> LoadResult<LoadReport> {
        let report = load_with_audit(rows, config, audit)?;
        self.merge(report.dataset.clone(), config.merge_mode);
        Ok(report)
    }

    /// Replaces the committed dataset outright, bumping the version.
    pub fn replace(&self, mut dataset: Dataset) -> u64 {
        let _writer = self.writer.lock();
        let version = self.version() + 1;
        dataset.set_version(version);
        *self.current.write() = Arc::new(dataset);
        version
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new(Dataset::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::mapping::SourceKind;
    use pmshub_core::ClientId;
    use rust_decimal_macros::dec;
    use std::thread;

    fn row(client: &str, aum: &str) -> RawRow {
        RawRow::new(format!("{client}-{aum}"))
            .with("CLIENT ID", client)
            .with("CURRENT AUM", aum)
            .with("AS OF DATE", "2024-03-31")
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let store = DatasetStore::default();
        let before = store.snapshot();
        let sink = MemoryAuditSink::new();
        store
            .load(&[row("C1", "100")], &MappingConfig::new(SourceKind::Upload), &sink)
            .unwrap();
        assert!(before.is_empty());
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_concurrent_merges_serialize() {
        let store = Arc::new(DatasetStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let sink = MemoryAuditSink::new();
                    let config = MappingConfig::new(SourceKind::Upload);
                    store.load(&[row(&format!("C{i}"), "100")], &config, &sink).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.version(), 8);
        assert_eq!(store.snapshot().len(), 8);
    }

    #[test]
    fn test_merge_reconciles() {
        let store = DatasetStore::default();
        let sink = MemoryAuditSink::new();
        let config = MappingConfig::new(SourceKind::Upload);
        store
            .load(&[row("C1", "100").with("INITIAL CORPUS", "100")], &config, &sink)
            .unwrap();
        store
            .load(&[row("C1", "110").with("NET CORPUS", "500")], &config, &sink)
            .unwrap();
        let current = store.snapshot();
        let snap = &current.snapshots(&ClientId::new("C1"))[0];
        assert_eq!(snap.aum, dec!(110));
        assert!(snap.is_flagged());
    }

    #[test]
    fn test_replace_bumps_version() {
        let store = DatasetStore::default();
        assert_eq!(store.replace(Dataset::new().with_version(40)), 1);
    }
}
