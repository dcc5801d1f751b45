//! Row normalization and merging.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use pmshub_core::dataset::MergeSummary;
use pmshub_core::{ClientId, Dataset, Date, MergeMode, MergeOutcome};

use crate::audit::{AuditOutcome, AuditSink, LogAuditSink};
use crate::error::{LoadError, LoadResult};
use crate::fields::HeaderMap;
use crate::mapping::MappingConfig;
use crate::raw::RawRow;
use crate::rows::SourceRow;

/// A row that did not make it into the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Row identifier.
    pub row_id: String,
    /// Why it was rejected.
    #[serde(serialize_with = "display")]
    pub error: LoadError,
}

fn display<S: serde::Serializer>(err: &LoadError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Result of one load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Normalized records from the accepted rows.
    pub dataset: Dataset,
    /// Rows that failed validation or coercion.
    pub rejected: Vec<RejectedRow>,
    /// How accepted records landed.
    pub summary: MergeSummary,
    /// Rows that produced records.
    pub accepted: usize,
    /// Snapshots flagged by corpus reconciliation.
    pub flagged: usize,
}

impl LoadReport {
    /// Rows processed.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.accepted + self.rejected.len()
    }
}

/// Normalizes `rows` into a fresh dataset, auditing through the log.
///
/// Bad rows are collected in [`LoadReport::rejected`]; the load itself only
/// fails when `config` is unusable.
///
/// # Example
///
/// ```rust
/// use pmshub_loader::prelude::*;
///
/// let rows = vec![
///     RawRow::new("r1").with("CLIENT ID", "C1").with("CURRENT AUM", "100").with("AS OF DATE", "2024-03-31"),
///     RawRow::new("r2").with("CLIENT ID", "C2").with("CURRENT AUM", "n/a").with("AS OF DATE", "2024-03-31"),
/// ];
/// let report = load(&rows, &MappingConfig::new(SourceKind::Upload)).unwrap();
///
/// assert_eq!(report.dataset.len(), 1);
/// assert_eq!(report.rejected.len(), 1);
/// ```
pub fn load(rows: &[RawRow], config: &MappingConfig) -> LoadResult<LoadReport> {
    load_with_audit(rows, config, &LogAuditSink)
}

/// Normalizes `rows`, sending one audit record per row to `audit`.
pub fn load_with_audit(
    rows: &[RawRow],
    config: &MappingConfig,
    audit: &dyn AuditSink,
) -> LoadResult<LoadReport> {
    let headers = HeaderMap::new(config)?;
    let mut dataset = Dataset::new();
    let mut summary = MergeSummary::default();
    let mut rejected = Vec::new();
    let mut accepted_rows = 0;
    // Same-key cashflows without a transaction id seen so far in this batch.
    let mut flow_occurrences: BTreeMap<(ClientId, Date, Option<String>), usize> = BTreeMap::new();

    for row in rows {
        let parsed = match SourceRow::parse(row, &headers, config) {
            Ok(parsed) => parsed,
            Err(err) => {
                audit.record(&row.row_id, AuditOutcome::Rejected, Some(&err.to_string()));
                rejected.push(RejectedRow {
                    row_id: row.row_id.clone(),
                    error: err,
                });
                continue;
            }
        };
        accepted_rows += 1;

        let client_id = parsed.client_id().clone();
        let records = parsed.into_records();
        let mut primary = None;
        let mut flag = None;

        if let Some(client) = records.client {
            let outcome = dataset.upsert_client(client, config.merge_mode);
            summary.record(outcome);
            primary = Some(outcome);
        }
        if let Some(snapshot) = records.snapshot {
            let as_of = snapshot.as_of;
            let outcome = dataset.upsert_snapshot(snapshot, config.merge_mode);
            summary.record(outcome);
            primary = Some(outcome);
            if outcome != MergeOutcome::Skipped {
                flag = reconcile_one(&mut dataset, &client_id, as_of, config.reconciliation_tolerance);
            }
        }
        if let Some(cashflow) = records.cashflow {
            let occurrence = if cashflow.transaction_id.is_some() {
                0
            } else {
                let slot = flow_occurrences
                    .entry((client_id.clone(), cashflow.date, cashflow.label.clone()))
                    .or_default();
                *slot += 1;
                *slot - 1
            };
            let outcome = dataset.upsert_cashflow_nth(cashflow, occurrence, config.merge_mode);
            summary.record(outcome);
            primary = Some(outcome);
        }

        match (flag, primary) {
            (Some(reason), _) => audit.record(&row.row_id, AuditOutcome::Flagged, Some(&reason)),
            (None, Some(outcome)) => audit.record(&row.row_id, audit_outcome(outcome), None),
            (None, None) => audit.record(&row.row_id, AuditOutcome::Skipped, Some("row carried no records")),
        }
    }

    let flagged = dataset.flagged_snapshots().count();
    log::info!(
        "loaded {} {} rows: {} accepted, {} rejected, {} flagged ({} inserted, {} merged, {} replaced, {} skipped)",
        rows.len(),
        config.source,
        accepted_rows,
        rejected.len(),
        flagged,
        summary.inserted,
        summary.merged,
        summary.replaced,
        summary.skipped
    );

    Ok(LoadReport {
        dataset,
        rejected,
        summary,
        accepted: accepted_rows,
        flagged,
    })
}

fn audit_outcome(outcome: MergeOutcome) -> AuditOutcome {
    match outcome {
        MergeOutcome::Inserted => AuditOutcome::Accepted,
        MergeOutcome::Replaced | MergeOutcome::Merged => AuditOutcome::Merged,
        MergeOutcome::Skipped => AuditOutcome::Skipped,
    }
}

fn reconcile_one(dataset: &mut Dataset, id: &ClientId, as_of: Date, tolerance: Decimal) -> Option<String> {
    let snapshot = dataset.snapshot_mut(id, as_of)?;
    match snapshot.reconcile(tolerance) {
        Ok(()) => None,
        Err(err) => {
            log::warn!("{err}");
            Some(err.to_string())
        }
    }
}

/// Re-runs corpus reconciliation on every snapshot, returning the number
/// flagged.
pub fn reconcile_all(dataset: &mut Dataset, tolerance: Decimal) -> usize {
    let keys: Vec<(ClientId, Date)> = dataset
        .client_ids()
        .into_iter()
        .flat_map(|id| {
            dataset
                .snapshots(&id)
                .iter()
                .map(|s| (id.clone(), s.as_of))
                .collect::<Vec<_>>()
        })
        .collect();
    keys.iter()
        .filter(|(id, date)| reconcile_one(dataset, id, *date, tolerance).is_some())
        .count()
}

/// Merges `batch` into a copy of `existing` under `mode`.
///
/// The result carries `existing.version() + 1`. Snapshots combined by a
/// field merge come back unreconciled; see [`reconcile_all`].
#[must_use]
pub fn merge_into(existing: &Dataset, batch: Dataset, mode: MergeMode) -> (Dataset, MergeSummary) {
    let mut merged = existing.clone();
    let summary = merged.merge(batch, mode);
    merged.set_version(existing.version() + 1);
    log::info!(
        "merged batch into dataset v{} -> v{}: {} inserted, {} merged, {} replaced, {} skipped",
        existing.version(),
        merged.version(),
        summary.inserted,
        summary.merged,
        summary.replaced,
        summary.skipped
    );
    (merged, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::mapping::SourceKind;
    use rust_decimal_macros::dec;

    fn upload_row(id: &str, client: &str, aum: &str, date: &str) -> RawRow {
        RawRow::new(id)
            .with("CLIENT ID", client)
            .with("CURRENT AUM", aum)
            .with("AS OF DATE", date)
    }

    #[test]
    fn test_overwrite_second_row_wins() {
        let rows = vec![
            upload_row("r1", "C1", "100", "2024-03-31").with("INITIAL CORPUS", "90"),
            upload_row("r2", "C1", "120", "2024-03-31"),
        ];
        let config = MappingConfig::new(SourceKind::Upload).with_merge_mode(MergeMode::Overwrite);
        let report = load(&rows, &config).unwrap();
        let snaps = report.dataset.snapshots(&ClientId::new("C1"));
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].aum, dec!(120));
        assert_eq!(snaps[0].initial_corpus, None);
        assert_eq!(report.summary.replaced, 2); // client and snapshot
    }

    #[test]
    fn test_merge_prefers_non_null_incoming() {
        let rows = vec![
            upload_row("r1", "C1", "100", "2024-03-31").with("INITIAL CORPUS", "90"),
            upload_row("r2", "C1", "120", "2024-03-31").with("CITY", "Pune"),
        ];
        let report = load(&rows, &MappingConfig::new(SourceKind::Upload)).unwrap();
        let id = ClientId::new("C1");
        let snap = &report.dataset.snapshots(&id)[0];
        assert_eq!(snap.aum, dec!(120));
        assert_eq!(snap.initial_corpus, Some(dec!(90)));
        assert_eq!(report.dataset.client(&id).unwrap().city.as_deref(), Some("Pune"));
    }

    #[test]
    fn test_skip_duplicates_keeps_first() {
        let rows = vec![
            upload_row("r1", "C1", "100", "2024-03-31"),
            upload_row("r2", "C1", "120", "2024-03-31"),
        ];
        let sink = MemoryAuditSink::new();
        let config = MappingConfig::new(SourceKind::Upload).with_merge_mode(MergeMode::SkipDuplicates);
        let report = load_with_audit(&rows, &config, &sink).unwrap();
        assert_eq!(report.dataset.snapshots(&ClientId::new("C1"))[0].aum, dec!(100));
        assert_eq!(sink.count(AuditOutcome::Accepted), 1);
        assert_eq!(sink.count(AuditOutcome::Skipped), 1);
    }

    #[test]
    fn test_rejections_do_not_abort() {
        let rows = vec![
            upload_row("r1", "C1", "100", "2024-03-31"),
            upload_row("r2", "", "100", "2024-03-31"),
            upload_row("r3", "C3", "abc", "2024-03-31"),
            upload_row("r4", "C4", "50", "31-31-2024"),
        ];
        let sink = MemoryAuditSink::new();
        let report = load_with_audit(&rows, &MappingConfig::new(SourceKind::Upload), &sink).unwrap();
        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.rejected.len(), 3);
        assert!(matches!(report.rejected[0].error, LoadError::Validation { .. }));
        assert!(matches!(report.rejected[1].error, LoadError::TypeCoercion { .. }));
        assert!(matches!(report.rejected[2].error, LoadError::TypeCoercion { .. }));
        assert_eq!(sink.len(), 4);
        assert_eq!(report.rows(), 4);
    }

    #[test]
    fn test_reconciliation_flags_but_keeps() {
        let rows = vec![upload_row("r1", "C1", "100", "2024-03-31")
            .with("INITIAL CORPUS", "100")
            .with("ADDITIONS", "20")
            .with("WITHDRAWALS", "-10")
            .with("NET CORPUS", "200")];
        let sink = MemoryAuditSink::new();
        let report = load_with_audit(&rows, &MappingConfig::new(SourceKind::Upload), &sink).unwrap();
        assert_eq!(report.flagged, 1);
        assert_eq!(report.dataset.snapshot_count(), 1);
        assert_eq!(sink.count(AuditOutcome::Flagged), 1);
        let snap = &report.dataset.snapshots(&ClientId::new("C1"))[0];
        assert_eq!(snap.withdrawals, Some(dec!(10)));
    }

    #[test]
    fn test_merge_into_bumps_version() {
        let first = load(&[upload_row("r1", "C1", "100", "2024-03-31")], &MappingConfig::new(SourceKind::Upload))
            .unwrap()
            .dataset;
        let second = load(&[upload_row("r1", "C2", "50", "2024-03-31")], &MappingConfig::new(SourceKind::Upload))
            .unwrap()
            .dataset;
        let (merged, summary) = merge_into(&first, second, MergeMode::Merge);
        assert_eq!(merged.version(), first.version() + 1);
        assert_eq!(merged.len(), 2);
        assert_eq!(summary.inserted, 2);
    }
}
