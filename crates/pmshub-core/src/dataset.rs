//! The canonical in-memory dataset and its merge rules.
//!
//! A [`Dataset`] holds every client record, snapshot series and cashflow
//! ledger keyed by [`ClientId`]. Collections are ordered maps so iteration
//! (and therefore every downstream report) is deterministic.
//!
//! Each dataset carries a `version`. Caches in the metrics and filter
//! engines key on it; whoever publishes a changed dataset bumps it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{CashflowEvent, ClientId, ClientRecord, PortfolioSnapshot, SnapshotSeries};

/// How an incoming entity that collides with a stored one is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Incoming entity replaces the stored one entirely.
    Overwrite,
    /// Field-level merge preferring present incoming values.
    #[default]
    Merge,
    /// Stored entity wins; the incoming one is dropped.
    SkipDuplicates,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Overwrite => write!(f, "overwrite"),
            MergeMode::Merge => write!(f, "merge"),
            MergeMode::SkipDuplicates => write!(f, "skip-duplicates"),
        }
    }
}

impl FromStr for MergeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "overwrite" => Ok(MergeMode::Overwrite),
            "merge" => Ok(MergeMode::Merge),
            "skip-duplicates" | "skip" => Ok(MergeMode::SkipDuplicates),
            other => Err(CoreError::invalid_value(
                "merge_mode",
                format!("unknown merge mode '{other}'"),
            )),
        }
    }
}

/// What happened to one incoming entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// No collision; stored as new.
    Inserted,
    /// Collision resolved by overwrite.
    Replaced,
    /// Collision resolved by field merge.
    Merged,
    /// Collision resolved by keeping the stored entity.
    Skipped,
}

/// Counts of merge outcomes over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Newly stored entities.
    pub inserted: usize,
    /// Overwritten entities.
    pub replaced: usize,
    /// Field-merged entities.
    pub merged: usize,
    /// Dropped duplicates.
    pub skipped: usize,
}

impl MergeSummary {
    /// Tallies one outcome.
    pub fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserted += 1,
            MergeOutcome::Replaced => self.replaced += 1,
            MergeOutcome::Merged => self.merged += 1,
            MergeOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Total entities seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.inserted + self.replaced + self.merged + self.skipped
    }
}

/// Canonical collection of clients, snapshots and cashflows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    version: u64,
    clients: BTreeMap<ClientId, ClientRecord>,
    snapshots: BTreeMap<ClientId, SnapshotSeries>,
    cashflows: BTreeMap<ClientId, Vec<CashflowEvent>>,
}

impl Dataset {
    /// Creates an empty dataset at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sets the version.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Returns the dataset with the given version.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Client record by id.
    #[must_use]
    pub fn client(&self, id: &ClientId) -> Option<&ClientRecord> {
        self.clients.get(id)
    }

    /// All client records in id order.
    pub fn clients(&self) -> impl Iterator<Item = &ClientRecord> {
        self.clients.values()
    }

    /// Every client id known to any collection, in order.
    ///
    /// Includes clients that only appear in snapshots or cashflows.
    #[must_use]
    pub fn client_ids(&self) -> BTreeSet<ClientId> {
        self.clients
            .keys()
            .chain(self.snapshots.keys())
            .chain(self.cashflows.keys())
            .cloned()
            .collect()
    }

    /// Number of distinct clients across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.client_ids().len()
    }

    /// True if nothing has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.snapshots.is_empty() && self.cashflows.is_empty()
    }

    /// Snapshot series for a client.
    #[must_use]
    pub fn snapshot_series(&self, id: &ClientId) -> Option<&SnapshotSeries> {
        self.snapshots.get(id)
    }

    /// Snapshots for a client in date order; empty if none.
    #[must_use]
    pub fn snapshots(&self, id: &ClientId) -> &[PortfolioSnapshot] {
        self.snapshots.get(id).map_or(&[], SnapshotSeries::as_slice)
    }

    /// Cashflows for a client in date order; empty if none.
    #[must_use]
    pub fn cashflows(&self, id: &ClientId) -> &[CashflowEvent] {
        self.cashflows.get(id).map_or(&[], Vec::as_slice)
    }

    /// Latest snapshot for a client.
    #[must_use]
    pub fn latest_snapshot(&self, id: &ClientId) -> Option<&PortfolioSnapshot> {
        self.snapshots.get(id).and_then(SnapshotSeries::last)
    }

    /// AUM on the latest snapshot for a client.
    #[must_use]
    pub fn latest_aum(&self, id: &ClientId) -> Option<Decimal> {
        self.latest_snapshot(id).map(|s| s.aum)
    }

    /// Total number of snapshots.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.values().map(SnapshotSeries::len).sum()
    }

    /// Total number of cashflows.
    #[must_use]
    pub fn cashflow_count(&self) -> usize {
        self.cashflows.values().map(Vec::len).sum()
    }

    /// Snapshots flagged by corpus reconciliation.
    pub fn flagged_snapshots(&self) -> impl Iterator<Item = &PortfolioSnapshot> {
        self.snapshots
            .values()
            .flat_map(SnapshotSeries::iter)
            .filter(|s| s.is_flagged())
    }

    /// Mutable snapshot lookup, used to reconcile after a merge.
    pub fn snapshot_mut(
        &mut self,
        id: &ClientId,
        date: crate::types::Date,
    ) -> Option<&mut PortfolioSnapshot> {
        self.snapshots.get_mut(id).and_then(|s| s.get_mut(date))
    }

    /// Inserts or merges a client record.
    pub fn upsert_client(&mut self, record: ClientRecord, mode: MergeMode) -> MergeOutcome {
        match self.clients.get_mut(&record.id) {
            None => {
                self.clients.insert(record.id.clone(), record);
                MergeOutcome::Inserted
            }
            Some(stored) => match mode {
                MergeMode::Overwrite => {
                    *stored = record;
                    MergeOutcome::Replaced
                }
                MergeMode::Merge => {
                    stored.merge_from(record);
                    MergeOutcome::Merged
                }
                MergeMode::SkipDuplicates => MergeOutcome::Skipped,
            },
        }
    }

    /// Inserts or merges a snapshot keyed by (client, date).
    pub fn upsert_snapshot(&mut self, snapshot: PortfolioSnapshot, mode: MergeMode) -> MergeOutcome {
        self.snapshots
            .entry(snapshot.client_id.clone())
            .or_default()
            .upsert(snapshot, mode)
    }

    /// Inserts or merges a cashflow as the first of its (date, label) group.
    ///
    /// See [`upsert_cashflow_nth`](Self::upsert_cashflow_nth).
    pub fn upsert_cashflow(&mut self, event: CashflowEvent, mode: MergeMode) -> MergeOutcome {
        self.upsert_cashflow_nth(event, 0, mode)
    }

    /// Inserts or merges a cashflow.
    ///
    /// An event with a transaction id matches the stored event carrying the
    /// same id. An event without one matches the `occurrence`-th stored
    /// event (zero based) that also lacks an id and shares its date and
    /// label. With no match the event is inserted, so repeated same-day
    /// transactions in one batch stay separate while re-loading the same
    /// batch lines up with what is stored.
    pub fn upsert_cashflow_nth(
        &mut self,
        event: CashflowEvent,
        occurrence: usize,
        mode: MergeMode,
    ) -> MergeOutcome {
        let ledger = self.cashflows.entry(event.client_id.clone()).or_default();
        let found = match event.transaction_id.as_deref() {
            Some(txn) => ledger
                .iter()
                .position(|e| e.transaction_id.as_deref() == Some(txn)),
            None => ledger
                .iter()
                .enumerate()
                .filter(|(_, e)| e.transaction_id.is_none() && e.key() == event.key())
                .nth(occurrence)
                .map(|(pos, _)| pos),
        };

        let (stored, outcome) = match (found, mode) {
            (None, _) => (event, MergeOutcome::Inserted),
            (Some(_), MergeMode::SkipDuplicates) => return MergeOutcome::Skipped,
            (Some(pos), MergeMode::Overwrite) => {
                ledger.remove(pos);
                (event, MergeOutcome::Replaced)
            }
            (Some(pos), MergeMode::Merge) => {
                let mut stored = ledger.remove(pos);
                stored.merge_from(event);
                (stored, MergeOutcome::Merged)
            }
        };
        let at = ledger.partition_point(|e| e.key() <= stored.key());
        ledger.insert(at, stored);
        outcome
    }

    /// Merges every entity of `other` into `self`.
    ///
    /// The version of `self` is left untouched.
    pub fn merge(&mut self, other: Dataset, mode: MergeMode) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for (_, record) in other.clients {
            summary.record(self.upsert_client(record, mode));
        }
        for (_, series) in other.snapshots {
            for snapshot in Vec::from(series) {
                summary.record(self.upsert_snapshot(snapshot, mode));
            }
        }
        for (_, events) in other.cashflows {
            let mut seen: BTreeMap<(crate::types::Date, Option<String>), usize> = BTreeMap::new();
            for event in events {
                let occurrence = match event.transaction_id {
                    Some(_) => 0,
                    None => {
                        let slot = seen.entry((event.date, event.label.clone())).or_default();
                        *slot += 1;
                        *slot - 1
                    }
                };
                summary.record(self.upsert_cashflow_nth(event, occurrence, mode));
            }
        }
        summary
    }

    /// A new dataset holding only the clients for which `keep` is true.
    ///
    /// The subset carries the same version.
    #[must_use]
    pub fn subset<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&ClientId) -> bool,
    {
        let mut subset = Dataset::new().with_version(self.version);
        for id in self.client_ids() {
            if !keep(&id) {
                continue;
            }
            if let Some(record) = self.clients.get(&id) {
                subset.clients.insert(id.clone(), record.clone());
            }
            if let Some(series) = self.snapshots.get(&id) {
                subset.snapshots.insert(id.clone(), series.clone());
            }
            if let Some(events) = self.cashflows.get(&id) {
                subset.cashflows.insert(id.clone(), events.clone());
            }
        }
        subset
    }
}
