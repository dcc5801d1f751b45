//! Dated portfolio valuations and per-client snapshot series.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::client::merge_opt;
use super::{ClientId, Date};
use crate::dataset::{MergeMode, MergeOutcome};
use crate::error::{CoreError, CoreResult};

/// Result of checking `net_corpus = initial_corpus + additions - withdrawals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Not enough corpus fields to check.
    #[default]
    Unchecked,
    /// Recorded net corpus agrees with the derived one.
    Balanced,
    /// Net corpus was absent and has been derived.
    Derived,
    /// Recorded net corpus disagrees with the derived one.
    Mismatch {
        /// Derived net corpus.
        expected: Decimal,
        /// Recorded net corpus.
        actual: Decimal,
    },
}

impl Reconciliation {
    /// True for a mismatch.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        matches!(self, Reconciliation::Mismatch { .. })
    }
}

/// A client's portfolio state as of one date.
///
/// Withdrawals are stored as a non-negative magnitude regardless of the sign
/// the source used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Owning client.
    pub client_id: ClientId,
    /// Valuation date.
    pub as_of: Date,
    /// Assets under management.
    pub aum: Decimal,
    /// Corpus at inception.
    pub initial_corpus: Option<Decimal>,
    /// Cumulative additions.
    pub additions: Option<Decimal>,
    /// Cumulative withdrawals (magnitude).
    pub withdrawals: Option<Decimal>,
    /// Net invested corpus.
    pub net_corpus: Option<Decimal>,
    /// Corpus reconciliation status.
    #[serde(default)]
    pub reconciliation: Reconciliation,
}

impl PortfolioSnapshot {
    /// Creates a snapshot carrying only AUM.
    pub fn new(client_id: ClientId, as_of: Date, aum: Decimal) -> Self {
        Self {
            client_id,
            as_of,
            aum,
            initial_corpus: None,
            additions: None,
            withdrawals: None,
            net_corpus: None,
            reconciliation: Reconciliation::Unchecked,
        }
    }

    /// Attaches corpus fields.
    #[must_use]
    pub fn with_corpus(
        mut self,
        initial_corpus: Option<Decimal>,
        additions: Option<Decimal>,
        withdrawals: Option<Decimal>,
        net_corpus: Option<Decimal>,
    ) -> Self {
        self.initial_corpus = initial_corpus;
        self.additions = additions;
        self.withdrawals = withdrawals.map(|w| w.abs());
        self.net_corpus = net_corpus;
        self
    }

    /// Net corpus implied by initial corpus, additions and withdrawals.
    ///
    /// `None` when the initial corpus is unknown.
    #[must_use]
    pub fn derived_net_corpus(&self) -> Option<Decimal> {
        let initial = self.initial_corpus?;
        let additions = self.additions.unwrap_or(Decimal::ZERO);
        let withdrawals = self.withdrawals.map_or(Decimal::ZERO, |w| w.abs());
        Some(initial + additions - withdrawals)
    }

    /// Checks the corpus identity and records the outcome on the snapshot.
    ///
    /// A missing net corpus is derived, and one derived by an earlier call is
    /// derived again. A mismatch beyond `tolerance` is flagged and also
    /// returned as [`CoreError::Reconciliation`]; the snapshot itself is kept
    /// either way.
    pub fn reconcile(&mut self, tolerance: Decimal) -> CoreResult<()> {
        self.withdrawals = self.withdrawals.map(|w| w.abs());
        if self.reconciliation == Reconciliation::Derived {
            self.net_corpus = None;
        }
        let Some(expected) = self.derived_net_corpus() else {
            self.reconciliation = Reconciliation::Unchecked;
            return Ok(());
        };

        match self.net_corpus {
            None => {
                self.net_corpus = Some(expected);
                self.reconciliation = Reconciliation::Derived;
                Ok(())
            }
            Some(actual) if (actual - expected).abs() <= tolerance => {
                self.reconciliation = Reconciliation::Balanced;
                Ok(())
            }
            Some(actual) => {
                self.reconciliation = Reconciliation::Mismatch { expected, actual };
                Err(CoreError::Reconciliation {
                    client_id: self.client_id.to_string(),
                    date: self.as_of.to_string(),
                    expected,
                    actual,
                })
            }
        }
    }

    /// True if reconciliation flagged this snapshot.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.reconciliation.is_flagged()
    }

    /// Field-level merge preferring values present on `incoming`.
    ///
    /// A net corpus that was derived rather than recorded, on either side,
    /// is discarded so it is derived again from the merged fields. The reconciliation status
    /// is reset and must be recomputed.
    pub fn merge_from(&mut self, mut incoming: PortfolioSnapshot) {
        if self.reconciliation == Reconciliation::Derived {
            self.net_corpus = None;
        }
        if incoming.reconciliation == Reconciliation::Derived {
            incoming.net_corpus = None;
        }
        self.aum = incoming.aum;
        merge_opt(&mut self.initial_corpus, incoming.initial_corpus);
        merge_opt(&mut self.additions, incoming.additions);
        merge_opt(&mut self.withdrawals, incoming.withdrawals);
        merge_opt(&mut self.net_corpus, incoming.net_corpus);
        self.reconciliation = Reconciliation::Unchecked;
    }
}

/// A client's snapshots ordered by strictly increasing date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PortfolioSnapshot>", into = "Vec<PortfolioSnapshot>")]
pub struct SnapshotSeries {
    snapshots: Vec<PortfolioSnapshot>,
}

impl SnapshotSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from unordered snapshots.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateSnapshot` if two snapshots share a date.
    pub fn from_snapshots(mut snapshots: Vec<PortfolioSnapshot>) -> CoreResult<Self> {
        snapshots.sort_by_key(|s| s.as_of);
        if let Some(pair) = snapshots.windows(2).find(|w| w[0].as_of == w[1].as_of) {
            return Err(CoreError::DuplicateSnapshot {
                client_id: pair[1].client_id.to_string(),
                date: pair[1].as_of.to_string(),
            });
        }
        Ok(Self { snapshots })
    }

    /// Inserts a snapshot, resolving a same-date collision with `mode`.
    pub fn upsert(&mut self, snapshot: PortfolioSnapshot, mode: MergeMode) -> MergeOutcome {
        match self.snapshots.binary_search_by_key(&snapshot.as_of, |s| s.as_of) {
            Err(pos) => {
                self.snapshots.insert(pos, snapshot);
                MergeOutcome::Inserted
            }
            Ok(pos) => match mode {
                MergeMode::Overwrite => {
                    self.snapshots[pos] = snapshot;
                    MergeOutcome::Replaced
                }
                MergeMode::Merge => {
                    self.snapshots[pos].merge_from(snapshot);
                    MergeOutcome::Merged
                }
                MergeMode::SkipDuplicates => MergeOutcome::Skipped,
            },
        }
    }

    /// Mutable access to the snapshot on `date`.
    pub fn get_mut(&mut self, date: Date) -> Option<&mut PortfolioSnapshot> {
        self.snapshots
            .binary_search_by_key(&date, |s| s.as_of)
            .ok()
            .map(|pos| &mut self.snapshots[pos])
    }

    /// Snapshots in date order.
    #[must_use]
    pub fn as_slice(&self) -> &[PortfolioSnapshot] {
        &self.snapshots
    }

    /// Iterator over snapshots in date order.
    pub fn iter(&self) -> std::slice::Iter<'_, PortfolioSnapshot> {
        self.snapshots.iter()
    }

    /// Number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if there are no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Earliest snapshot.
    #[must_use]
    pub fn first(&self) -> Option<&PortfolioSnapshot> {
        self.snapshots.first()
    }

    /// Latest snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&PortfolioSnapshot> {
        self.snapshots.last()
    }

    /// Latest snapshot dated on or before `date`.
    #[must_use]
    pub fn as_of(&self, date: Date) -> Option<&PortfolioSnapshot> {
        match self.snapshots.binary_search_by_key(&date, |s| s.as_of) {
            Ok(pos) => Some(&self.snapshots[pos]),
            Err(0) => None,
            Err(pos) => Some(&self.snapshots[pos - 1]),
        }
    }
}

impl TryFrom<Vec<PortfolioSnapshot>> for SnapshotSeries {
    type Error = CoreError;

    fn try_from(snapshots: Vec<PortfolioSnapshot>) -> Result<Self, Self::Error> {
        Self::from_snapshots(snapshots)
    }
}

impl From<SnapshotSeries> for Vec<PortfolioSnapshot> {
    fn from(series: SnapshotSeries) -> Self {
        series.snapshots
    }
}

impl<'a> IntoIterator for &'a SnapshotSeries {
    type Item = &'a PortfolioSnapshot;
    type IntoIter = std::slice::Iter<'a, PortfolioSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
