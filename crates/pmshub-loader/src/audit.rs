//! Per-row audit trail.
//!
//! The audit trail records what happened to every source row. It is kept
//! apart from diagnostic logging so it can be persisted or shown to the
//! uploader as-is.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// New records were inserted.
    Accepted,
    /// Accepted, but a snapshot failed corpus reconciliation.
    Flagged,
    /// Collided with an existing key and was merged or replaced it.
    Merged,
    /// Collided with an existing key and was dropped.
    Skipped,
    /// Failed validation or coercion.
    Rejected,
}

impl AuditOutcome {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Accepted => "accepted",
            AuditOutcome::Flagged => "flagged",
            AuditOutcome::Merged => "merged",
            AuditOutcome::Skipped => "skipped",
            AuditOutcome::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives one call per processed row.
pub trait AuditSink: Send + Sync {
    /// Records the outcome of `row_id`, with a reason where there is one.
    fn record(&self, row_id: &str, outcome: AuditOutcome, reason: Option<&str>);
}

/// Writes audit records through the `log` facade under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, row_id: &str, outcome: AuditOutcome, reason: Option<&str>) {
        match (outcome, reason) {
            (AuditOutcome::Rejected | AuditOutcome::Flagged, Some(reason)) => {
                log::warn!(target: "audit", "{row_id}: {outcome}: {reason}");
            }
            (_, Some(reason)) => log::debug!(target: "audit", "{row_id}: {outcome}: {reason}"),
            (_, None) => log::debug!(target: "audit", "{row_id}: {outcome}"),
        }
    }
}

/// One stored audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row identifier.
    pub row_id: String,
    /// Outcome.
    pub outcome: AuditOutcome,
    /// Reason, if any.
    pub reason: Option<String>,
}

/// Collects audit records in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry so far, in arrival order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    /// Number of entries with `outcome`.
    #[must_use]
    pub fn count(&self, outcome: AuditOutcome) -> usize {
        self.entries.lock().iter().filter(|e| e.outcome == outcome).count()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, row_id: &str, outcome: AuditOutcome, reason: Option<&str>) {
        self.entries.lock().push(AuditEntry {
            row_id: row_id.to_string(),
            outcome,
            reason: reason.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink() {
        let sink = MemoryAuditSink::new();
        sink.record("r1", AuditOutcome::Accepted, None);
        sink.record("r2", AuditOutcome::Rejected, Some("aum: missing"));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(AuditOutcome::Rejected), 1);
        assert_eq!(sink.entries()[1].reason.as_deref(), Some("aum: missing"));
    }
}
