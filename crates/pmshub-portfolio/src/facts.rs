//! Per-client attributes that filters and buckets read.

use rust_decimal::Decimal;

use pmshub_core::{ClientId, ClientRecord, Dataset, Date, PortfolioSnapshot, RiskProfile};

/// One client's record and latest valuation, borrowed from a dataset.
///
/// A client may have a record without snapshots (CRM only) or snapshots
/// without a record (PMS only); every accessor tolerates both.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFacts<'a> {
    /// Client id.
    pub id: ClientId,
    /// Master record, if loaded.
    pub record: Option<&'a ClientRecord>,
    /// Most recent snapshot, if any.
    pub latest: Option<&'a PortfolioSnapshot>,
}

impl<'a> ClientFacts<'a> {
    /// Facts for one client.
    #[must_use]
    pub fn of(dataset: &'a Dataset, id: ClientId) -> Self {
        Self {
            record: dataset.client(&id),
            latest: dataset.latest_snapshot(&id),
            id,
        }
    }

    /// Facts for every client, in client-id order.
    #[must_use]
    pub fn collect(dataset: &'a Dataset) -> Vec<Self> {
        dataset
            .client_ids()
            .into_iter()
            .map(|id| Self::of(dataset, id))
            .collect()
    }

    /// Latest AUM.
    #[must_use]
    pub fn aum(&self) -> Option<Decimal> {
        self.latest.map(|s| s.aum)
    }

    /// Date of the latest valuation.
    #[must_use]
    pub fn valuation_date(&self) -> Option<Date> {
        self.latest.map(|s| s.as_of)
    }

    /// RM display name, falling back to the RM id.
    #[must_use]
    pub fn rm(&self) -> Option<&'a str> {
        let record = self.record?;
        record
            .rm_name
            .as_deref()
            .or_else(|| record.rm_id.as_ref().map(|id| id.as_str()))
    }

    /// Portfolio category.
    #[must_use]
    pub fn category(&self) -> Option<&'a str> {
        self.record?.category.as_deref()
    }

    /// Risk profile.
    #[must_use]
    pub fn risk_profile(&self) -> Option<RiskProfile> {
        self.record?.risk_profile
    }

    /// City.
    #[must_use]
    pub fn city(&self) -> Option<&'a str> {
        self.record?.city.as_deref()
    }
}

/// Trims and lowercases text for comparison.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmshub_core::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_facts_tolerate_missing_parts() {
        let mut ds = Dataset::new();
        let crm_only = ClientId::new("A");
        let pms_only = ClientId::new("B");
        ds.upsert_client(
            ClientRecord::new(crm_only.clone(), "Asha").with_rm(RmId::new("RM01"), "Priya Nair"),
            MergeMode::Merge,
        );
        ds.upsert_snapshot(
            PortfolioSnapshot::new(pms_only.clone(), Date::from_ymd(2024, 3, 31).unwrap(), dec!(500)),
            MergeMode::Merge,
        );

        let facts = ClientFacts::collect(&ds);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].rm(), Some("Priya Nair"));
        assert_eq!(facts[0].aum(), None);
        assert_eq!(facts[1].rm(), None);
        assert_eq!(facts[1].aum(), Some(dec!(500)));
    }

    #[test]
    fn test_rm_falls_back_to_id() {
        let mut ds = Dataset::new();
        let mut record = ClientRecord::new(ClientId::new("A"), "Asha");
        record.rm_id = Some(RmId::new("RM02"));
        ds.upsert_client(record, MergeMode::Merge);
        assert_eq!(ClientFacts::of(&ds, ClientId::new("A")).rm(), Some("RM02"));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Mumbai "), "mumbai");
    }
}
