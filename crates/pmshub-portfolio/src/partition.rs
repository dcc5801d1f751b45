//! Splitting a dataset into per-group datasets.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use pmshub_core::{ClientId, Dataset};

use crate::error::FilterError;
use crate::facts::ClientFacts;

/// Key for clients the grouping attribute is unknown for.
pub const UNASSIGNED: &str = "Unassigned";

/// Attribute to group clients by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Relationship manager.
    Rm,
    /// Portfolio category.
    Category,
    /// Risk profile.
    RiskProfile,
    /// City.
    City,
}

impl GroupBy {
    /// Group key for one client.
    #[must_use]
    pub fn key(&self, facts: &ClientFacts<'_>) -> String {
        let key = match self {
            GroupBy::Rm => facts.rm(),
            GroupBy::Category => facts.category(),
            GroupBy::RiskProfile => facts.risk_profile().map(|p| p.as_str()),
            GroupBy::City => facts.city(),
        };
        key.map_or_else(|| UNASSIGNED.to_string(), str::to_string)
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Rm => write!(f, "rm"),
            GroupBy::Category => write!(f, "category"),
            GroupBy::RiskProfile => write!(f, "risk_profile"),
            GroupBy::City => write!(f, "city"),
        }
    }
}

impl FromStr for GroupBy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "rm" | "rm_name" => Ok(GroupBy::Rm),
            "category" | "portfolio_type" => Ok(GroupBy::Category),
            "risk" | "risk_profile" => Ok(GroupBy::RiskProfile),
            "city" => Ok(GroupBy::City),
            _ => Err(FilterError::UnknownGrouping(s.to_string())),
        }
    }
}

/// Splits `dataset` into one dataset per group key.
///
/// Every client lands in exactly one group; clients without the attribute go
/// to [`UNASSIGNED`]. Each part keeps the source version.
#[must_use]
pub fn partition(dataset: &Dataset, group_by: GroupBy) -> BTreeMap<String, Dataset> {
    let mut members: BTreeMap<String, BTreeSet<ClientId>> = BTreeMap::new();
    for facts in ClientFacts::collect(dataset) {
        members.entry(group_by.key(&facts)).or_default().insert(facts.id);
    }
    log::debug!("partitioned {} clients by {group_by} into {} groups", dataset.len(), members.len());
    members
        .into_iter()
        .map(|(key, ids)| (key, dataset.subset(|id| ids.contains(id))))
        .collect()
}
