//! Client master records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ClientId, Date, RmId};
use crate::error::CoreError;

/// Client risk appetite as captured by the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskProfile {
    /// Capital preservation first.
    Conservative,
    /// Moderate risk tolerance.
    Moderate,
    /// Balanced growth and preservation.
    Balanced,
    /// Growth oriented, high tolerance.
    Aggressive,
}

impl RiskProfile {
    /// All profiles in ascending order of risk.
    pub const ALL: [RiskProfile; 4] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Balanced,
        RiskProfile::Aggressive,
    ];

    /// Display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Conservative",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Balanced => "Balanced",
            RiskProfile::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" | "low" => Ok(RiskProfile::Conservative),
            "moderate" | "medium" => Ok(RiskProfile::Moderate),
            "balanced" => Ok(RiskProfile::Balanced),
            "aggressive" | "high" => Ok(RiskProfile::Aggressive),
            other => Err(CoreError::invalid_value(
                "risk_profile",
                format!("unknown risk profile '{other}'"),
            )),
        }
    }
}

/// A client as known to the CRM or an upload.
///
/// Only `id` and `name` are mandatory; every other attribute may be missing
/// in a given source and is filled in by later merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Unique client identifier.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: Option<u32>,
    /// Profession or occupation.
    pub profession: Option<String>,
    /// City of residence.
    pub city: Option<String>,
    /// State of residence.
    pub state: Option<String>,
    /// Relationship manager identifier.
    pub rm_id: Option<RmId>,
    /// Relationship manager display name.
    pub rm_name: Option<String>,
    /// Portfolio category (Equity, Debt, Hybrid, ...).
    pub category: Option<String>,
    /// Risk profile.
    pub risk_profile: Option<RiskProfile>,
    /// Date the client's portfolio was opened.
    pub inception_date: Option<Date>,
}

impl ClientRecord {
    /// Creates a record with only the mandatory fields set.
    pub fn new(id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age: None,
            profession: None,
            city: None,
            state: None,
            rm_id: None,
            rm_name: None,
            category: None,
            risk_profile: None,
            inception_date: None,
        }
    }

    /// Sets the age.
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the profession.
    #[must_use]
    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(profession.into());
        self
    }

    /// Sets city and state.
    #[must_use]
    pub fn with_location(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self
    }

    /// Sets the relationship manager.
    #[must_use]
    pub fn with_rm(mut self, rm_id: RmId, rm_name: impl Into<String>) -> Self {
        self.rm_id = Some(rm_id);
        self.rm_name = Some(rm_name.into());
        self
    }

    /// Sets the portfolio category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the risk profile.
    #[must_use]
    pub fn with_risk_profile(mut self, risk_profile: RiskProfile) -> Self {
        self.risk_profile = Some(risk_profile);
        self
    }

    /// Sets the inception date.
    #[must_use]
    pub fn with_inception_date(mut self, date: Date) -> Self {
        self.inception_date = Some(date);
        self
    }

    /// Field-level merge: every attribute present on `incoming` replaces the
    /// stored one, absent attributes keep the stored value.
    pub fn merge_from(&mut self, incoming: ClientRecord) {
        if !incoming.name.trim().is_empty() {
            self.name = incoming.name;
        }
        merge_opt(&mut self.age, incoming.age);
        merge_opt(&mut self.profession, incoming.profession);
        merge_opt(&mut self.city, incoming.city);
        merge_opt(&mut self.state, incoming.state);
        merge_opt(&mut self.rm_id, incoming.rm_id);
        merge_opt(&mut self.rm_name, incoming.rm_name);
        merge_opt(&mut self.category, incoming.category);
        merge_opt(&mut self.risk_profile, incoming.risk_profile);
        merge_opt(&mut self.inception_date, incoming.inception_date);
    }
}

pub(crate) fn merge_opt<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_profile_parse() {
        assert_eq!(" aggressive ".parse::<RiskProfile>().unwrap(), RiskProfile::Aggressive);
        assert_eq!("MODERATE".parse::<RiskProfile>().unwrap(), RiskProfile::Moderate);
        assert!("reckless".parse::<RiskProfile>().is_err());
    }

    #[test]
    fn test_merge_prefers_incoming_present_fields() {
        let mut stored = ClientRecord::new(ClientId::new("C001"), "Asha Rao")
            .with_location("Mumbai", "Maharashtra")
            .with_age(42);
        let incoming = ClientRecord::new(ClientId::new("C001"), "Asha R. Rao")
            .with_category("Equity");

        stored.merge_from(incoming);

        assert_eq!(stored.name, "Asha R. Rao");
        assert_eq!(stored.city.as_deref(), Some("Mumbai"));
        assert_eq!(stored.age, Some(42));
        assert_eq!(stored.category.as_deref(), Some("Equity"));
    }

    #[test]
    fn test_merge_keeps_name_when_incoming_blank() {
        let mut stored = ClientRecord::new(ClientId::new("C001"), "Asha Rao");
        stored.merge_from(ClientRecord::new(ClientId::new("C001"), " "));
        assert_eq!(stored.name, "Asha Rao");
    }
}
