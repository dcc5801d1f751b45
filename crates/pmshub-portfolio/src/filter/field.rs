//! Filterable client attributes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::facts::{normalize_text, ClientFacts};

use super::value::{FilterValue, ValueKind};

/// A client attribute a predicate can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// Client id.
    ClientId,
    /// Relationship manager, matched on either id or name.
    Rm,
    /// Portfolio category.
    Category,
    /// Risk profile.
    RiskProfile,
    /// City.
    City,
    /// State.
    State,
    /// Profession.
    Profession,
    /// Age in years.
    Age,
    /// Latest AUM.
    Aum,
    /// Date the relationship started.
    InceptionDate,
    /// Date of the latest snapshot.
    ValuationDate,
}

impl FilterField {
    /// Every field.
    pub const ALL: [FilterField; 11] = [
        FilterField::ClientId,
        FilterField::Rm,
        FilterField::Category,
        FilterField::RiskProfile,
        FilterField::City,
        FilterField::State,
        FilterField::Profession,
        FilterField::Age,
        FilterField::Aum,
        FilterField::InceptionDate,
        FilterField::ValuationDate,
    ];

    /// Canonical name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FilterField::ClientId => "client_id",
            FilterField::Rm => "rm",
            FilterField::Category => "category",
            FilterField::RiskProfile => "risk_profile",
            FilterField::City => "city",
            FilterField::State => "state",
            FilterField::Profession => "profession",
            FilterField::Age => "age",
            FilterField::Aum => "aum",
            FilterField::InceptionDate => "inception_date",
            FilterField::ValuationDate => "valuation_date",
        }
    }

    /// Value type the field compares on.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            FilterField::Age | FilterField::Aum => ValueKind::Number,
            FilterField::InceptionDate | FilterField::ValuationDate => ValueKind::Date,
            _ => ValueKind::Text,
        }
    }

    /// The client's values for this field, normalized for comparison.
    ///
    /// Empty when the attribute is unknown; [`FilterField::Rm`] can yield
    /// both an id and a name.
    #[must_use]
    pub fn values(&self, facts: &ClientFacts<'_>) -> Vec<FilterValue> {
        let record = facts.record;
        let text = |s: Option<&str>| -> Vec<FilterValue> {
            s.map(|s| FilterValue::Text(normalize_text(s))).into_iter().collect()
        };
        match self {
            FilterField::ClientId => text(Some(facts.id.as_str())),
            FilterField::Rm => {
                let Some(r) = record else { return Vec::new() };
                let mut out = text(r.rm_id.as_ref().map(|id| id.as_str()));
                out.extend(text(r.rm_name.as_deref()));
                out
            }
            FilterField::Category => text(facts.category()),
            FilterField::RiskProfile => text(facts.risk_profile().map(|p| p.as_str())),
            FilterField::City => text(facts.city()),
            FilterField::State => text(record.and_then(|r| r.state.as_deref())),
            FilterField::Profession => text(record.and_then(|r| r.profession.as_deref())),
            FilterField::Age => record
                .and_then(|r| r.age)
                .map(|a| FilterValue::Number(Decimal::from(a)))
                .into_iter()
                .collect(),
            FilterField::Aum => facts.aum().map(FilterValue::Number).into_iter().collect(),
            FilterField::InceptionDate => record
                .and_then(|r| r.inception_date)
                .map(FilterValue::Date)
                .into_iter()
                .collect(),
            FilterField::ValuationDate => facts.valuation_date().map(FilterValue::Date).into_iter().collect(),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "clientid" | "client" | "id" => Ok(FilterField::ClientId),
            "rm" | "rmid" | "rmname" => Ok(FilterField::Rm),
            "category" | "portfoliotype" => Ok(FilterField::Category),
            "risk" | "riskprofile" => Ok(FilterField::RiskProfile),
            "city" => Ok(FilterField::City),
            "state" => Ok(FilterField::State),
            "profession" | "occupation" => Ok(FilterField::Profession),
            "age" => Ok(FilterField::Age),
            "aum" | "currentaum" => Ok(FilterField::Aum),
            "inceptiondate" | "clientsince" => Ok(FilterField::InceptionDate),
            "valuationdate" | "asof" | "asofdate" => Ok(FilterField::ValuationDate),
            _ => Err(FilterError::UnknownField(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmshub_core::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_field_names() {
        assert_eq!("RM NAME".parse::<FilterField>().unwrap(), FilterField::Rm);
        assert_eq!("portfolio_type".parse::<FilterField>().unwrap(), FilterField::Category);
        assert_eq!("current-aum".parse::<FilterField>().unwrap(), FilterField::Aum);
        assert!("email".parse::<FilterField>().is_err());
        for field in FilterField::ALL {
            assert_eq!(field.name().parse::<FilterField>().unwrap(), field);
        }
    }

    #[test]
    fn test_values_are_normalized() {
        let mut ds = Dataset::new();
        let id = ClientId::new("C1");
        ds.upsert_client(
            ClientRecord::new(id.clone(), "Asha")
                .with_rm(RmId::new("RM01"), " Priya Nair ")
                .with_age(41)
                .with_risk_profile(RiskProfile::Aggressive),
            MergeMode::Merge,
        );
        ds.upsert_snapshot(
            PortfolioSnapshot::new(id.clone(), Date::from_ymd(2024, 3, 31).unwrap(), dec!(2500000)),
            MergeMode::Merge,
        );
        let facts = ClientFacts::of(&ds, id);

        assert_eq!(
            FilterField::Rm.values(&facts),
            vec![FilterValue::from("rm01"), FilterValue::from("priya nair")]
        );
        assert_eq!(FilterField::RiskProfile.values(&facts), vec![FilterValue::from("aggressive")]);
        assert_eq!(FilterField::Age.values(&facts), vec![FilterValue::from(41u32)]);
        assert_eq!(FilterField::Aum.values(&facts), vec![FilterValue::Number(dec!(2500000))]);
        assert!(FilterField::City.values(&facts).is_empty());
    }
}
