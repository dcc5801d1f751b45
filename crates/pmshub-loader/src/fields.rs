//! Canonical fields and the per-source header tables that map onto them.
//!
//! Headers are compared after [`normalize_header`], so `"RM NAME"`,
//! `"rm_name"` and `"Rm Name"` all hit the same entry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;
use crate::mapping::{MappingConfig, PmsTable, SourceKind};
use crate::raw::{RawRow, RawValue};

/// A semantic field every source maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Client identifier.
    ClientId,
    /// Client display name.
    Name,
    /// Age in years.
    Age,
    /// Profession / occupation.
    Profession,
    /// City.
    City,
    /// State.
    State,
    /// Relationship manager id.
    RmId,
    /// Relationship manager name.
    RmName,
    /// Portfolio category.
    Category,
    /// Risk profile.
    RiskProfile,
    /// Client inception date.
    InceptionDate,
    /// Valuation date.
    AsOf,
    /// Assets under management.
    Aum,
    /// Initial corpus.
    InitialCorpus,
    /// Cumulative additions.
    Additions,
    /// Cumulative withdrawals.
    Withdrawals,
    /// Net corpus.
    NetCorpus,
    /// Cashflow value date.
    FlowDate,
    /// Cashflow amount.
    Amount,
    /// Cashflow label.
    Label,
    /// Source transaction id.
    TransactionId,
}

impl Field {
    /// Every field.
    pub const ALL: [Field; 21] = [
        Field::ClientId,
        Field::Name,
        Field::Age,
        Field::Profession,
        Field::City,
        Field::State,
        Field::RmId,
        Field::RmName,
        Field::Category,
        Field::RiskProfile,
        Field::InceptionDate,
        Field::AsOf,
        Field::Aum,
        Field::InitialCorpus,
        Field::Additions,
        Field::Withdrawals,
        Field::NetCorpus,
        Field::FlowDate,
        Field::Amount,
        Field::Label,
        Field::TransactionId,
    ];

    /// Canonical snake_case name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Field::ClientId => "client_id",
            Field::Name => "name",
            Field::Age => "age",
            Field::Profession => "profession",
            Field::City => "city",
            Field::State => "state",
            Field::RmId => "rm_id",
            Field::RmName => "rm_name",
            Field::Category => "category",
            Field::RiskProfile => "risk_profile",
            Field::InceptionDate => "inception_date",
            Field::AsOf => "as_of",
            Field::Aum => "aum",
            Field::InitialCorpus => "initial_corpus",
            Field::Additions => "additions",
            Field::Withdrawals => "withdrawals",
            Field::NetCorpus => "net_corpus",
            Field::FlowDate => "date",
            Field::Amount => "amount",
            Field::Label => "label",
            Field::TransactionId => "transaction_id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_header(s);
        Field::ALL
            .iter()
            .copied()
            .find(|f| normalize_header(f.name()) == wanted)
            .ok_or_else(|| LoadError::Parse(format!("unknown field '{s}'")))
    }
}

/// Lowercases and drops whitespace and underscores.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// SOURCE TABLES
// =============================================================================

const CRM_FIELDS: &[(&str, Field)] = &[
    ("Account__c", Field::ClientId),
    ("Client_Id__c", Field::ClientId),
    ("Name", Field::Name),
    ("Account__r.Name", Field::Name),
    ("Age__c", Field::Age),
    ("Occupation__c", Field::Profession),
    ("Profession__c", Field::Profession),
    ("BillingCity", Field::City),
    ("BillingState", Field::State),
    ("OwnerId", Field::RmId),
    ("Owner.Name", Field::RmName),
    ("Portfolio_Type__c", Field::Category),
    ("Investment_Category__c", Field::Category),
    ("Custom_Risk_Profile__c", Field::RiskProfile),
    ("CreatedDate", Field::InceptionDate),
    ("AUM_Date__c", Field::AsOf),
    ("AUM_Amount__c", Field::Aum),
];

const PMS_SNAPSHOT_FIELDS: &[(&str, Field)] = &[
    ("Portfolio ID", Field::ClientId),
    ("portfolio_id", Field::ClientId),
    ("period_end_date", Field::AsOf),
    ("valuation_date", Field::AsOf),
    ("ending_value", Field::Aum),
    ("market_value", Field::Aum),
    ("initial_corpus", Field::InitialCorpus),
    ("additions", Field::Additions),
    ("withdrawals", Field::Withdrawals),
    ("net_corpus", Field::NetCorpus),
];

const PMS_CASHFLOW_FIELDS: &[(&str, Field)] = &[
    ("Portfolio ID", Field::ClientId),
    ("portfolio_id", Field::ClientId),
    ("transaction_date", Field::FlowDate),
    ("value_date", Field::FlowDate),
    ("amount", Field::Amount),
    ("net_amount", Field::Amount),
    ("transaction_type", Field::Label),
    ("Transaction ID", Field::TransactionId),
    ("txn_id", Field::TransactionId),
];

const UPLOAD_FIELDS: &[(&str, Field)] = &[
    ("CLIENT ID", Field::ClientId),
    ("CLIENT CODE", Field::ClientId),
    ("CLIENT NAME", Field::Name),
    ("CLIENTNAME", Field::Name),
    ("AGE OF CLIENT", Field::Age),
    ("OCCUPATION", Field::Profession),
    ("RM ID", Field::RmId),
    ("RM CODE", Field::RmId),
    ("RM NAME", Field::RmName),
    ("PORTFOLIO TYPE", Field::Category),
    ("RISK PROFILE", Field::RiskProfile),
    ("CLIENT SINCE", Field::InceptionDate),
    ("AS OF DATE", Field::AsOf),
    ("VALUATION DATE", Field::AsOf),
    ("CURRENT AUM (in crs.)", Field::Aum),
    ("CURRENT AUM", Field::Aum),
    ("AUM (Cr)", Field::Aum),
];

/// Built-in header table for a source.
#[must_use]
pub fn source_table(source: SourceKind, table: PmsTable) -> &'static [(&'static str, Field)] {
    match (source, table) {
        (SourceKind::Crm, _) => CRM_FIELDS,
        (SourceKind::Pms, PmsTable::Snapshots) => PMS_SNAPSHOT_FIELDS,
        (SourceKind::Pms, PmsTable::Cashflows) => PMS_CASHFLOW_FIELDS,
        (SourceKind::Upload, _) => UPLOAD_FIELDS,
    }
}

/// Resolved header lookup for one mapping configuration.
///
/// Precedence: configured aliases, then the source table, then canonical
/// field names.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    lookup: BTreeMap<String, Field>,
}

impl HeaderMap {
    /// Builds the lookup for `config`.
    ///
    /// # Errors
    ///
    /// `LoadError::Parse` if an alias names an unknown field.
    pub fn new(config: &MappingConfig) -> Result<Self, LoadError> {
        let mut lookup = BTreeMap::new();
        for field in Field::ALL {
            lookup.insert(normalize_header(field.name()), field);
        }
        for (header, field) in source_table(config.source, config.pms_table) {
            lookup.insert(normalize_header(header), *field);
        }
        for (header, field) in &config.aliases {
            lookup.insert(normalize_header(header), field.parse()?);
        }
        Ok(Self { lookup })
    }

    /// Field a header maps to, if any.
    #[must_use]
    pub fn field(&self, header: &str) -> Option<Field> {
        self.lookup.get(&normalize_header(header)).copied()
    }

    /// Cells of `row` keyed by field. Unknown columns are dropped; blank
    /// cells are treated as absent. When two columns map to one field the
    /// first non-blank one in column order wins.
    #[must_use]
    pub fn resolve<'r>(&self, row: &'r RawRow) -> BTreeMap<Field, &'r RawValue> {
        let mut out = BTreeMap::new();
        for (header, value) in &row.cells {
            if value.is_blank() {
                continue;
            }
            if let Some(field) = self.field(header) {
                out.entry(field).or_insert(value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_header("  RM_Name "), "rmname");
        assert_eq!(normalize_header("CURRENT AUM (in crs.)"), "currentaum(incrs.)");
    }

    #[test]
    fn test_upload_headers() {
        let map = HeaderMap::new(&MappingConfig::new(SourceKind::Upload)).unwrap();
        assert_eq!(map.field("RM NAME"), Some(Field::RmName));
        assert_eq!(map.field("rm_name"), Some(Field::RmName));
        assert_eq!(map.field("current_aum"), Some(Field::Aum));
        assert_eq!(map.field("CURRENT AUM (in crs.)"), Some(Field::Aum));
        assert_eq!(map.field("EMAIL"), None);
    }

    #[test]
    fn test_aliases_take_precedence() {
        let config = MappingConfig::new(SourceKind::Pms).with_alias("Closing NAV", "aum");
        let map = HeaderMap::new(&config).unwrap();
        assert_eq!(map.field("closing nav"), Some(Field::Aum));

        let bad = MappingConfig::new(SourceKind::Pms).with_alias("X", "nonsense");
        assert!(HeaderMap::new(&bad).is_err());
    }

    #[test]
    fn test_resolve_skips_blanks() {
        let map = HeaderMap::new(&MappingConfig::new(SourceKind::Crm)).unwrap();
        let row = RawRow::new("r1")
            .with("Account__c", "C001")
            .with("Name", "")
            .with("Email", "x@y.z");
        let cells = map.resolve(&row);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[&Field::ClientId], &RawValue::from("C001"));
    }
}
