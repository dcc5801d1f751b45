//! Per-load mapping options.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pmshub_core::{Date, MergeMode};

use crate::error::LoadError;

/// Where a batch of rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// CRM (Salesforce) export: client master data, optionally with AUM.
    #[serde(rename = "CRM")]
    Crm,
    /// PMS (Wealth Spectrum) export: valuations or transactions.
    #[serde(rename = "PMS")]
    Pms,
    /// Dashboard upload template: one client and one valuation per row.
    #[serde(rename = "upload")]
    Upload,
}

impl SourceKind {
    /// Spelling used in configuration files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Crm => "CRM",
            SourceKind::Pms => "PMS",
            SourceKind::Upload => "upload",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crm" | "salesforce" => Ok(SourceKind::Crm),
            "pms" | "wealth-spectrum" | "wealthspectrum" => Ok(SourceKind::Pms),
            "upload" => Ok(SourceKind::Upload),
            _ => Err(LoadError::Parse(format!("unknown source '{s}'"))),
        }
    }
}

/// Which table a PMS export holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PmsTable {
    /// Periodic valuations.
    #[default]
    Snapshots,
    /// Transactions.
    Cashflows,
}

impl FromStr for PmsTable {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshots" | "performance" | "valuations" => Ok(PmsTable::Snapshots),
            "cashflows" | "transactions" => Ok(PmsTable::Cashflows),
            _ => Err(LoadError::Parse(format!("unknown PMS table '{s}'"))),
        }
    }
}

/// Options for one call to [`load`](crate::load::load).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Source system.
    pub source: SourceKind,

    /// `chrono` format tried before ISO 8601.
    #[serde(default)]
    pub date_format: Option<String>,

    /// Policy for rows that collide with an existing key.
    #[serde(default)]
    pub merge_mode: MergeMode,

    /// Table held by a PMS export.
    #[serde(default)]
    pub pms_table: PmsTable,

    /// As-of date for upload rows that carry none.
    #[serde(default)]
    pub default_as_of: Option<Date>,

    /// Extra header aliases: source header to canonical field name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Allowed corpus reconciliation difference, in currency units.
    #[serde(default = "default_tolerance")]
    pub reconciliation_tolerance: Decimal,
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

impl MappingConfig {
    /// Defaults for `source`.
    #[must_use]
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            date_format: None,
            merge_mode: MergeMode::default(),
            pms_table: PmsTable::default(),
            default_as_of: None,
            aliases: BTreeMap::new(),
            reconciliation_tolerance: default_tolerance(),
        }
    }

    /// Sets the date format.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Sets the merge mode.
    #[must_use]
    pub fn with_merge_mode(mut self, mode: MergeMode) -> Self {
        self.merge_mode = mode;
        self
    }

    /// Sets the PMS table.
    #[must_use]
    pub fn with_pms_table(mut self, table: PmsTable) -> Self {
        self.pms_table = table;
        self
    }

    /// Sets the fallback as-of date for upload rows.
    #[must_use]
    pub fn with_default_as_of(mut self, date: Date) -> Self {
        self.default_as_of = Some(date);
        self
    }

    /// Adds a header alias.
    #[must_use]
    pub fn with_alias(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.aliases.insert(header.into(), field.into());
        self
    }

    /// Sets the reconciliation tolerance.
    #[must_use]
    pub fn with_reconciliation_tolerance(mut self, tolerance: Decimal) -> Self {
        self.reconciliation_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_spellings() {
        let config: MappingConfig = serde_json::from_str(
            r#"{"source": "PMS", "date_format": "%d/%m/%Y", "merge_mode": "skip-duplicates"}"#,
        )
        .unwrap();
        assert_eq!(config.source, SourceKind::Pms);
        assert_eq!(config.merge_mode, MergeMode::SkipDuplicates);
        assert_eq!(config.pms_table, PmsTable::Snapshots);
        assert_eq!(config.reconciliation_tolerance, Decimal::new(1, 2));

        let upload: MappingConfig = serde_json::from_str(r#"{"source": "upload"}"#).unwrap();
        assert_eq!(upload.source, SourceKind::Upload);
        assert_eq!(upload.merge_mode, MergeMode::Merge);
        assert!(serde_json::from_str::<MappingConfig>(r#"{"source": "crm"}"#).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("crm".parse::<SourceKind>().unwrap(), SourceKind::Crm);
        assert_eq!("Transactions".parse::<PmsTable>().unwrap(), PmsTable::Cashflows);
    }
}
