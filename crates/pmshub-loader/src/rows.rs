//! Typed rows, one variant per source.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use pmshub_core::{
    CashflowEvent, ClientId, ClientRecord, Date, PortfolioSnapshot, RiskProfile, RmId,
};

use crate::coerce::Coercer;
use crate::error::{LoadError, LoadResult};
use crate::fields::{Field, HeaderMap};
use crate::mapping::{MappingConfig, PmsTable, SourceKind};
use crate::raw::{RawRow, RawValue};

/// Client attributes shared by CRM and upload rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientFields {
    /// Display name.
    pub name: Option<String>,
    /// Age.
    pub age: Option<u32>,
    /// Profession.
    pub profession: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// RM id.
    pub rm_id: Option<String>,
    /// RM name.
    pub rm_name: Option<String>,
    /// Portfolio category.
    pub category: Option<String>,
    /// Risk profile.
    pub risk_profile: Option<RiskProfile>,
    /// Inception date.
    pub inception_date: Option<Date>,
}

/// Corpus columns shared by PMS valuations and upload rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CorpusFields {
    /// Initial corpus.
    pub initial_corpus: Option<Decimal>,
    /// Additions.
    pub additions: Option<Decimal>,
    /// Withdrawals, as given.
    pub withdrawals: Option<Decimal>,
    /// Net corpus.
    pub net_corpus: Option<Decimal>,
}

/// CRM export row: client master data, optionally with an AUM figure.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmRow {
    /// Client id.
    pub client_id: ClientId,
    /// Client attributes.
    pub client: ClientFields,
    /// AUM date and amount, when both are present.
    pub aum: Option<(Date, Decimal)>,
}

/// PMS valuation row.
#[derive(Debug, Clone, PartialEq)]
pub struct PmsSnapshotRow {
    /// Client id.
    pub client_id: ClientId,
    /// Valuation date.
    pub as_of: Date,
    /// Ending value.
    pub aum: Decimal,
    /// Corpus columns.
    pub corpus: CorpusFields,
}

/// PMS transaction row.
#[derive(Debug, Clone, PartialEq)]
pub struct PmsCashflowRow {
    /// Client id.
    pub client_id: ClientId,
    /// Value date.
    pub date: Date,
    /// Signed amount, positive into the portfolio.
    pub amount: Decimal,
    /// Transaction type.
    pub label: Option<String>,
    /// Transaction id.
    pub transaction_id: Option<String>,
}

/// PMS export row.
#[derive(Debug, Clone, PartialEq)]
pub enum PmsRow {
    /// Valuation.
    Snapshot(PmsSnapshotRow),
    /// Transaction.
    Cashflow(PmsCashflowRow),
}

/// Upload template row: one client and its valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRow {
    /// Client id.
    pub client_id: ClientId,
    /// Client attributes.
    pub client: ClientFields,
    /// Valuation date (row value or the configured default).
    pub as_of: Date,
    /// Current AUM.
    pub aum: Decimal,
    /// Corpus columns.
    pub corpus: CorpusFields,
}

/// A validated, typed source row.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRow {
    /// From a CRM export.
    Crm(CrmRow),
    /// From a PMS export.
    Pms(PmsRow),
    /// From the upload template.
    Upload(UploadRow),
}

/// Data-model records produced by one row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowRecords {
    /// Client master record.
    pub client: Option<ClientRecord>,
    /// Valuation.
    pub snapshot: Option<PortfolioSnapshot>,
    /// Cashflow.
    pub cashflow: Option<CashflowEvent>,
}

impl SourceRow {
    /// Parses `row` according to `config`.
    ///
    /// # Errors
    ///
    /// `LoadError::Validation` for a missing required field,
    /// `LoadError::TypeCoercion` for an unparsable one.
    pub fn parse(row: &RawRow, headers: &HeaderMap, config: &MappingConfig) -> LoadResult<Self> {
        let cells = Cells {
            map: headers.resolve(row),
            coerce: Coercer::new(&row.row_id, config.date_format.as_deref()),
        };
        let client_id = cells.client_id()?;

        match (config.source, config.pms_table) {
            (SourceKind::Crm, _) => {
                let aum = match (cells.date(Field::AsOf)?, cells.decimal(Field::Aum)?) {
                    (Some(date), Some(amount)) => Some((date, amount)),
                    _ => None,
                };
                Ok(SourceRow::Crm(CrmRow {
                    client_id,
                    client: cells.client_fields()?,
                    aum,
                }))
            }
            (SourceKind::Pms, PmsTable::Snapshots) => Ok(SourceRow::Pms(PmsRow::Snapshot(PmsSnapshotRow {
                client_id,
                as_of: cells.required(Field::AsOf, Cells::date)?,
                aum: cells.required(Field::Aum, Cells::decimal)?,
                corpus: cells.corpus_fields()?,
            }))),
            (SourceKind::Pms, PmsTable::Cashflows) => Ok(SourceRow::Pms(PmsRow::Cashflow(PmsCashflowRow {
                client_id,
                date: cells.required(Field::FlowDate, Cells::date)?,
                amount: cells.required(Field::Amount, Cells::decimal)?,
                label: cells.text(Field::Label),
                transaction_id: cells.text(Field::TransactionId),
            }))),
            (SourceKind::Upload, _) => {
                let as_of = match cells.date(Field::AsOf)? {
                    Some(date) => date,
                    None => config.default_as_of.ok_or_else(|| {
                        LoadError::validation(
                            &row.row_id,
                            Field::AsOf.name(),
                            "missing and no default as-of date configured",
                        )
                    })?,
                };
                Ok(SourceRow::Upload(UploadRow {
                    client_id,
                    client: cells.client_fields()?,
                    as_of,
                    aum: cells.required(Field::Aum, Cells::decimal)?,
                    corpus: cells.corpus_fields()?,
                }))
            }
        }
    }

    /// Client id the row belongs to.
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        match self {
            SourceRow::Crm(r) => &r.client_id,
            SourceRow::Pms(PmsRow::Snapshot(r)) => &r.client_id,
            SourceRow::Pms(PmsRow::Cashflow(r)) => &r.client_id,
            SourceRow::Upload(r) => &r.client_id,
        }
    }

    /// Converts into data-model records.
    #[must_use]
    pub fn into_records(self) -> RowRecords {
        match self {
            SourceRow::Crm(row) => RowRecords {
                snapshot: row
                    .aum
                    .map(|(date, aum)| PortfolioSnapshot::new(row.client_id.clone(), date, aum)),
                client: Some(build_client(row.client_id, row.client)),
                cashflow: None,
            },
            SourceRow::Pms(PmsRow::Snapshot(row)) => RowRecords {
                snapshot: Some(build_snapshot(row.client_id, row.as_of, row.aum, row.corpus)),
                ..RowRecords::default()
            },
            SourceRow::Pms(PmsRow::Cashflow(row)) => {
                let mut event = CashflowEvent::new(row.client_id, row.date, row.amount);
                if let Some(label) = row.label {
                    event = event.with_label(label);
                }
                if let Some(txn) = row.transaction_id {
                    event = event.with_transaction_id(txn);
                }
                RowRecords {
                    cashflow: Some(event),
                    ..RowRecords::default()
                }
            }
            SourceRow::Upload(row) => RowRecords {
                snapshot: Some(build_snapshot(row.client_id.clone(), row.as_of, row.aum, row.corpus)),
                client: Some(build_client(row.client_id, row.client)),
                cashflow: None,
            },
        }
    }
}

fn build_client(id: ClientId, fields: ClientFields) -> ClientRecord {
    let mut record = ClientRecord::new(id, fields.name.unwrap_or_default());
    record.age = fields.age;
    record.profession = fields.profession;
    record.city = fields.city;
    record.state = fields.state;
    record.rm_id = fields.rm_id.map(RmId::new);
    record.rm_name = fields.rm_name;
    record.category = fields.category;
    record.risk_profile = fields.risk_profile;
    record.inception_date = fields.inception_date;
    record
}

fn build_snapshot(id: ClientId, as_of: Date, aum: Decimal, corpus: CorpusFields) -> PortfolioSnapshot {
    PortfolioSnapshot::new(id, as_of, aum).with_corpus(
        corpus.initial_corpus,
        corpus.additions,
        corpus.withdrawals,
        corpus.net_corpus,
    )
}

struct Cells<'r> {
    map: BTreeMap<Field, &'r RawValue>,
    coerce: Coercer<'r>,
}

impl Cells<'_> {
    fn required<T>(&self, field: Field, get: fn(&Self, Field) -> LoadResult<Option<T>>) -> LoadResult<T> {
        get(self, field)?.ok_or_else(|| {
            LoadError::validation(self.coerce.row(), field.name(), "required field is missing")
        })
    }

    fn client_id(&self) -> LoadResult<ClientId> {
        self.text(Field::ClientId).map(ClientId::new).ok_or_else(|| {
            LoadError::validation(self.coerce.row(), Field::ClientId.name(), "required field is missing")
        })
    }

    fn text(&self, field: Field) -> Option<String> {
        self.map.get(&field).and_then(|v| self.coerce.text(v))
    }

    fn decimal(&self, field: Field) -> LoadResult<Option<Decimal>> {
        self.map
            .get(&field)
            .map(|v| self.coerce.decimal(field, v))
            .transpose()
    }

    fn date(&self, field: Field) -> LoadResult<Option<Date>> {
        self.map.get(&field).map(|v| self.coerce.date(field, v)).transpose()
    }

    fn client_fields(&self) -> LoadResult<ClientFields> {
        Ok(ClientFields {
            name: self.text(Field::Name),
            age: self
                .map
                .get(&Field::Age)
                .map(|v| self.coerce.integer(Field::Age, v))
                .transpose()?,
            profession: self.text(Field::Profession),
            city: self.text(Field::City),
            state: self.text(Field::State),
            rm_id: self.text(Field::RmId),
            rm_name: self.text(Field::RmName),
            category: self.text(Field::Category),
            risk_profile: self
                .map
                .get(&Field::RiskProfile)
                .map(|v| self.coerce.risk_profile(Field::RiskProfile, v))
                .transpose()?,
            inception_date: self.date(Field::InceptionDate)?,
        })
    }

    fn corpus_fields(&self) -> LoadResult<CorpusFields> {
        Ok(CorpusFields {
            initial_corpus: self.decimal(Field::InitialCorpus)?,
            additions: self.decimal(Field::Additions)?,
            withdrawals: self.decimal(Field::Withdrawals)?,
            net_corpus: self.decimal(Field::NetCorpus)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(row: &RawRow, config: &MappingConfig) -> LoadResult<SourceRow> {
        SourceRow::parse(row, &HeaderMap::new(config).unwrap(), config)
    }

    #[test]
    fn test_upload_row() {
        let row = RawRow::new("upload.csv:2")
            .with("CLIENT ID", "C001")
            .with("CLIENT NAME", "Asha Rao")
            .with("AGE", "41")
            .with("RM NAME", "Vikram Shah")
            .with("RISK PROFILE", "aggressive")
            .with("CURRENT AUM (in crs.)", "1,50,000")
            .with("AS OF DATE", "2024-03-31");
        let SourceRow::Upload(upload) = parse(&row, &MappingConfig::new(SourceKind::Upload)).unwrap() else {
            panic!("expected upload row");
        };
        assert_eq!(upload.client_id, ClientId::new("C001"));
        assert_eq!(upload.client.age, Some(41));
        assert_eq!(upload.client.risk_profile, Some(RiskProfile::Aggressive));
        assert_eq!(upload.aum, dec!(150000));
    }

    #[test]
    fn test_upload_uses_default_as_of() {
        let row = RawRow::new("r").with("CLIENT ID", "C1").with("CURRENT AUM", "10");
        let err = parse(&row, &MappingConfig::new(SourceKind::Upload)).unwrap_err();
        assert!(matches!(err, LoadError::Validation { ref field, .. } if field == "as_of"));

        let date = Date::from_ymd(2024, 6, 30).unwrap();
        let config = MappingConfig::new(SourceKind::Upload).with_default_as_of(date);
        let SourceRow::Upload(upload) = parse(&row, &config).unwrap() else {
            panic!("expected upload row");
        };
        assert_eq!(upload.as_of, date);
    }

    #[test]
    fn test_missing_client_id_is_validation_error() {
        let row = RawRow::new("r").with("ending_value", "10").with("period_end_date", "2024-01-31");
        let err = parse(&row, &MappingConfig::new(SourceKind::Pms)).unwrap_err();
        assert_eq!(err, LoadError::validation("r", "client_id", "required field is missing"));
    }

    #[test]
    fn test_bad_amount_is_coercion_error() {
        let row = RawRow::new("r")
            .with("client_id", "C1")
            .with("period_end_date", "2024-01-31")
            .with("ending_value", "lots");
        let err = parse(&row, &MappingConfig::new(SourceKind::Pms)).unwrap_err();
        assert!(matches!(err, LoadError::TypeCoercion { ref field, .. } if field == "aum"));
    }

    #[test]
    fn test_pms_cashflow_row() {
        let config = MappingConfig::new(SourceKind::Pms).with_pms_table(PmsTable::Cashflows);
        let row = RawRow::new("r")
            .with("client_id", "C1")
            .with("transaction_date", "2024-02-15")
            .with("amount", "(5,000)")
            .with("transaction_type", "Redemption")
            .with("Transaction ID", "TXN-42");
        let records = parse(&row, &config).unwrap().into_records();
        let event = records.cashflow.unwrap();
        assert_eq!(event.amount, dec!(-5000));
        assert_eq!(event.label.as_deref(), Some("Redemption"));
        assert_eq!(event.transaction_id.as_deref(), Some("TXN-42"));
        assert!(records.client.is_none());
    }

    #[test]
    fn test_crm_row_with_aum() {
        let row = RawRow::new("r")
            .with("Account__c", "C1")
            .with("Name", "Meera Iyer")
            .with("Owner.Name", "Priya Nair")
            .with("AUM_Amount__c", RawValue::Float(2_500_000.0))
            .with("AUM_Date__c", "2024-03-31");
        let records = parse(&row, &MappingConfig::new(SourceKind::Crm)).unwrap().into_records();
        assert_eq!(records.client.unwrap().rm_name.as_deref(), Some("Priya Nair"));
        assert_eq!(records.snapshot.unwrap().aum, dec!(2500000));
    }
}
