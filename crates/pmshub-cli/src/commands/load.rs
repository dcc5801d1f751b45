//! Load command implementation.
//!
//! Runs one export through the loader and reports what happened to each
//! row, without keeping the result.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::Tabled;

use pmshub_config::AppConfig;
use pmshub_core::MergeMode;
use pmshub_loader::audit::{AuditOutcome, MemoryAuditSink};
use pmshub_loader::reader::{read_csv_rows, read_json_rows};
use pmshub_loader::{load_with_audit, PmsTable, RejectedRow, SourceKind};

use crate::cli::OutputFormat;
use crate::commands::parse_date;
use crate::output::{print_header, print_output, print_single, KeyValue};

/// Arguments for the load command.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Export file (.csv or .json)
    #[arg(long)]
    pub file: PathBuf,

    /// Source system: crm, pms or upload
    #[arg(long)]
    pub source: SourceKind,

    /// PMS table: snapshots or cashflows
    #[arg(long)]
    pub table: Option<PmsTable>,

    /// Date format tried before ISO 8601, e.g. %d/%m/%Y
    #[arg(long)]
    pub date_format: Option<String>,

    /// Collision policy: overwrite, merge or skip-duplicates
    #[arg(long)]
    pub merge_mode: Option<MergeMode>,

    /// As-of date for upload rows without one (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct Rejection {
    #[tabled(rename = "Row")]
    row: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&RejectedRow> for Rejection {
    fn from(rejected: &RejectedRow) -> Self {
        Self {
            row: rejected.row_id.clone(),
            reason: rejected.error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoadSummary<'a> {
    file: String,
    source: SourceKind,
    rows: usize,
    accepted: usize,
    flagged: usize,
    clients: usize,
    snapshots: usize,
    cashflows: usize,
    audit: BTreeMap<&'static str, usize>,
    rejected: &'a [RejectedRow],
}

/// Execute the load command.
pub fn execute(args: LoadArgs, format: OutputFormat, config: &AppConfig) -> Result<()> {
    let mut mapping = config.loader.mapping(args.source);
    if let Some(table) = args.table {
        mapping = mapping.with_pms_table(table);
    }
    if let Some(date_format) = args.date_format {
        mapping = mapping.with_date_format(date_format);
    }
    if let Some(mode) = args.merge_mode {
        mapping = mapping.with_merge_mode(mode);
    }
    if let Some(ref as_of) = args.as_of {
        mapping = mapping.with_default_as_of(parse_date(as_of)?);
    }

    let is_json = args
        .file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rows = if is_json {
        read_json_rows(&args.file)
    } else {
        read_csv_rows(&args.file)
    }
    .with_context(|| format!("reading {}", args.file.display()))?;

    let audit = MemoryAuditSink::new();
    let report = load_with_audit(&rows, &mapping, &audit)?;
    tracing::info!(
        "{}: {} of {} rows accepted",
        args.file.display(),
        report.accepted,
        report.rows()
    );

    let outcomes = [
        AuditOutcome::Accepted,
        AuditOutcome::Flagged,
        AuditOutcome::Merged,
        AuditOutcome::Skipped,
        AuditOutcome::Rejected,
    ];
    let summary = LoadSummary {
        file: args.file.display().to_string(),
        source: args.source,
        rows: report.rows(),
        accepted: report.accepted,
        flagged: report.flagged,
        clients: report.dataset.len(),
        snapshots: report.dataset.snapshot_count(),
        cashflows: report.dataset.cashflow_count(),
        audit: outcomes.iter().map(|o| (o.as_str(), audit.count(*o))).collect(),
        rejected: &report.rejected,
    };
    let rejections: Vec<Rejection> = report.rejected.iter().map(Rejection::from).collect();

    match format {
        OutputFormat::Json => print_single(&summary)?,
        OutputFormat::Csv => print_output(&rejections, format)?,
        OutputFormat::Table => {
            print_header(&format!("Load: {} ({})", summary.file, summary.source));
            let mut items = vec![
                KeyValue::new("Rows", summary.rows),
                KeyValue::new("Accepted", summary.accepted),
                KeyValue::new("Rejected", rejections.len()),
                KeyValue::new("Flagged snapshots", summary.flagged),
                KeyValue::new("Clients", summary.clients),
                KeyValue::new("Snapshots", summary.snapshots),
                KeyValue::new("Cashflows", summary.cashflows),
            ];
            items.extend(
                summary
                    .audit
                    .iter()
                    .map(|(outcome, count)| KeyValue::new(format!("Audit: {outcome}"), count)),
            );
            print_output(&items, format)?;
            if !rejections.is_empty() {
                print_header("Rejected rows");
                print_output(&rejections, format)?;
            }
        }
    }
    Ok(())
}
