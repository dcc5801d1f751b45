//! Filter command implementation.
//!
//! Applies dashboard filters to a data directory and prints the aggregates
//! of the matching clients.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use pmshub_config::AppConfig;
use pmshub_portfolio::aggregate::Aggregates;
use pmshub_portfolio::bucketing::Distribution;
use pmshub_portfolio::facts::ClientFacts;
use pmshub_portfolio::{FilterField, FilterSpec, Predicate, ViewCache};

use crate::cli::OutputFormat;
use crate::commands::{load_book, parse_amount, parse_date};
use crate::output::{format_inr, print_header, print_output, print_single, KeyValue};

/// Arguments for the filter command.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Directory holding the exports
    #[arg(long)]
    pub data_dir: PathBuf,

    /// RM id or name (repeatable)
    #[arg(long)]
    pub rm: Vec<String>,

    /// Portfolio category (repeatable)
    #[arg(long)]
    pub category: Vec<String>,

    /// Risk profile (repeatable)
    #[arg(long)]
    pub risk: Vec<String>,

    /// City (repeatable)
    #[arg(long)]
    pub city: Vec<String>,

    /// Minimum latest AUM, inclusive
    #[arg(long)]
    pub min_aum: Option<String>,

    /// Maximum latest AUM, inclusive
    #[arg(long)]
    pub max_aum: Option<String>,

    /// Earliest latest-valuation date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest latest-valuation date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Also list the matching clients
    #[arg(long)]
    pub clients: bool,
}

impl FilterArgs {
    /// The filter these arguments describe.
    pub fn spec(&self) -> Result<FilterSpec> {
        let mut predicates = Vec::new();
        for (field, values) in [
            (FilterField::Rm, &self.rm),
            (FilterField::Category, &self.category),
            (FilterField::RiskProfile, &self.risk),
            (FilterField::City, &self.city),
        ] {
            if !values.is_empty() {
                predicates.push(Predicate::one_of(field, values.iter().cloned()));
            }
        }

        let min = self.min_aum.as_deref().map(parse_amount).transpose()?;
        let max = self.max_aum.as_deref().map(parse_amount).transpose()?;
        if min.is_some() || max.is_some() {
            predicates.push(Predicate::between(FilterField::Aum, min, max));
        }

        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        if from.is_some() || to.is_some() {
            predicates.push(Predicate::between(FilterField::ValuationDate, from, to));
        }

        Ok(FilterSpec::new(predicates)?)
    }
}

#[derive(Debug, Serialize, Tabled)]
struct BucketRow {
    #[tabled(rename = "Dimension")]
    dimension: &'static str,
    #[tabled(rename = "Bucket")]
    bucket: String,
    #[tabled(rename = "Clients")]
    clients: usize,
    #[tabled(rename = "Total AUM")]
    total_aum: String,
    #[tabled(rename = "Average AUM")]
    average_aum: String,
    #[tabled(rename = "Weight %")]
    weight_pct: String,
}

#[derive(Debug, Serialize, Tabled)]
struct ClientRow {
    #[tabled(rename = "Client")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "RM")]
    rm: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "AUM")]
    aum: String,
    #[tabled(rename = "As of")]
    as_of: String,
}

impl From<&ClientFacts<'_>> for ClientRow {
    fn from(facts: &ClientFacts<'_>) -> Self {
        let dash = || "-".to_string();
        Self {
            id: facts.id.to_string(),
            name: facts.record.map_or_else(dash, |r| r.name.clone()),
            rm: facts.rm().map_or_else(dash, str::to_string),
            category: facts.category().map_or_else(dash, str::to_string),
            risk: facts.risk_profile().map_or_else(dash, |r| r.as_str().to_string()),
            city: facts.city().map_or_else(dash, str::to_string),
            aum: facts.aum().map_or_else(dash, |a| a.round_dp(2).to_string()),
            as_of: facts.valuation_date().map_or_else(dash, |d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct FilterReport<'a> {
    filter: String,
    aggregates: &'a Aggregates,
    #[serde(skip_serializing_if = "Option::is_none")]
    clients: Option<Vec<ClientRow>>,
}

fn bucket_rows(aggregates: &Aggregates) -> Vec<BucketRow> {
    let dimensions: [(&'static str, &Distribution); 5] = [
        ("category", &aggregates.by_category),
        ("rm", &aggregates.by_rm),
        ("risk_profile", &aggregates.by_risk_profile),
        ("city", &aggregates.by_city),
        ("aum_band", &aggregates.by_aum_band),
    ];
    let mut rows = Vec::new();
    for (dimension, distribution) in dimensions {
        for (bucket, metrics) in distribution.sorted_by_weight() {
            rows.push(BucketRow {
                dimension,
                bucket: bucket.to_string(),
                clients: metrics.count,
                total_aum: metrics.total_aum.round_dp(2).to_string(),
                average_aum: metrics.average_aum.round_dp(2).to_string(),
                weight_pct: format!("{:.2}", metrics.weight_pct),
            });
        }
    }
    rows
}

/// Execute the filter command.
pub fn execute(args: FilterArgs, format: OutputFormat, config: &AppConfig) -> Result<()> {
    let spec = args.spec()?;
    let book = load_book(&args.data_dir, config)?;
    let views = ViewCache::new(config.view.aum_bands.clone(), config.view.cache_capacity);
    let view = views.apply(&book.dataset, &spec);
    let aggregates = &view.aggregates;
    tracing::info!("filter [{spec}]: {} of {} clients", aggregates.client_count, book.dataset.len());

    let clients = args.clients.then(|| {
        ClientFacts::collect(&view.dataset)
            .iter()
            .map(ClientRow::from)
            .collect::<Vec<_>>()
    });

    match format {
        OutputFormat::Json => print_single(&FilterReport {
            filter: spec.to_string(),
            aggregates,
            clients,
        })?,
        OutputFormat::Csv => match clients {
            Some(rows) => print_output(&rows, format)?,
            None => print_output(&bucket_rows(aggregates), format)?,
        },
        OutputFormat::Table => {
            print_header(&format!("Filter: {spec}"));
            if aggregates.no_data {
                println!("No clients match.");
                return Ok(());
            }
            let aum = &aggregates.aum;
            let corpus = &aggregates.corpus;
            let optional = |v: Option<rust_decimal::Decimal>| v.map_or_else(|| "-".to_string(), format_inr);
            let summary = vec![
                KeyValue::new("Clients", aggregates.client_count),
                KeyValue::new("Clients with AUM", aum.valued_clients),
                KeyValue::new("Total AUM", format_inr(aum.total)),
                KeyValue::new("Average AUM", format_inr(aum.average)),
                KeyValue::new("Median AUM", optional(aum.median)),
                KeyValue::new("Min AUM", optional(aum.min)),
                KeyValue::new("Max AUM", optional(aum.max)),
                KeyValue::new("Initial corpus", format_inr(corpus.initial)),
                KeyValue::new("Additions", format_inr(corpus.additions)),
                KeyValue::new("Withdrawals", format_inr(corpus.withdrawals)),
                KeyValue::new("Net corpus", format_inr(corpus.net)),
                KeyValue::new("Flagged snapshots", aggregates.flagged_snapshots),
            ];
            print_output(&summary, format)?;
            print_header("Breakdown");
            print_output(&bucket_rows(aggregates), format)?;
            if let Some(rows) = clients {
                print_header("Clients");
                print_output(&rows, format)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: FilterArgs,
    }

    #[test]
    fn test_spec_from_arguments() {
        let harness = Harness::parse_from([
            "filter",
            "--data-dir",
            "data",
            "--rm",
            "RM01",
            "--rm",
            "RM02",
            "--risk",
            "aggressive",
            "--min-aum",
            "5000000",
            "--from",
            "2024-01-01",
        ]);
        let spec = harness.args.spec().unwrap();
        assert_eq!(spec.len(), 4);
        let text = spec.to_string();
        assert!(text.contains("aum >= 5000000"), "{text}");
        assert!(text.contains("risk_profile"), "{text}");
    }

    #[test]
    fn test_no_arguments_is_everything() {
        let harness = Harness::parse_from(["filter", "--data-dir", "data"]);
        assert!(harness.args.spec().unwrap().is_empty());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let harness = Harness::parse_from([
            "filter", "--data-dir", "data", "--min-aum", "10", "--max-aum", "5",
        ]);
        assert!(harness.args.spec().is_err());
    }
}
