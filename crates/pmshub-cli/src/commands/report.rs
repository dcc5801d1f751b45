//! Report command implementation.
//!
//! Writes one CSV row per client: profile, latest AUM and each requested
//! metric, with "N/A" wherever a metric could not be computed.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use pmshub_config::AppConfig;
use pmshub_metrics::{MetricKind, MetricOutcome, MetricsCache};
use pmshub_portfolio::facts::ClientFacts;

use crate::commands::{load_book, parse_metrics, resolve_benchmark};
use crate::output::print_success;

/// Arguments for the report command.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory holding the exports
    #[arg(long)]
    pub data_dir: PathBuf,

    /// CSV file to write
    #[arg(long)]
    pub out: PathBuf,

    /// Benchmark CSV (date, level); defaults to benchmark.csv in the data dir
    #[arg(long)]
    pub benchmark: Option<PathBuf>,

    /// Comma-separated metrics, or "standard" / "all"
    #[arg(long, default_value = "standard")]
    pub metrics: String,
}

const NOT_AVAILABLE: &str = "N/A";

fn cell(outcome: &MetricOutcome) -> String {
    match outcome.as_value() {
        Some(value) => format!("{value:.6}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Execute the report command.
pub fn execute(args: ReportArgs, config: &AppConfig) -> Result<()> {
    let metrics = parse_metrics(&args.metrics)?;
    let book = load_book(&args.data_dir, config)?;
    let benchmark = resolve_benchmark(args.benchmark.as_ref(), &book)?;
    let cache = MetricsCache::new(config.metrics.clone(), config.view.cache_capacity);

    let mut writer = csv::Writer::from_path(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let mut header: Vec<String> = [
        "client_id",
        "name",
        "rm",
        "category",
        "risk_profile",
        "city",
        "aum",
        "valuation_date",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    header.extend(metrics.iter().map(|m: MetricKind| m.name().to_string()));
    writer.write_record(&header)?;

    let facts = ClientFacts::collect(&book.dataset);
    let mut unavailable = 0usize;
    for client in &facts {
        let results = cache.client_metrics(&book.dataset, &client.id, &metrics, benchmark.as_ref())?;
        let mut record = vec![
            client.id.to_string(),
            client.record.map(|r| r.name.clone()).unwrap_or_default(),
            client.rm().unwrap_or_default().to_string(),
            client.category().unwrap_or_default().to_string(),
            client.risk_profile().map(|r| r.as_str().to_string()).unwrap_or_default(),
            client.city().unwrap_or_default().to_string(),
            client.aum().map_or_else(|| NOT_AVAILABLE.to_string(), |a| a.round_dp(2).to_string()),
            client.valuation_date().map(|d| d.to_string()).unwrap_or_default(),
        ];
        for result in results.iter() {
            if !result.outcome.is_value() {
                unavailable += 1;
            }
            record.push(cell(&result.outcome));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    tracing::info!("{unavailable} metric values unavailable across {} clients", facts.len());
    print_success(&format!("wrote {} clients to {}", facts.len(), args.out.display()));
    Ok(())
}
