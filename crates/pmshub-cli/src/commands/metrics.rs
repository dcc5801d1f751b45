//! Metrics command implementation.
//!
//! Computes performance metrics for every client, one client, or each
//! group of a partition of the book.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use pmshub_config::AppConfig;
use pmshub_core::{ClientId, Dataset};
use pmshub_metrics::{MetricOutcome, MetricResult, MetricsCache};
use pmshub_portfolio::{partition, GroupBy};

use crate::cli::OutputFormat;
use crate::commands::{load_book, parse_metrics, resolve_benchmark};
use crate::error::CliError;
use crate::output::{print_output, print_single};

/// Arguments for the metrics command.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Directory holding the exports
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Only this client
    #[arg(long, conflicts_with = "group_by")]
    pub client: Option<String>,

    /// Compute per group instead of per client: rm, category, risk or city
    #[arg(long)]
    pub group_by: Option<GroupBy>,

    /// Benchmark CSV (date, level); defaults to benchmark.csv in the data dir
    #[arg(long)]
    pub benchmark: Option<PathBuf>,

    /// Comma-separated metrics, or "standard" / "all"
    #[arg(long, default_value = "standard")]
    pub metrics: String,
}

#[derive(Debug, Serialize, Tabled)]
struct MetricRow {
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl From<&MetricResult> for MetricRow {
    fn from(result: &MetricResult) -> Self {
        let note = match &result.outcome {
            MetricOutcome::Value { window, .. } => {
                format!("{} to {}, {} obs", window.start, window.end, window.observations)
            }
            MetricOutcome::InsufficientData { reason } => format!("insufficient data: {reason}"),
            MetricOutcome::NonConvergent { iterations, residual } => {
                format!("no convergence after {iterations} iterations (residual {residual:.2e})")
            }
            MetricOutcome::Undefined { reason } => format!("undefined: {reason}"),
        };
        Self {
            subject: result.subject.to_string(),
            metric: result.metric.to_string(),
            value: result.outcome.to_string(),
            note,
        }
    }
}

/// Execute the metrics command.
pub fn execute(args: MetricsArgs, format: OutputFormat, config: &AppConfig) -> Result<()> {
    let metrics = parse_metrics(&args.metrics)?;
    let book = load_book(&args.data_dir, config)?;
    let benchmark = resolve_benchmark(args.benchmark.as_ref(), &book)?;
    if benchmark.is_none() && metrics.iter().any(|m| m.needs_benchmark()) {
        tracing::warn!("no benchmark available; benchmark-relative metrics will be N/A");
    }

    let cache = MetricsCache::new(config.metrics.clone(), config.view.cache_capacity);
    let dataset: &Dataset = &book.dataset;
    let mut results: Vec<MetricResult> = Vec::new();

    if let Some(group_by) = args.group_by {
        for (key, members) in partition(dataset, group_by) {
            let group_key = format!("{group_by}:{key}");
            results.extend(
                cache
                    .group_metrics(&group_key, &members, &metrics, benchmark.as_ref())?
                    .iter()
                    .cloned(),
            );
        }
    } else {
        let ids: Vec<ClientId> = match args.client {
            Some(ref id) => {
                let id = ClientId::new(id.as_str());
                if !dataset.client_ids().contains(&id) {
                    return Err(CliError::UnknownClient(id.to_string()).into());
                }
                vec![id]
            }
            None => dataset.client_ids().into_iter().collect(),
        };
        for id in &ids {
            results.extend(
                cache
                    .client_metrics(dataset, id, &metrics, benchmark.as_ref())?
                    .iter()
                    .cloned(),
            );
        }
    }

    let stats = cache.stats();
    tracing::debug!("metrics cache: {} hits, {} misses", stats.hits, stats.misses);

    match format {
        OutputFormat::Json => print_single(&results)?,
        _ => {
            let rows: Vec<MetricRow> = results.iter().map(MetricRow::from).collect();
            print_output(&rows, format)?;
        }
    }
    Ok(())
}
