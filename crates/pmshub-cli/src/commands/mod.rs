//! CLI command implementations.

pub mod filter;
pub mod load;
pub mod metrics;
pub mod report;
pub mod sample;

pub use filter::FilterArgs;
pub use load::LoadArgs;
pub use metrics::MetricsArgs;
pub use report::ReportArgs;
pub use sample::SampleArgs;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pmshub_config::AppConfig;
use pmshub_core::{BenchmarkSeries, Date};
use pmshub_loader::datadir::{load_data_dir, DataDir};
use pmshub_loader::audit::LogAuditSink;
use pmshub_loader::reader::read_benchmark_csv;
use pmshub_loader::SourceKind;
use pmshub_metrics::MetricSet;

use crate::error::{CliError, CliResult};
use crate::output::print_warning;

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s).map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Parses a plain decimal amount.
pub fn parse_amount(s: &str) -> CliResult<Decimal> {
    Decimal::from_str(s.trim().replace(',', "").as_str())
        .map_err(|_| CliError::InvalidAmount(s.to_string()))
}

/// Loads every export in `dir` with the configured loader defaults.
///
/// Rejected rows are summarized as a warning; they never fail the command.
pub fn load_book(dir: &Path, config: &AppConfig) -> Result<DataDir> {
    let template = config.loader.mapping(SourceKind::Upload);
    let data = load_data_dir(dir, &template, &LogAuditSink)
        .with_context(|| format!("loading {}", dir.display()))?;
    if data.files.is_empty() {
        anyhow::bail!("no export files found in {}", dir.display());
    }
    if !data.rejected.is_empty() {
        print_warning(&format!(
            "{} rows rejected while loading {}",
            data.rejected.len(),
            dir.display()
        ));
    }
    Ok(data)
}

/// The benchmark from `path` when given, otherwise the one in the data dir.
pub fn resolve_benchmark(path: Option<&PathBuf>, data: &DataDir) -> Result<Option<BenchmarkSeries>> {
    match path {
        Some(path) => {
            let name = path
                .file_stem()
                .map_or_else(|| "benchmark".to_string(), |s| s.to_string_lossy().into_owned());
            let series = read_benchmark_csv(path, &name)
                .with_context(|| format!("reading benchmark {}", path.display()))?;
            Ok(Some(series))
        }
        None => Ok(data.benchmark.clone()),
    }
}

/// Parses a `--metrics` list.
pub fn parse_metrics(list: &str) -> Result<MetricSet> {
    MetricSet::parse_list(list).with_context(|| format!("parsing metric list '{list}'"))
}

/// Prints the effective configuration as TOML.
pub fn show_config(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50,00,000").unwrap(), Decimal::new(5_000_000, 0));
        assert_eq!(parse_amount(" 1250.5 ").unwrap(), Decimal::new(12505, 1));
        assert!(matches!(parse_amount("ten lakh"), Err(CliError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-31").unwrap().to_string(), "2024-03-31");
        assert!(matches!(parse_date("31/03/2024"), Err(CliError::InvalidDate(_))));
    }
}
