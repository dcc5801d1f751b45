//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands::{FilterArgs, LoadArgs, MetricsArgs, ReportArgs, SampleArgs};

/// PMS Hub - portfolio management reporting
#[derive(Parser)]
#[command(name = "pmshub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "PMSHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override a configuration value, e.g. metrics.risk_free_rate=0.065
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log debug detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a synthetic client book as CSV files
    Sample(SampleArgs),

    /// Load one export file and report accepted and rejected rows
    Load(LoadArgs),

    /// Filter the book and show aggregates
    Filter(FilterArgs),

    /// Compute performance metrics per client or per group
    Metrics(MetricsArgs),

    /// Write a per-client CSV report with AUM and metrics
    Report(ReportArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
