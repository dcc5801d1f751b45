//! PMS Hub CLI - portfolio reporting from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Generate a sample book
//! pmshub sample --clients 150 --months 24 --out-dir data
//!
//! # Validate an export and list rejected rows
//! pmshub load --file data/upload.csv --source upload
//!
//! # Equity clients of one RM above 50 L
//! pmshub filter --data-dir data --rm RM01 --category equity --min-aum 5000000
//!
//! # Metrics per RM against the bundled benchmark
//! pmshub metrics --data-dir data --group-by rm --metrics all
//!
//! # Per-client CSV report
//! pmshub report --data-dir data --out report.csv
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pmshub_config::{apply_assignments, AppConfig};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match (cli.quiet, cli.verbose) {
            (true, _) => "warn",
            (false, true) => "debug",
            (false, false) => "info",
        })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_assignments(&mut config, cli.set.iter().map(String::as_str))?;
    tracing::debug!("effective configuration: {config:?}");

    let format = cli.format;
    match cli.command {
        Commands::Sample(args) => commands::sample::execute(args, format)?,
        Commands::Load(args) => commands::load::execute(args, format, &config)?,
        Commands::Filter(args) => commands::filter::execute(args, format, &config)?,
        Commands::Metrics(args) => commands::metrics::execute(args, format, &config)?,
        Commands::Report(args) => commands::report::execute(args, &config)?,
        Commands::Config => commands::show_config(&config)?,
    }

    Ok(())
}
