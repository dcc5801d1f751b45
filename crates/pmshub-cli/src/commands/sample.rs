//! Sample command implementation.
//!
//! Writes a synthetic client book in the export layouts the loader reads.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use pmshub_loader::sample::{generate, SampleConfig};

use crate::cli::OutputFormat;
use crate::output::{print_output, print_success};

/// Arguments for the sample command.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Number of clients
    #[arg(long, default_value = "150")]
    pub clients: usize,

    /// Monthly valuations per client
    #[arg(long, default_value = "24")]
    pub months: u32,

    /// Directory to write the CSV files into
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Random seed; the same seed always gives the same book
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

#[derive(Debug, Serialize, Tabled)]
struct WrittenFile {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Rows")]
    rows: usize,
}

/// Execute the sample command.
pub fn execute(args: SampleArgs, format: OutputFormat) -> Result<()> {
    if args.clients == 0 || args.months == 0 {
        anyhow::bail!("--clients and --months must be positive");
    }
    let config = SampleConfig {
        clients: args.clients,
        months: args.months,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let data = generate(&config)?;
    let files = data
        .write_csv(&args.out_dir)
        .with_context(|| format!("writing {}", args.out_dir.display()))?;

    let written = [
        (files.upload, data.upload.rows.len()),
        (files.snapshots, data.snapshots.rows.len()),
        (files.cashflows, data.cashflows.rows.len()),
        (files.benchmark, data.benchmark.len()),
    ]
    .into_iter()
    .map(|(path, rows)| WrittenFile {
        file: path.display().to_string(),
        rows,
    })
    .collect::<Vec<_>>();

    print_output(&written, format)?;
    print_success(&format!(
        "{} clients x {} months written to {}",
        args.clients,
        args.months,
        args.out_dir.display()
    ));
    Ok(())
}
