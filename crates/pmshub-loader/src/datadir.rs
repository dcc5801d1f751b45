//! Loading a directory of exports in one go.

use std::path::Path;

use pmshub_core::{BenchmarkSeries, Dataset};

use crate::audit::AuditSink;
use crate::error::LoadResult;
use crate::load::{load_with_audit, merge_into, reconcile_all, RejectedRow};
use crate::mapping::{MappingConfig, PmsTable, SourceKind};
use crate::reader::{read_benchmark_csv, read_csv_rows};
use crate::sample::{BENCHMARK_FILE, BENCHMARK_NAME, CASHFLOWS_FILE, SNAPSHOTS_FILE, UPLOAD_FILE};

/// CRM export file picked up by [`load_data_dir`].
pub const CRM_FILE: &str = "crm_clients.csv";

/// Everything read from a data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DataDir {
    /// Merged dataset.
    pub dataset: Dataset,
    /// Rejected rows across all files.
    pub rejected: Vec<RejectedRow>,
    /// Benchmark series, when `benchmark.csv` is present.
    pub benchmark: Option<BenchmarkSeries>,
    /// Files that were read.
    pub files: Vec<String>,
}

/// Loads every known export present in `dir`.
///
/// Files are applied in order CRM, upload, PMS valuations, PMS
/// transactions, each merged under `template.merge_mode`. Missing files are
/// skipped. `template` supplies date format, merge mode and tolerance; its
/// source and table are set per file.
pub fn load_data_dir(
    dir: impl AsRef<Path>,
    template: &MappingConfig,
    audit: &dyn AuditSink,
) -> LoadResult<DataDir> {
    let dir = dir.as_ref();
    let plan = [
        (CRM_FILE, SourceKind::Crm, PmsTable::Snapshots),
        (UPLOAD_FILE, SourceKind::Upload, PmsTable::Snapshots),
        (SNAPSHOTS_FILE, SourceKind::Pms, PmsTable::Snapshots),
        (CASHFLOWS_FILE, SourceKind::Pms, PmsTable::Cashflows),
    ];

    let mut dataset = Dataset::new();
    let mut rejected = Vec::new();
    let mut files = Vec::new();

    for (name, source, table) in plan {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        let mut config = template.clone();
        config.source = source;
        config.pms_table = table;

        let rows = read_csv_rows(&path)?;
        let report = load_with_audit(&rows, &config, audit)?;
        rejected.extend(report.rejected);
        let (merged, _) = merge_into(&dataset, report.dataset, config.merge_mode);
        dataset = merged;
        files.push(name.to_string());
    }
    reconcile_all(&mut dataset, template.reconciliation_tolerance);

    let bench_path = dir.join(BENCHMARK_FILE);
    let benchmark = if bench_path.exists() {
        files.push(BENCHMARK_FILE.to_string());
        Some(read_benchmark_csv(&bench_path, BENCHMARK_NAME)?)
    } else {
        None
    };

    log::info!(
        "data dir {}: {} clients, {} snapshots, {} cashflows, {} rejected",
        dir.display(),
        dataset.len(),
        dataset.snapshot_count(),
        dataset.cashflow_count(),
        rejected.len()
    );
    Ok(DataDir {
        dataset,
        rejected,
        benchmark,
        files,
    })
}
