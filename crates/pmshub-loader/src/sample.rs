//! Seeded sample data in the shape of the upload template and PMS exports.
//!
//! The same seed always yields the same rows, so demos and tests can rely on
//! exact figures.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

use pmshub_core::Date;

use crate::error::{LoadError, LoadResult};
use crate::raw::{RawRow, RawValue};

/// Upload template file written by [`SampleData::write_csv`].
pub const UPLOAD_FILE: &str = "upload.csv";
/// PMS valuation export file.
pub const SNAPSHOTS_FILE: &str = "pms_snapshots.csv";
/// PMS transaction export file.
pub const CASHFLOWS_FILE: &str = "pms_cashflows.csv";
/// Benchmark level file.
pub const BENCHMARK_FILE: &str = "benchmark.csv";
/// Name given to the sample benchmark.
pub const BENCHMARK_NAME: &str = "NIFTY 50";

const FIRST_NAMES: [&str; 15] = [
    "Rajesh", "Priya", "Amit", "Sunita", "Vikram", "Meera", "Arjun", "Kavya", "Ravi", "Deepika",
    "Suresh", "Anita", "Kiran", "Pooja", "Manoj",
];
const LAST_NAMES: [&str; 15] = [
    "Sharma", "Patel", "Singh", "Kumar", "Agarwal", "Gupta", "Jain", "Shah", "Reddy", "Nair",
    "Iyer", "Chopra", "Malhotra", "Bansal", "Mittal",
];
const RMS: [(&str, &str); 5] = [
    ("RM01", "Rohit Sharma"),
    ("RM02", "Priya Nair"),
    ("RM03", "Amit Gupta"),
    ("RM04", "Sneha Patel"),
    ("RM05", "Vikash Kumar"),
];
const CITIES: [(&str, &str); 6] = [
    ("Mumbai", "Maharashtra"),
    ("Delhi", "Delhi"),
    ("Bangalore", "Karnataka"),
    ("Chennai", "Tamil Nadu"),
    ("Pune", "Maharashtra"),
    ("Hyderabad", "Telangana"),
];
const PROFESSIONS: [&str; 5] = ["Business Owner", "Doctor", "Salaried", "Professional", "Retired"];
const CATEGORIES: [(&str, f64); 4] = [("Equity", 0.4), ("Debt", 0.3), ("Hybrid", 0.2), ("Multi-Asset", 0.1)];
const RISK_PROFILES: [(&str, f64); 3] = [("Conservative", 0.3), ("Moderate", 0.5), ("Aggressive", 0.2)];

const UPLOAD_HEADERS: [&str; 17] = [
    "CLIENT ID",
    "CLIENT NAME",
    "AGE",
    "OCCUPATION",
    "CITY",
    "STATE",
    "RM ID",
    "RM NAME",
    "PORTFOLIO TYPE",
    "RISK PROFILE",
    "CLIENT SINCE",
    "AS OF DATE",
    "CURRENT AUM",
    "INITIAL CORPUS",
    "ADDITIONS",
    "WITHDRAWALS",
    "NET CORPUS",
];
const SNAPSHOT_HEADERS: [&str; 7] = [
    "client_id",
    "period_end_date",
    "ending_value",
    "initial_corpus",
    "additions",
    "withdrawals",
    "net_corpus",
];
const CASHFLOW_HEADERS: [&str; 4] = ["client_id", "transaction_date", "amount", "transaction_type"];

/// Generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    /// Number of clients.
    pub clients: usize,
    /// Number of monthly valuations per client.
    pub months: u32,
    /// RNG seed.
    pub seed: u64,
    /// Year of the first valuation.
    pub start_year: i32,
    /// Month of the first valuation; valuations fall on month ends.
    pub start_month: u32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            clients: 150,
            months: 24,
            seed: 42,
            start_year: 2023,
            start_month: 1,
        }
    }
}

/// A header row plus string cells, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleTable {
    /// Column headers.
    pub headers: Vec<&'static str>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
}

impl SampleTable {
    fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Rows as raw loader input, labelled like a CSV file would be.
    #[must_use]
    pub fn to_raw_rows(&self, label: &str) -> Vec<RawRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                let mut row = RawRow::new(format!("{label}:{}", i + 2));
                for (header, cell) in self.headers.iter().zip(cells) {
                    row.insert(*header, RawValue::from_field(cell));
                }
                row
            })
            .collect()
    }

    /// Writes the table as CSV.
    pub fn write_csv(&self, path: &Path) -> LoadResult<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Generated sample data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleData {
    /// Upload template: one row per client at the latest valuation.
    pub upload: SampleTable,
    /// PMS valuations: one row per client per month.
    pub snapshots: SampleTable,
    /// PMS transactions.
    pub cashflows: SampleTable,
    /// Benchmark levels on each month end.
    pub benchmark: Vec<(Date, f64)>,
}

/// Paths written by [`SampleData::write_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFiles {
    /// Upload template.
    pub upload: PathBuf,
    /// PMS valuations.
    pub snapshots: PathBuf,
    /// PMS transactions.
    pub cashflows: PathBuf,
    /// Benchmark levels.
    pub benchmark: PathBuf,
}

impl SampleData {
    /// Writes all four files into `dir`, creating it if needed.
    pub fn write_csv(&self, dir: &Path) -> LoadResult<SampleFiles> {
        std::fs::create_dir_all(dir)?;
        let files = SampleFiles {
            upload: dir.join(UPLOAD_FILE),
            snapshots: dir.join(SNAPSHOTS_FILE),
            cashflows: dir.join(CASHFLOWS_FILE),
            benchmark: dir.join(BENCHMARK_FILE),
        };
        self.upload.write_csv(&files.upload)?;
        self.snapshots.write_csv(&files.snapshots)?;
        self.cashflows.write_csv(&files.cashflows)?;

        let mut bench = SampleTable::new(&["date", "level"]);
        bench.rows = self
            .benchmark
            .iter()
            .map(|(d, level)| vec![d.to_string(), format!("{level:.2}")])
            .collect();
        bench.write_csv(&files.benchmark)?;

        log::info!(
            "wrote sample data to {}: {} clients, {} valuations, {} cashflows",
            dir.display(),
            self.upload.rows.len(),
            self.snapshots.rows.len(),
            self.cashflows.rows.len()
        );
        Ok(files)
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn pick_weighted<'a>(rng: &mut StdRng, items: &'a [(&'a str, f64)]) -> &'a str {
    let total: f64 = items.iter().map(|(_, w)| w).sum();
    let mut draw = rng.gen_range(0.0..total);
    for (item, weight) in items {
        if draw < *weight {
            return item;
        }
        draw -= weight;
    }
    items[items.len() - 1].0
}

fn money(x: f64) -> String {
    format!("{x:.2}")
}

/// Generates sample data.
///
/// Each client starts with one investment on the first month end, then
/// follows a market model against a random-walk benchmark, with occasional
/// top-ups and partial redemptions.
pub fn generate(config: &SampleConfig) -> LoadResult<SampleData> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let months = config.months.max(1);
    let start = Date::from_ymd(config.start_year, config.start_month, 1)?;

    let dates = (0..months)
        .map(|i| start.add_months(i as i32).map(|d| d.end_of_month()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut level: f64 = 18_000.0;
    let mut benchmark = Vec::with_capacity(dates.len());
    let mut bench_returns = Vec::with_capacity(dates.len());
    for (i, date) in dates.iter().enumerate() {
        let r = if i == 0 { 0.0 } else { rng.gen_range(-0.05..0.06) };
        level *= 1.0 + r;
        bench_returns.push(r);
        benchmark.push((*date, (level * 100.0).round() / 100.0));
    }

    let mut data = SampleData {
        upload: SampleTable::new(&UPLOAD_HEADERS),
        snapshots: SampleTable::new(&SNAPSHOT_HEADERS),
        cashflows: SampleTable::new(&CASHFLOW_HEADERS),
        benchmark,
    };

    for n in 1..=config.clients {
        let id = format!("CL_{n:04}");
        let name = format!("{} {}", pick(&mut rng, &FIRST_NAMES), pick(&mut rng, &LAST_NAMES));
        let (rm_id, rm_name) = *pick(&mut rng, &RMS);
        let (city, state) = *pick(&mut rng, &CITIES);
        let profession = *pick(&mut rng, &PROFESSIONS);
        let category = pick_weighted(&mut rng, &CATEGORIES);
        let risk = pick_weighted(&mut rng, &RISK_PROFILES);
        let age: u32 = rng.gen_range(25..76);
        let beta: f64 = rng.gen_range(0.7..1.3);
        let alpha: f64 = rng.gen_range(-0.003..0.008);

        let corpus = (rng.gen_range(5.0e5..5.0e7) / 1000.0_f64).round() * 1000.0;
        let mut value = corpus;
        let (mut additions, mut withdrawals) = (0.0_f64, 0.0_f64);
        data.cashflows
            .rows
            .push(vec![id.clone(), dates[0].to_string(), money(corpus), "Investment".into()]);

        for (i, date) in dates.iter().enumerate() {
            if i > 0 {
                let noise: f64 = rng.gen_range(-0.02..0.02);
                value *= 1.0 + alpha + beta * bench_returns[i] + noise;
                let flow_date = date.add_days(-10);
                if rng.gen_bool(0.15) {
                    let amount = (rng.gen_range(2.5e4..5.0e5) / 1000.0_f64).round() * 1000.0;
                    value += amount;
                    additions += amount;
                    data.cashflows
                        .rows
                        .push(vec![id.clone(), flow_date.to_string(), money(amount), "SIP".into()]);
                } else if rng.gen_bool(0.05) {
                    let amount = (value * rng.gen_range(0.02..0.10) / 1000.0).round() * 1000.0;
                    value -= amount;
                    withdrawals += amount;
                    data.cashflows.rows.push(vec![
                        id.clone(),
                        flow_date.to_string(),
                        money(-amount),
                        "Redemption".into(),
                    ]);
                }
            }
            let net = corpus + additions - withdrawals;
            data.snapshots.rows.push(vec![
                id.clone(),
                date.to_string(),
                money(value),
                money(corpus),
                money(additions),
                money(withdrawals),
                money(net),
            ]);
        }

        let last = dates[dates.len() - 1];
        data.upload.rows.push(vec![
            id,
            name,
            age.to_string(),
            profession.into(),
            city.into(),
            state.into(),
            rm_id.into(),
            rm_name.into(),
            category.into(),
            risk.into(),
            dates[0].to_string(),
            last.to_string(),
            money(value),
            money(corpus),
            money(additions),
            money(withdrawals),
            money(corpus + additions - withdrawals),
        ]);
    }

    log::debug!(
        "generated {} clients x {} months (seed {})",
        config.clients,
        months,
        config.seed
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SampleConfig {
        SampleConfig {
            clients: 5,
            months: 6,
            ..SampleConfig::default()
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(generate(&small()).unwrap(), generate(&small()).unwrap());
        let other = SampleConfig { seed: 7, ..small() };
        assert_ne!(generate(&small()).unwrap(), generate(&other).unwrap());
    }

    #[test]
    fn test_shape() {
        let data = generate(&small()).unwrap();
        assert_eq!(data.upload.rows.len(), 5);
        assert_eq!(data.snapshots.rows.len(), 30);
        assert_eq!(data.benchmark.len(), 6);
        assert!(data.cashflows.rows.len() >= 5);
        assert!(data.upload.rows.iter().all(|r| r.len() == UPLOAD_HEADERS.len()));
        assert_eq!(data.benchmark[1].0, Date::from_ymd(2023, 2, 28).unwrap());
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let files = generate(&small()).unwrap().write_csv(dir.path()).unwrap();
        assert!(files.upload.exists());
        assert!(files.benchmark.exists());
    }
}
