//! CSV and JSON row readers.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use pmshub_core::{BenchmarkSeries, Date};

use crate::error::{LoadError, LoadResult};
use crate::raw::{RawRow, RawValue};

fn label_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Reads every data row of a headed CSV file.
///
/// Row ids are `"<file name>:<line>"`. Empty fields become `Null`.
pub fn read_csv_rows(path: impl AsRef<Path>) -> LoadResult<Vec<RawRow>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
    read_csv_from(file, &label_of(path))
}

/// Reads headed CSV from any reader, labelling rows with `label`.
pub fn read_csv_from<R: Read>(input: R, label: &str) -> LoadResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(index as u64 + 2, csv::Position::line);
        let mut row = RawRow::new(format!("{label}:{line}"));
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header, RawValue::from_field(field));
        }
        rows.push(row);
    }
    log::debug!("read {} rows from {label}", rows.len());
    Ok(rows)
}

/// Reads a JSON array of objects.
///
/// Row ids are `"<file name>:<index>"`, 1-based.
pub fn read_json_rows(path: impl AsRef<Path>) -> LoadResult<Vec<RawRow>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
    read_json_str(&text, &label_of(path))
}

/// Parses a JSON array of objects, labelling rows with `label`.
pub fn read_json_str(json: &str, label: &str) -> LoadResult<Vec<RawRow>> {
    let objects: Vec<BTreeMap<String, RawValue>> = serde_json::from_str(json)?;
    Ok(objects
        .into_iter()
        .enumerate()
        .map(|(i, cells)| RawRow {
            row_id: format!("{label}:{}", i + 1),
            cells,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct BenchmarkRecord {
    date: String,
    #[serde(alias = "close", alias = "value")]
    level: f64,
}

/// Reads a `date,level` CSV into a benchmark series named `name`.
pub fn read_benchmark_csv(path: impl AsRef<Path>, name: &str) -> LoadResult<BenchmarkSeries> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;

    let mut points = Vec::new();
    for result in reader.deserialize() {
        let record: BenchmarkRecord = result?;
        points.push((Date::parse(&record.date)?, record.level));
    }
    Ok(BenchmarkSeries::new(name, points)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_rows() {
        let data = "CLIENT ID,CURRENT AUM,CITY\nC1, 1000 ,\nC2,2000,Pune\n";
        let rows = read_csv_from(data.as_bytes(), "upload.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_id, "upload.csv:2");
        assert_eq!(rows[0].cells["CURRENT AUM"], RawValue::from("1000"));
        assert_eq!(rows[0].cells["CITY"], RawValue::Null);
        assert_eq!(rows[1].cells["CITY"], RawValue::from("Pune"));
    }

    #[test]
    fn test_json_rows() {
        let rows = read_json_str(r#"[{"client_id": "C1", "amount": -500.5}]"#, "flows.json").unwrap();
        assert_eq!(rows[0].row_id, "flows.json:1");
        assert_eq!(rows[0].cells["amount"], RawValue::Float(-500.5));
        assert!(read_json_str("{}", "x").is_err());
    }

    #[test]
    fn test_benchmark_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2024-02-29,22000").unwrap();
        writeln!(file, "2024-01-31,21500.5").unwrap();
        let series = read_benchmark_csv(file.path(), "NIFTY 50").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].1, 21500.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_csv_rows("/nonexistent/pmshub/rows.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
