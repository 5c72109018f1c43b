//! Dataset producers.
//!
//! Every producer returns records sorted ascending by key with positions
//! renumbered to final ranks, which is the contract the index structures
//! expect from their data source.

use chrono::DateTime;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal};
use rankine_common::{sort_and_renumber, Record, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Fixed seed so benchmark datasets are identical across runs.
const DATA_SEED: u64 = 42;

/// Timestamp layout inside NASA web log brackets, e.g.
/// `01/Jul/1995:00:00:01 -0400`.
const NASA_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Generates `n` samples from LogNormal(0, 2) scaled by 1e9.
pub fn generate_lognormal(n: usize) -> Vec<Record> {
    info!("generating {} lognormal samples", n);
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let dist = LogNormal::new(0.0, 2.0).expect("lognormal parameters are valid");

    let mut records: Vec<Record> = (0..n)
        .map(|i| Record::new(dist.sample(&mut rng) * 1e9, i))
        .collect();
    sort_and_renumber(&mut records);
    records
}

/// Loads one numeric column from a delimited text file.
///
/// Rows whose field is missing or unparseable are skipped. `max_records` of
/// 0 means no cap.
pub fn load_csv_column(
    path: &Path,
    column: usize,
    has_header: bool,
    delimiter: char,
    max_records: usize,
) -> Result<Vec<Record>> {
    info!("loading column {} of {}", column, path.display());
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    if has_header {
        if let Some(header) = lines.next() {
            header?;
        }
    }

    let mut records = Vec::new();
    for line in lines {
        if max_records != 0 && records.len() >= max_records {
            break;
        }
        let line = line?;
        let Some(field) = line.split(delimiter).nth(column) else {
            continue;
        };
        if let Ok(value) = field.trim().parse::<f64>() {
            records.push(Record::new(value, records.len()));
        }
    }

    info!("loaded {} records from {}", records.len(), path.display());
    sort_and_renumber(&mut records);
    Ok(records)
}

/// Loads request timestamps from a NASA-style web server log.
///
/// Each line carries a bracketed timestamp such as
/// `[01/Jul/1995:00:00:01 -0400]`; it is converted to Unix epoch seconds.
/// Malformed lines are skipped. `max_records` of 0 means no cap.
pub fn load_nasa_logs(path: &Path, max_records: usize) -> Result<Vec<Record>> {
    info!("loading web log {}", path.display());
    let reader = BufReader::new(File::open(path)?);

    let mut records = Vec::new();
    for line in reader.lines() {
        if max_records != 0 && records.len() >= max_records {
            break;
        }
        let line = line?;
        if let Some(epoch) = parse_log_timestamp(&line) {
            records.push(Record::new(epoch as f64, records.len()));
        }
    }

    info!("loaded {} records from {}", records.len(), path.display());
    sort_and_renumber(&mut records);
    Ok(records)
}

/// Extracts the bracketed timestamp from one log line, if present and valid.
fn parse_log_timestamp(line: &str) -> Option<i64> {
    let start = line.find('[')?;
    let end = line[start..].find(']')? + start;
    let stamp = &line[start + 1..end];
    DateTime::parse_from_str(stamp, NASA_TIMESTAMP_FORMAT)
        .ok()
        .map(|ts| ts.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn is_sorted_and_renumbered(records: &[Record]) -> bool {
        records.windows(2).all(|w| w[0].key <= w[1].key)
            && records.iter().enumerate().all(|(i, r)| r.position == i)
    }

    #[test]
    fn test_lognormal_is_sorted_and_deterministic() {
        let a = generate_lognormal(1000);
        let b = generate_lognormal(1000);

        assert_eq!(a.len(), 1000);
        assert!(is_sorted_and_renumbered(&a));
        assert!(a.iter().all(|r| r.key > 0.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_lognormal_empty() {
        assert!(generate_lognormal(0).is_empty());
    }

    #[test]
    fn test_csv_column_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,lon,lat").unwrap();
        writeln!(file, "1,-80.19,25.76").unwrap();
        writeln!(file, "2,-81.38,28.54").unwrap();
        writeln!(file, "3,not-a-number,0.0").unwrap();
        writeln!(file, "4,-80.84,35.22").unwrap();
        writeln!(file, "short-row").unwrap();

        let records = load_csv_column(file.path(), 1, true, ',', 0).unwrap();

        assert_eq!(records.len(), 3);
        assert!(is_sorted_and_renumbered(&records));
        assert_eq!(records[0].key, -81.38);
        assert_eq!(records[2].key, -80.19);
    }

    #[test]
    fn test_csv_without_header_and_with_cap() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..10 {
            writeln!(file, "{}", 10 - i).unwrap();
        }

        let records = load_csv_column(file.path(), 0, false, ',', 4).unwrap();
        assert_eq!(records.len(), 4);
        assert!(is_sorted_and_renumbered(&records));
    }

    #[test]
    fn test_csv_missing_file() {
        let err = load_csv_column(Path::new("/nonexistent/file.csv"), 0, true, ',', 0);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_log_timestamp() {
        let line = "199.72.81.55 - - [01/Jul/1995:00:00:01 -0400] \"GET /history/ HTTP/1.0\" 200 6245";
        // 1995-07-01T00:00:01-04:00 == 1995-07-01T04:00:01Z.
        assert_eq!(parse_log_timestamp(line), Some(804_571_201));

        assert_eq!(parse_log_timestamp("no brackets here"), None);
        assert_eq!(parse_log_timestamp("[garbage timestamp]"), None);
    }

    #[test]
    fn test_nasa_log_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host - - [01/Jul/1995:00:00:09 -0400] \"GET /a HTTP/1.0\" 200 1"
        )
        .unwrap();
        writeln!(file, "malformed line without a timestamp").unwrap();
        writeln!(
            file,
            "host - - [01/Jul/1995:00:00:01 -0400] \"GET /b HTTP/1.0\" 200 2"
        )
        .unwrap();

        let records = load_nasa_logs(file.path(), 0).unwrap();

        assert_eq!(records.len(), 2);
        assert!(is_sorted_and_renumbered(&records));
        // Out-of-order log lines end up sorted by timestamp.
        assert_eq!(records[0].key, 804_571_201.0);
        assert_eq!(records[1].key, 804_571_209.0);
    }
}
