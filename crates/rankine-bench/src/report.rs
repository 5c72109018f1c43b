//! Benchmark result table and JSON report emission.

use rankine_common::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Metrics for one structure on one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    /// Structure and configuration, e.g. `B-Tree (page=128)`.
    pub name: String,
    /// Wall-clock bulk-load time in milliseconds.
    pub build_time_ms: f64,
    /// Mean lookup latency in nanoseconds.
    pub avg_lookup_ns: f64,
    /// Structure footprint in mebibytes.
    pub size_mb: f64,
    /// Mean absolute rank error against the oracle (0 for exact structures).
    pub avg_error: f64,
}

/// Results for every dataset, keyed by dataset label.
pub type ResultSet = BTreeMap<String, Vec<BenchmarkResult>>;

/// Prints one dataset's results as an aligned table.
pub fn print_results(dataset: &str, num_records: usize, results: &[BenchmarkResult]) {
    let rule = "=".repeat(100);
    println!("\n{}", rule);
    println!("DATASET: {} ({} records)", dataset, num_records);
    println!("{}", rule);
    println!(
        "{:<35}{:>15}{:>15}{:>15}{:>15}",
        "Configuration", "Build (ms)", "Lookup (ns)", "Size (MB)", "Avg Error"
    );
    println!("{}", "-".repeat(100));
    for r in results {
        println!(
            "{:<35}{:>15.2}{:>15.2}{:>15.2}{:>15.1}",
            r.name, r.build_time_ms, r.avg_lookup_ns, r.size_mb, r.avg_error
        );
    }
    println!("{}", rule);
}

/// Writes the full result set as pretty-printed JSON.
pub fn save_results_json(results: &ResultSet, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), results)?;
    Ok(())
}
