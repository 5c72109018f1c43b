//! Rankine benchmark orchestrator.
//!
//! Builds the page-indexed tree baseline and a sweep of learned index
//! configurations over each requested dataset, measures build time, lookup
//! latency, size, and rank error against an oracle, prints a summary table
//! per dataset, and writes a JSON report.
//!
//! Usage:
//!     rankine-bench                              # 1M lognormal keys
//!     rankine-bench --lognormal 100000
//!     rankine-bench --csv nodes.csv --csv-column 1
//!     rankine-bench --nasa-log access_log_Jul95

mod dataset;
mod report;

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rankine_btree::PagedTree;
use rankine_common::{Record, Result, RmiConfig, TreeConfig};
use rankine_rmi::RecursiveModelIndex;
use report::{BenchmarkResult, ResultSet};
use std::path::PathBuf;
use std::time::Instant;

/// Fixed seed for query sampling.
const QUERY_SEED: u64 = 42;

/// Compare a learned ordered index against a page-indexed tree baseline.
#[derive(Parser)]
#[command(name = "rankine-bench")]
#[command(version)]
#[command(about = "Learned index vs. B-tree benchmark", long_about = None)]
struct Args {
    /// Number of synthetic lognormal records
    #[arg(long, default_value_t = 1_000_000)]
    lognormal: usize,

    /// Skip the synthetic lognormal dataset
    #[arg(long)]
    skip_lognormal: bool,

    /// Delimited text file to benchmark (keys read from --csv-column)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Zero-based column index holding the key
    #[arg(long, default_value_t = 1)]
    csv_column: usize,

    /// Treat the first CSV line as data rather than a header
    #[arg(long)]
    csv_no_header: bool,

    /// NASA-style web log to benchmark (keys are request timestamps)
    #[arg(long)]
    nasa_log: Option<PathBuf>,

    /// Cap on records loaded from files (0 = unlimited)
    #[arg(long, default_value_t = 1_000_000)]
    max_records: usize,

    /// Number of lookup queries per structure
    #[arg(long, default_value_t = 10_000)]
    queries: usize,

    /// Where to write the JSON report
    #[arg(long, default_value = "benchmark_results.json")]
    output: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut all_results = ResultSet::new();

    if !args.skip_lognormal {
        let records = dataset::generate_lognormal(args.lognormal);
        bench_dataset("Lognormal", &records, args, &mut all_results)?;
    }

    if let Some(path) = &args.csv {
        let records = dataset::load_csv_column(
            path,
            args.csv_column,
            !args.csv_no_header,
            ',',
            args.max_records,
        )?;
        bench_dataset("CSV", &records, args, &mut all_results)?;
    }

    if let Some(path) = &args.nasa_log {
        let records = dataset::load_nasa_logs(path, args.max_records)?;
        bench_dataset("NASA Web Logs", &records, args, &mut all_results)?;
    }

    report::save_results_json(&all_results, &args.output)?;
    info!("results saved to {}", args.output.display());
    Ok(())
}

fn bench_dataset(
    name: &str,
    records: &[Record],
    args: &Args,
    all_results: &mut ResultSet,
) -> Result<()> {
    if records.is_empty() {
        warn!("dataset {} produced no records, skipping", name);
        return Ok(());
    }

    let results = run_suite(records, args.queries)?;
    report::print_results(name, records.len(), &results);
    all_results.insert(format!("{} ({})", name, records.len()), results);
    Ok(())
}

/// Query keys drawn uniformly from the dataset.
fn sample_queries(records: &[Record], count: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(QUERY_SEED);
    (0..count)
        .map(|_| records[rng.gen_range(0..records.len())].key)
        .collect()
}

/// Benchmarks the baseline trees and the learned index sweep on one dataset.
fn run_suite(records: &[Record], num_queries: usize) -> Result<Vec<BenchmarkResult>> {
    let queries = sample_queries(records, num_queries);
    let keys: Vec<f64> = records.iter().map(|r| r.key).collect();

    let mut results = Vec::new();

    info!("benchmarking baseline trees");
    for page_size in [128, 256] {
        results.push(bench_tree(records, &queries, page_size));
    }

    info!("benchmarking learned indexes");
    let sweep = [
        (RmiConfig::linear(vec![1, 1000]), "Learned (1K, linear)"),
        (RmiConfig::with_stages(vec![1, 1000]), "Learned (1K, 1-layer)"),
        (RmiConfig::linear(vec![1, 10_000]), "Learned (10K, linear)"),
    ];
    for (config, name) in sweep {
        results.push(bench_rmi(records, &keys, &queries, config, name)?);
    }

    Ok(results)
}

fn bench_tree(records: &[Record], queries: &[f64], page_size: usize) -> BenchmarkResult {
    let start = Instant::now();
    let tree = PagedTree::bulk_load(records, TreeConfig::with_page_size(page_size));
    let build_time_ms = start.elapsed().as_secs_f64() * 1e3;

    let start = Instant::now();
    let mut checksum = 0usize;
    for &q in queries {
        checksum = checksum.wrapping_add(tree.lower_bound(q));
    }
    let elapsed = start.elapsed();
    std::hint::black_box(checksum);

    BenchmarkResult {
        name: format!("B-Tree (page={})", page_size),
        build_time_ms,
        avg_lookup_ns: elapsed.as_nanos() as f64 / queries.len().max(1) as f64,
        size_mb: tree.size_bytes() as f64 / (1024.0 * 1024.0),
        avg_error: 0.0,
    }
}

fn bench_rmi(
    records: &[Record],
    keys: &[f64],
    queries: &[f64],
    config: RmiConfig,
    name: &str,
) -> Result<BenchmarkResult> {
    let start = Instant::now();
    let index = RecursiveModelIndex::bulk_load(config, records.to_vec())?;
    let build_time_ms = start.elapsed().as_secs_f64() * 1e3;

    let start = Instant::now();
    let mut checksum = 0usize;
    for &q in queries {
        checksum = checksum.wrapping_add(index.lookup(q));
    }
    let elapsed = start.elapsed();
    std::hint::black_box(checksum);

    // Rank error against an independent oracle; the bounded search keeps
    // this at zero, so a nonzero value flags a correctness regression.
    let mut total_error = 0.0;
    for &q in queries {
        let found = index.lookup(q) as f64;
        let truth = keys.partition_point(|&k| k < q) as f64;
        total_error += (found - truth).abs();
    }

    Ok(BenchmarkResult {
        name: name.to_string(),
        build_time_ms,
        avg_lookup_ns: elapsed.as_nanos() as f64 / queries.len().max(1) as f64,
        size_mb: index.total_size_bytes() as f64 / (1024.0 * 1024.0),
        avg_error: total_error / queries.len().max(1) as f64,
    })
}
