//! End-to-end correctness of the learned index against an independent oracle
//! and the page-indexed tree baseline.
//!
//! Covers, per configuration: agreement with the oracle on arbitrary queries,
//! agreement with the baseline tree, exact ranks for every training key, the
//! upper-bound law, and monotonicity over a query sweep.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use rankine_btree::PagedTree;
use rankine_common::{sort_and_renumber, Record, RmiConfig, TreeConfig};
use rankine_rmi::RecursiveModelIndex;

const DATA_SEED: u64 = 42;
const QUERY_SEED: u64 = 1337;

/// Lognormal keys scaled by 1e9, sorted and renumbered.
fn lognormal_records(n: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let dist = LogNormal::new(0.0, 2.0).unwrap();
    let mut records: Vec<Record> = (0..n)
        .map(|i| Record::new(dist.sample(&mut rng) * 1e9, i))
        .collect();
    sort_and_renumber(&mut records);
    records
}

fn oracle(keys: &[f64], query: f64) -> usize {
    keys.partition_point(|&k| k < query)
}

/// Checks P1/P2/P4 plus the upper-bound law for one configuration.
fn check_configuration(records: &[Record], config: RmiConfig, num_queries: usize) {
    let keys: Vec<f64> = records.iter().map(|r| r.key).collect();
    let index = RecursiveModelIndex::bulk_load(config.clone(), records.to_vec()).unwrap();
    let baseline = PagedTree::bulk_load(records, TreeConfig::default());

    // Every training key resolves to its exact rank (first occurrence).
    for record in records {
        let expected = oracle(&keys, record.key);
        assert_eq!(
            index.lower_bound(record.key),
            expected,
            "training key {} with config {:?}",
            record.key,
            config.stage_sizes
        );
    }

    // Arbitrary queries: existing keys, perturbed keys, and far outliers all
    // agree with the oracle and with the baseline tree.
    let mut rng = StdRng::seed_from_u64(QUERY_SEED);
    for _ in 0..num_queries {
        let query = match rng.gen_range(0..4u32) {
            0 => keys[rng.gen_range(0..keys.len())],
            1 => keys[rng.gen_range(0..keys.len())] * rng.gen_range(0.5..1.5),
            2 => rng.gen_range(-1e9..1e12),
            _ => keys[rng.gen_range(0..keys.len())] + rng.gen_range(-10.0..10.0),
        };

        let expected = oracle(&keys, query);
        assert_eq!(index.lower_bound(query), expected, "query {}", query);
        assert_eq!(baseline.lower_bound(query), expected, "baseline {}", query);

        let hi = index.upper_bound(query);
        assert_eq!(hi, keys.partition_point(|&k| k <= query));
        assert!(hi >= expected);
    }

    // Below and above the key range.
    assert_eq!(index.lower_bound(keys[0] - 1.0), 0);
    assert_eq!(index.lower_bound(keys[keys.len() - 1] + 1.0), keys.len());
}

#[test]
fn linear_two_stage_agrees_with_oracle_and_baseline() {
    let records = lognormal_records(60_000);
    check_configuration(&records, RmiConfig::linear(vec![1, 100]), 5_000);
}

#[test]
fn linear_wide_leaf_stage() {
    let records = lognormal_records(60_000);
    check_configuration(&records, RmiConfig::linear(vec![1, 2000]), 5_000);
}

#[test]
fn linear_three_stage_hierarchy() {
    let records = lognormal_records(30_000);
    check_configuration(&records, RmiConfig::linear(vec![1, 10, 200]), 5_000);
}

#[test]
fn neural_root_two_stage() {
    let records = lognormal_records(12_000);
    let config = RmiConfig {
        stage_sizes: vec![1, 64],
        num_hidden_layers: 1,
        hidden_size: 8,
        ..Default::default()
    };
    check_configuration(&records, config, 3_000);
}

#[test]
fn neural_root_with_hidden_layer() {
    let records = lognormal_records(6_000);
    let config = RmiConfig {
        stage_sizes: vec![1, 32],
        num_hidden_layers: 2,
        hidden_size: 8,
        ..Default::default()
    };
    check_configuration(&records, config, 2_000);
}

#[test]
fn single_stage_root_only() {
    let records = lognormal_records(5_000);
    check_configuration(&records, RmiConfig::linear(vec![1]), 2_000);
}

#[test]
fn lower_bound_is_monotone_over_query_sweep() {
    let records = lognormal_records(30_000);
    let index =
        RecursiveModelIndex::bulk_load(RmiConfig::linear(vec![1, 100]), records.clone())
            .unwrap();

    let max_key = records.last().unwrap().key;
    let mut previous = 0;
    let steps = 20_000;
    for i in 0..steps {
        let query = max_key * 1.05 * i as f64 / steps as f64 - 1.0;
        let rank = index.lower_bound(query);
        assert!(rank >= previous, "monotonicity violated at query {}", query);
        previous = rank;
    }
    assert_eq!(index.lower_bound(max_key + 1.0), records.len());
}

#[test]
fn duplicate_heavy_dataset() {
    // Every key repeated 50 times: lower/upper bound bracket each run.
    let mut records = Vec::new();
    for i in 0..200 {
        for _ in 0..50 {
            records.push(Record::new(i as f64 * 3.0, 0));
        }
    }
    sort_and_renumber(&mut records);

    let index =
        RecursiveModelIndex::bulk_load(RmiConfig::linear(vec![1, 16]), records.clone())
            .unwrap();

    for i in 0..200 {
        let key = i as f64 * 3.0;
        assert_eq!(index.lower_bound(key), i * 50);
        assert_eq!(index.upper_bound(key), (i + 1) * 50);
    }
}

#[test]
fn rmi_and_baseline_agree_on_average_error_oracle() {
    // The engine's self-reported average error over training keys is zero
    // when every lookup is exact, which the correctness properties require
    // for distinct keys.
    let records = lognormal_records(20_000);
    let index =
        RecursiveModelIndex::bulk_load(RmiConfig::linear(vec![1, 100]), records).unwrap();
    assert_eq!(index.average_error(), 0.0);
}
