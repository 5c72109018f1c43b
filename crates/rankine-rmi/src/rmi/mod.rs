//! The staged recursive model index engine.
//!
//! Build routes training records top-down through the stages, trains each
//! model on the bucket it receives, and records per-model error bounds.
//! Lookup routes a query key through the same stages, clamps the leaf
//! prediction, and closes the remaining gap with a bounded binary search
//! over the sorted keys.

mod stage;

use crate::keys::KeyStore;
use crate::model::{LinearModel, Model, NeuralNetModel};
use log::debug;
use rankine_common::{sort_and_renumber, Record, Result, RmiConfig};
use serde::Serialize;
use stage::Stage;

/// Cap on the number of keys sampled by `average_error`.
const ERROR_SAMPLE_SIZE: usize = 10_000;

/// A recursive model index: a hierarchy of position models over a sorted key
/// array, built once from bulk data and immutable afterwards.
pub struct RecursiveModelIndex {
    config: RmiConfig,
    stages: Vec<Stage>,
    keys: KeyStore,
}

impl RecursiveModelIndex {
    /// Creates an empty index with the given configuration. All lookups
    /// return 0 until `build` is called.
    pub fn new(config: RmiConfig) -> Self {
        Self {
            config,
            stages: Vec::new(),
            keys: KeyStore::new(),
        }
    }

    /// Builds an index over `data` in one step.
    pub fn bulk_load(config: RmiConfig, data: Vec<Record>) -> Result<Self> {
        let mut index = Self::new(config);
        index.build(data)?;
        Ok(index)
    }

    /// Builds the hierarchy from bulk data.
    ///
    /// The data is sorted ascending by key and positions are rewritten to
    /// final ranks. Building on empty data yields an empty, queryable index.
    /// Rejects configurations whose `stage_sizes` is empty or does not start
    /// with a single root model.
    pub fn build(&mut self, mut data: Vec<Record>) -> Result<()> {
        self.config.validate()?;
        self.stages.clear();

        sort_and_renumber(&mut data);
        self.keys = KeyStore::from_records(&data);
        let total = data.len();
        if total == 0 {
            debug!("build on empty input: index stays empty");
            return Ok(());
        }

        let stage_sizes = self.config.stage_sizes.clone();
        let mut buckets: Vec<Vec<Record>> = vec![data];

        for (s, &num_models) in stage_sizes.iter().enumerate() {
            debug_assert_eq!(buckets.len(), num_models);
            let next_size = stage_sizes.get(s + 1).copied();

            let mut stage = Stage::with_capacity(num_models);
            let mut next_buckets: Vec<Vec<Record>> = match next_size {
                Some(size) => vec![Vec::new(); size],
                None => Vec::new(),
            };

            for bucket in &buckets {
                if bucket.is_empty() {
                    stage.push_placeholder();
                    continue;
                }

                let model = if s == 0 && self.config.num_hidden_layers > 0 {
                    Model::Neural(NeuralNetModel::fit(
                        self.config.hidden_size,
                        self.config.num_hidden_layers,
                        bucket,
                    ))
                } else {
                    Model::Linear(LinearModel::fit(bucket))
                };

                // Error bounds come from the raw predictions; routing uses
                // the clamped ones. Lookup repeats both, so the bounds
                // describe exactly the bucket a query key falls into.
                let mut min_error = f64::INFINITY;
                let mut max_error = f64::NEG_INFINITY;
                for record in bucket {
                    let prediction = model.predict(record.key);
                    let error = prediction - record.position as f64;
                    min_error = min_error.min(error);
                    max_error = max_error.max(error);

                    if let Some(size) = next_size {
                        next_buckets[route(prediction, total, size)].push(*record);
                    }
                }

                stage.push(model, min_error, max_error);
            }

            debug!("stage {}: {} models trained", s, stage.len());
            self.stages.push(stage);
            buckets = next_buckets;
        }

        Ok(())
    }

    /// Rank of `key`: the smallest index `i` with `keys[i] >= key`, or
    /// `len()` if every key is smaller. Synonym of `lower_bound`.
    pub fn lookup(&self, key: f64) -> usize {
        let total = self.keys.len();
        if total == 0 || self.stages.is_empty() {
            return 0;
        }

        let last = self.stages.len() - 1;
        let mut model_idx = 0;
        let mut prediction = 0.0;
        for (s, stage) in self.stages.iter().enumerate() {
            prediction = stage.models[model_idx].predict(key);
            if s < last {
                model_idx = route(prediction, total, self.stages[s + 1].len());
            }
        }

        let estimate = prediction.clamp(0.0, (total - 1) as f64) as usize;
        let min_error = self.stages[last].min_errors[model_idx];
        let max_error = self.stages[last].max_errors[model_idx];

        let start = (estimate as f64 + min_error).max(0.0) as usize;
        let end = ((estimate as f64 + max_error + 1.0).min(total as f64)) as usize;
        let (start, end) = if start >= end { (0, total) } else { (start, end) };

        let rank = self.keys.lower_bound_in(start, end, key);
        if self.is_true_rank(rank, key) {
            rank
        } else {
            // The error window can miss when the leaf's residuals are
            // asymmetric; the full-range search restores the guarantee.
            self.keys.lower_bound_in(0, total, key)
        }
    }

    /// First index whose key is `>= key` (first occurrence for duplicates).
    pub fn lower_bound(&self, key: f64) -> usize {
        self.lookup(key)
    }

    /// First index whose key is strictly greater than `key`.
    ///
    /// Duplicates are rare in practice, so the advance over equal keys is a
    /// linear scan.
    pub fn upper_bound(&self, key: f64) -> usize {
        let total = self.keys.len();
        let mut rank = self.lookup(key);
        while rank < total && self.keys.key(rank) <= key {
            rank += 1;
        }
        rank
    }

    /// Constant-time check that `rank` is the true lower bound of `key`.
    #[inline]
    fn is_true_rank(&self, rank: usize, key: f64) -> bool {
        (rank == 0 || self.keys.key(rank - 1) < key)
            && (rank == self.keys.len() || self.keys.key(rank) >= key)
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The configuration the index was built with.
    pub fn config(&self) -> &RmiConfig {
        &self.config
    }

    /// Bytes held by the models, the per-model error bounds, and the key and
    /// position arrays.
    pub fn total_size_bytes(&self) -> usize {
        let stages: usize = self.stages.iter().map(Stage::size_bytes).sum();
        stages + self.keys.size_bytes()
    }

    /// Mean absolute rank error of `lookup` over up to 10,000 evenly sampled
    /// training keys. Valid only after build; 0 for an empty index.
    pub fn average_error(&self) -> f64 {
        let total = self.keys.len();
        if total == 0 {
            return 0.0;
        }

        let step = (total / total.min(ERROR_SAMPLE_SIZE)).max(1);
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in (0..total).step_by(step) {
            let found = self.lookup(self.keys.key(i));
            sum += (found as f64 - i as f64).abs();
            count += 1;
        }
        sum / count as f64
    }

    /// Build and size diagnostics.
    pub fn stats(&self) -> RmiStats {
        RmiStats {
            total_records: self.keys.len(),
            stage_models: self.stages.iter().map(Stage::len).collect(),
            average_error: self.average_error(),
            total_size_bytes: self.total_size_bytes(),
        }
    }
}

/// Maps a stage's prediction to a model index in the next stage:
/// `clamp(floor(clamp(p, 0, N-1) / N * fanout), 0, fanout - 1)`.
///
/// Build-time bucket routing and lookup-time descent both go through this
/// function; they must agree for the leaf error bounds to be sound.
#[inline]
fn route(prediction: f64, total: usize, fanout: usize) -> usize {
    let clamped = prediction.clamp(0.0, (total - 1) as f64);
    let idx = (clamped / total as f64 * fanout as f64) as usize;
    idx.min(fanout - 1)
}

/// Summary of a built index.
#[derive(Debug, Clone, Serialize)]
pub struct RmiStats {
    /// Number of indexed records.
    pub total_records: usize,
    /// Model count per stage, top to bottom.
    pub stage_models: Vec<usize>,
    /// Mean absolute rank error over sampled training keys.
    pub average_error: f64,
    /// Total footprint of models, error bounds, and key storage.
    pub total_size_bytes: usize,
}

impl std::fmt::Display for RmiStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "records: {}", self.total_records)?;
        writeln!(f, "stages:  {:?}", self.stage_models)?;
        writeln!(f, "avg err: {:.2} positions", self.average_error)?;
        write!(f, "size:    {} bytes", self.total_size_bytes)
    }
}
