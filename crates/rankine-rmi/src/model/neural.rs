//! Small feed-forward neural regressor trained by mini-batch SGD.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rankine_common::Record;

const NUM_EPOCHS: usize = 100;
const BATCH_SIZE: usize = 128;
const LEARNING_RATE: f64 = 0.05;
/// Fixed seed: builds must be reproducible for the correctness properties to
/// be testable deterministically.
const INIT_SEED: u64 = 42;
/// Key-range ratio above which inputs are log-transformed.
const LOG_RATIO_THRESHOLD: f64 = 100.0;

/// A fully-connected network mapping a scalar key to a predicted position.
///
/// Layer 0 maps the scalar input to `hidden_size` units (directly to 1 when
/// there is a single layer), middle layers map hidden to hidden, and the last
/// layer maps to a single output. Non-final layers use rectified activation;
/// the final layer is affine.
///
/// Inputs are optionally log-transformed (heavy-tailed key ranges) and then
/// min-max normalized; outputs are normalized by the largest position. The
/// normalization parameters are computed during training and stored with the
/// model, and inference uses exactly the stored values.
#[derive(Debug, Clone)]
pub struct NeuralNetModel {
    /// Per-layer weight matrices, row-major: `weights[l][i * outs + j]`.
    weights: Vec<Vec<f64>>,
    /// Per-layer bias vectors.
    biases: Vec<Vec<f64>>,
    hidden_size: usize,
    num_layers: usize,
    x_min: f64,
    x_max: f64,
    x_range: f64,
    y_max: f64,
    use_log: bool,
}

impl NeuralNetModel {
    /// Creates an untrained network of the given shape.
    ///
    /// `num_layers` must be at least 1; `hidden_size` at least 1.
    pub fn with_shape(hidden_size: usize, num_layers: usize) -> Self {
        let hidden_size = hidden_size.max(1);
        let num_layers = num_layers.max(1);

        let mut weights = Vec::with_capacity(num_layers);
        let mut biases = Vec::with_capacity(num_layers);
        for layer in 0..num_layers {
            let (ins, outs) = layer_dims(layer, num_layers, hidden_size);
            weights.push(vec![0.0; ins * outs]);
            biases.push(vec![0.0; outs]);
        }

        Self {
            weights,
            biases,
            hidden_size,
            num_layers,
            x_min: 0.0,
            x_max: 1.0,
            x_range: 1.0,
            y_max: 1.0,
            use_log: false,
        }
    }

    /// Creates and trains a network on a bucket in one step.
    pub fn fit(hidden_size: usize, num_layers: usize, records: &[Record]) -> Self {
        let mut model = Self::with_shape(hidden_size, num_layers);
        model.train(records);
        model
    }

    /// Trains the network with mini-batch gradient descent on mean-squared
    /// error. Empty input is a no-op.
    ///
    /// Training re-derives the input transform and normalization parameters
    /// from the bucket, reinitializes the weights from the fixed seed, runs
    /// a fixed epoch count, and leaves the model ready for inference.
    pub fn train(&mut self, records: &[Record]) {
        if records.is_empty() {
            return;
        }
        let n = records.len();

        let (key_min, key_max) = records
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.key), hi.max(r.key))
            });
        self.use_log = key_max / key_min.max(1.0) > LOG_RATIO_THRESHOLD;

        let (x_min, x_max) = records
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                let x = self.transform(r.key);
                (lo.min(x), hi.max(x))
            });
        self.x_min = x_min;
        self.x_max = x_max;
        self.x_range = (x_max - x_min).max(1.0);
        self.y_max = ((n - 1) as f64).max(1.0);

        let mut rng = StdRng::seed_from_u64(INIT_SEED);
        let init = Normal::new(0.0, (2.0 / self.hidden_size as f64).sqrt())
            .expect("standard deviation is finite and positive");
        for layer in &mut self.weights {
            for w in layer.iter_mut() {
                *w = init.sample(&mut rng);
            }
        }
        for layer in &mut self.biases {
            layer.fill(0.0);
        }

        let mut indices: Vec<usize> = (0..n).collect();
        for _ in 0..NUM_EPOCHS {
            indices.shuffle(&mut rng);
            for batch in indices.chunks(BATCH_SIZE) {
                self.sgd_step(records, batch);
            }
        }
    }

    /// Accumulates backprop gradients over one batch and applies the update.
    fn sgd_step(&mut self, records: &[Record], batch: &[usize]) {
        let num_layers = self.num_layers;
        let hidden = self.hidden_size;

        let mut weight_grads: Vec<Vec<f64>> =
            self.weights.iter().map(|w| vec![0.0; w.len()]).collect();
        let mut bias_grads: Vec<Vec<f64>> =
            self.biases.iter().map(|b| vec![0.0; b.len()]).collect();

        for &idx in batch {
            let record = records[idx];
            let x = (self.transform(record.key) - self.x_min) / self.x_range;
            let y_true = record.position as f64 / self.y_max;

            // Forward pass, keeping every layer's activations for backprop.
            let mut outputs: Vec<Vec<f64>> = Vec::with_capacity(num_layers + 1);
            outputs.push(vec![x]);
            for layer in 0..num_layers {
                let (ins, outs) = layer_dims(layer, num_layers, hidden);
                let mut next = vec![0.0; outs];
                for (j, out) in next.iter_mut().enumerate() {
                    let mut sum = self.biases[layer][j];
                    for i in 0..ins {
                        sum += outputs[layer][i] * self.weights[layer][i * outs + j];
                    }
                    *out = if layer < num_layers - 1 { sum.max(0.0) } else { sum };
                }
                outputs.push(next);
            }

            let error = outputs[num_layers][0] - y_true;

            // Backward pass. deltas[l] is d(loss)/d(pre-activation) of layer
            // l-1's output; the rectifier's derivative is 1 where the
            // activation stayed positive, 0 elsewhere.
            let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); num_layers + 1];
            deltas[num_layers] = vec![2.0 * error];

            for layer in (0..num_layers).rev() {
                let (ins, outs) = layer_dims(layer, num_layers, hidden);

                if layer < num_layers - 1 {
                    let next_size = if layer == num_layers - 2 { 1 } else { hidden };
                    let mut delta = vec![0.0; hidden];
                    for (i, d) in delta.iter_mut().enumerate() {
                        let mut sum = 0.0;
                        for j in 0..next_size {
                            sum += deltas[layer + 2][j]
                                * self.weights[layer + 1][i * next_size + j];
                        }
                        *d = if outputs[layer + 1][i] > 0.0 { sum } else { 0.0 };
                    }
                    deltas[layer + 1] = delta;
                }

                for j in 0..outs {
                    bias_grads[layer][j] += deltas[layer + 1][j];
                    for i in 0..ins {
                        weight_grads[layer][i * outs + j] +=
                            outputs[layer][i] * deltas[layer + 1][j];
                    }
                }
            }
        }

        let scale = LEARNING_RATE / batch.len() as f64;
        for layer in 0..num_layers {
            for (w, g) in self.weights[layer].iter_mut().zip(&weight_grads[layer]) {
                *w -= scale * g;
            }
            for (b, g) in self.biases[layer].iter_mut().zip(&bias_grads[layer]) {
                *b -= scale * g;
            }
        }
    }

    /// Predicted position for `key`: transform, normalize with the stored
    /// parameters, forward pass, denormalize.
    pub fn predict(&self, key: f64) -> f64 {
        let x = (self.transform(key) - self.x_min) / self.x_range;

        let mut activations = vec![x];
        for layer in 0..self.num_layers {
            let (ins, outs) = layer_dims(layer, self.num_layers, self.hidden_size);
            let mut next = vec![0.0; outs];
            for (j, out) in next.iter_mut().enumerate() {
                let mut sum = self.biases[layer][j];
                for i in 0..ins {
                    sum += activations[i] * self.weights[layer][i * outs + j];
                }
                *out = if layer < self.num_layers - 1 { sum.max(0.0) } else { sum };
            }
            activations = next;
        }

        activations[0] * self.y_max
    }

    /// Applies the stored input transform. The log argument is floored at a
    /// tiny positive value so predictions stay defined for every real input.
    #[inline]
    fn transform(&self, key: f64) -> f64 {
        if self.use_log {
            (key + 1.0).max(1e-12).ln()
        } else {
            key
        }
    }

    /// True if this model log-transforms its inputs.
    pub fn uses_log_transform(&self) -> bool {
        self.use_log
    }

    /// Bytes occupied by the weight matrices and bias vectors.
    pub fn size_in_bytes(&self) -> usize {
        let params: usize = self.weights.iter().map(Vec::len).sum::<usize>()
            + self.biases.iter().map(Vec::len).sum::<usize>();
        params * std::mem::size_of::<f64>()
    }
}

/// (input, output) widths of `layer` in a network of `num_layers` layers.
#[inline]
fn layer_dims(layer: usize, num_layers: usize, hidden: usize) -> (usize, usize) {
    let ins = if layer == 0 { 1 } else { hidden };
    let outs = if layer == num_layers - 1 { 1 } else { hidden };
    (ins, outs)
}
