//! Closed-form least-squares linear regressor.

use rankine_common::Record;

/// Denominator threshold below which a bucket is treated as constant-key.
const DEGENERATE_EPS: f64 = 1e-10;

/// An affine map `key -> slope * key + intercept` fit by least squares.
///
/// Training is a single deterministic pass over the bucket. The default
/// (zero slope, zero intercept) doubles as the placeholder model for empty
/// buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearModel {
    slope: f64,
    intercept: f64,
}

impl LinearModel {
    /// Fits the model to a training bucket.
    ///
    /// An empty bucket leaves the zero parameters in place. A degenerate
    /// bucket (constant keys, or a single record) falls back to predicting
    /// the mean position.
    pub fn fit(records: &[Record]) -> Self {
        let mut model = Self::default();
        model.train(records);
        model
    }

    /// Re-fits the model in place; empty input is a no-op.
    pub fn train(&mut self, records: &[Record]) {
        if records.is_empty() {
            return;
        }

        let n = records.len() as f64;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_xy = 0.0;
        let mut sum_x2 = 0.0;

        for r in records {
            let y = r.position as f64;
            sum_x += r.key;
            sum_y += y;
            sum_xy += r.key * y;
            sum_x2 += r.key * r.key;
        }

        let mean_x = sum_x / n;
        let mean_y = sum_y / n;

        let denominator = sum_x2 - n * mean_x * mean_x;
        if denominator.abs() < DEGENERATE_EPS {
            self.slope = 0.0;
            self.intercept = mean_y;
        } else {
            self.slope = (sum_xy - n * mean_x * mean_y) / denominator;
            self.intercept = mean_y - self.slope * mean_x;
        }
    }

    /// Predicted position for `key`.
    #[inline]
    pub fn predict(&self, key: f64) -> f64 {
        self.slope * key + self.intercept
    }

    /// The fitted slope.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// The fitted intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Bytes occupied by the parameters.
    pub fn size_in_bytes(&self) -> usize {
        2 * std::mem::size_of::<f64>()
    }
}
