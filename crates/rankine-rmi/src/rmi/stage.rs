//! One horizontal level of the model hierarchy.

use crate::model::Model;

/// A stage: its models plus, per model, the `[min_error, max_error]` range of
/// `prediction - true_position` observed over the model's training bucket.
///
/// The three vectors are always the same length. Bounds are recorded for
/// every stage during build; only the last stage's bounds are consulted at
/// lookup, the rest are diagnostics.
#[derive(Debug)]
pub(crate) struct Stage {
    pub models: Vec<Model>,
    pub min_errors: Vec<f64>,
    pub max_errors: Vec<f64>,
}

impl Stage {
    pub fn with_capacity(num_models: usize) -> Self {
        Self {
            models: Vec::with_capacity(num_models),
            min_errors: Vec::with_capacity(num_models),
            max_errors: Vec::with_capacity(num_models),
        }
    }

    /// Appends a trained model with its observed error bounds.
    pub fn push(&mut self, model: Model, min_error: f64, max_error: f64) {
        self.models.push(model);
        self.min_errors.push(min_error);
        self.max_errors.push(max_error);
    }

    /// Appends a placeholder model for an empty bucket: zero parameters,
    /// zero error bounds.
    pub fn push_placeholder(&mut self) {
        self.push(Model::placeholder(), 0.0, 0.0);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Bytes occupied by this stage's models and error-bound vectors.
    pub fn size_bytes(&self) -> usize {
        let models: usize = self.models.iter().map(Model::size_in_bytes).sum();
        let bounds =
            (self.min_errors.len() + self.max_errors.len()) * std::mem::size_of::<f64>();
        models + bounds
    }
}
