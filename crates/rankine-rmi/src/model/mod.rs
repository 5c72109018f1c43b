//! Model primitives for the recursive model index.

mod linear;
mod neural;

pub use linear::LinearModel;
pub use neural::NeuralNetModel;

/// A position model: a regressor from key to predicted rank.
///
/// The hierarchy only ever holds these two variants, so the dispatch is a
/// closed enum rather than an open trait object. Predictions are defined for
/// every real input; outside the trained range they may be arbitrarily far
/// off, and the engine clamps and error-bounds them.
#[derive(Debug, Clone)]
pub enum Model {
    Linear(LinearModel),
    Neural(NeuralNetModel),
}

impl Model {
    /// A zero-parameter linear model, installed for buckets that received no
    /// training records. Predicts 0 everywhere.
    pub fn placeholder() -> Self {
        Model::Linear(LinearModel::default())
    }

    /// Predicted position for `key`.
    #[inline]
    pub fn predict(&self, key: f64) -> f64 {
        match self {
            Model::Linear(m) => m.predict(key),
            Model::Neural(m) => m.predict(key),
        }
    }

    /// Bytes occupied by the trained parameters.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Model::Linear(m) => m.size_in_bytes(),
            Model::Neural(m) => m.size_in_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_predicts_zero() {
        let m = Model::placeholder();
        assert_eq!(m.predict(0.0), 0.0);
        assert_eq!(m.predict(1e12), 0.0);
        assert_eq!(m.predict(-5.0), 0.0);
    }

    #[test]
    fn test_dispatch_matches_inner_model() {
        let inner = LinearModel::fit(&[
            rankine_common::Record::new(0.0, 0),
            rankine_common::Record::new(1.0, 1),
        ]);
        let model = Model::Linear(inner.clone());
        assert_eq!(model.predict(0.5), inner.predict(0.5));
        assert_eq!(model.size_in_bytes(), inner.size_in_bytes());
    }
}
