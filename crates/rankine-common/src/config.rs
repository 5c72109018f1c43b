//! Configuration structures for Rankine index builds.

use crate::error::{RankineError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the recursive model index.
///
/// `stage_sizes` describes the shape of the model hierarchy: one entry per
/// stage, each entry the number of models in that stage. The first entry must
/// be 1 (a single root model); the last entry is the leaf model count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmiConfig {
    /// Number of models per stage, top to bottom. First entry must be 1.
    pub stage_sizes: Vec<usize>,
    /// Width of the neural root's hidden layers.
    pub hidden_size: usize,
    /// Layer count of the neural root. 0 means even the root is linear.
    pub num_hidden_layers: usize,
    /// Reserved for hybrid spill-to-baseline variants; ignored by lookup.
    pub error_threshold: f64,
    /// Reserved for hybrid spill-to-baseline variants; ignored by lookup.
    pub use_hybrid: bool,
}

impl Default for RmiConfig {
    fn default() -> Self {
        Self {
            stage_sizes: vec![1, 1000],
            hidden_size: 8,
            num_hidden_layers: 1,
            error_threshold: 128.0,
            use_hybrid: false,
        }
    }
}

impl RmiConfig {
    /// Creates a config with the given stage shape and default hyperparameters.
    pub fn with_stages(stage_sizes: Vec<usize>) -> Self {
        Self {
            stage_sizes,
            ..Default::default()
        }
    }

    /// Creates a config whose root model is linear rather than neural.
    pub fn linear(stage_sizes: Vec<usize>) -> Self {
        Self {
            stage_sizes,
            num_hidden_layers: 0,
            ..Default::default()
        }
    }

    /// Checks the structural requirements on the stage shape.
    pub fn validate(&self) -> Result<()> {
        if self.stage_sizes.is_empty() {
            return Err(RankineError::InvalidConfig(
                "stage_sizes must not be empty".to_string(),
            ));
        }
        if self.stage_sizes[0] != 1 {
            return Err(RankineError::InvalidConfig(format!(
                "stage_sizes[0] must be 1, got {}",
                self.stage_sizes[0]
            )));
        }
        if let Some(&size) = self.stage_sizes.iter().find(|&&s| s == 0) {
            return Err(RankineError::InvalidConfig(format!(
                "stage sizes must be positive, got {}",
                size
            )));
        }
        if self.hidden_size == 0 {
            return Err(RankineError::InvalidConfig(
                "hidden_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of stages in the hierarchy.
    pub fn num_stages(&self) -> usize {
        self.stage_sizes.len()
    }

    /// Number of models in the last stage.
    pub fn leaf_count(&self) -> usize {
        self.stage_sizes.last().copied().unwrap_or(0)
    }
}

/// Configuration for the page-indexed tree baseline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Keys per leaf page and children per internal node.
    pub page_size: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { page_size: 128 }
    }
}

impl TreeConfig {
    /// Creates a config with the given page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Checks that the fanout is usable.
    pub fn validate(&self) -> Result<()> {
        if self.page_size < 2 {
            return Err(RankineError::InvalidConfig(format!(
                "page_size must be at least 2, got {}",
                self.page_size
            )));
        }
        Ok(())
    }
}
