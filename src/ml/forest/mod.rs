//! Deterministic random forest for binary labels.
//!
//! Bagged CART trees with Gini splits and a random feature subset per split:
//! - Every random draw comes from one seeded `StdRng`, so a fixed seed and
//!   row order reproduce the forest bit for bit.
//! - Leaves keep the positive share of their samples; the forest averages
//!   those shares and predicts `true` above 0.5.

mod model;
mod train;
mod tree;

pub use model::ForestModel;
pub use train::{ForestOptions, train_forest};
pub use tree::{DecisionTree, Node};

use crate::ml::classifier::{BinaryLearner, TrainingError};

/// Random-forest learner carrying its hyperparameters.
#[derive(Debug, Clone, Default)]
pub struct RandomForest {
    pub options: ForestOptions,
}

impl RandomForest {
    pub fn new(options: ForestOptions) -> Self {
        Self { options }
    }
}

impl BinaryLearner for RandomForest {
    type Model = ForestModel;

    fn fit(&self, x: &[Vec<f64>], y: &[bool]) -> Result<ForestModel, TrainingError> {
        train_forest(x, y, &self.options)
    }
}
