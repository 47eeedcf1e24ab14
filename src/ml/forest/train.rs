use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::model::ForestModel;
use super::tree::{DecisionTree, Node, gini};
use crate::ml::classifier::{TrainingError, validate_training_input};

/// Training hyperparameters for the random forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestOptions {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Depth limit per tree; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples than this become leaves.
    pub min_samples_split: usize,
    /// Each child of a split must keep at least this many samples.
    pub min_samples_leaf: usize,
    /// Draw each tree's samples with replacement.
    pub bootstrap: bool,
    /// Seed for all sampling decisions.
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Fit a bagged ensemble of Gini-split trees.
///
/// The same options, rows and row order always produce the same forest.
pub fn train_forest(
    x: &[Vec<f64>],
    y: &[bool],
    options: &ForestOptions,
) -> Result<ForestModel, TrainingError> {
    let width = validate_training_input(x, y)?;
    if options.trees == 0 {
        return Err(TrainingError::InvalidOptions(
            "forest needs at least one tree".to_string(),
        ));
    }

    let n = x.len();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let max_features = ((width as f64).sqrt() as usize).clamp(1, width);
    let mut trees = Vec::with_capacity(options.trees);
    for _ in 0..options.trees {
        let sample: Vec<usize> = if options.bootstrap {
            (0..n).map(|_| rng.random_range(0..n)).collect()
        } else {
            (0..n).collect()
        };
        let mut grower = TreeGrower {
            x,
            y,
            options,
            width,
            max_features,
            rng: &mut rng,
            nodes: Vec::new(),
        };
        grower.grow(sample, 0);
        trees.push(DecisionTree {
            nodes: grower.nodes,
        });
    }

    Ok(ForestModel {
        feature_count: width,
        trees,
    })
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeGrower<'a> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    options: &'a ForestOptions,
    width: usize,
    max_features: usize,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

impl TreeGrower<'_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let total = indices.len();
        let positives = indices.iter().filter(|&&i| self.y[i]).count();
        let leaf = Node::Leaf {
            positive_fraction: if total == 0 {
                0.0
            } else {
                positives as f64 / total as f64
            },
        };
        let pure = positives == 0 || positives == total;
        let depth_reached = self.options.max_depth.is_some_and(|max| depth >= max);
        if pure || depth_reached || total < self.options.min_samples_split.max(2) {
            return self.push(leaf);
        }
        let Some(split) = self.best_split(&indices) else {
            return self.push(leaf);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][split.feature] <= split.threshold);
        let node_idx = self.push(leaf);
        let left_idx = self.grow(left, depth + 1);
        let right_idx = self.grow(right, depth + 1);
        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_idx,
            right: right_idx,
        };
        node_idx
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Search `max_features` random features, continuing through the rest
    /// only while no valid split has turned up.
    fn best_split(&mut self, indices: &[usize]) -> Option<Split> {
        let mut features: Vec<usize> = (0..self.width).collect();
        features.shuffle(&mut *self.rng);
        let mut best: Option<Split> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            let Some(candidate) = self.best_split_for_feature(indices, feature) else {
                continue;
            };
            if best.is_none_or(|b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
        }
        best
    }

    fn best_split_for_feature(&self, indices: &[usize], feature: usize) -> Option<Split> {
        let mut column: Vec<(f64, bool)> = indices
            .iter()
            .map(|&i| (self.x[i][feature], self.y[i]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = column.len();
        let total_pos = column.iter().filter(|(_, label)| *label).count();
        let min_leaf = self.options.min_samples_leaf.max(1);
        let mut best: Option<Split> = None;
        let mut left_pos = 0usize;
        for i in 1..total {
            if column[i - 1].1 {
                left_pos += 1;
            }
            let (prev, next) = (column[i - 1].0, column[i].0);
            if prev >= next || i < min_leaf || total - i < min_leaf {
                continue;
            }
            let right = total - i;
            let impurity = (i as f64 * gini(left_pos, i)
                + right as f64 * gini(total_pos - left_pos, right))
                / total as f64;
            if best.is_none_or(|b| impurity < b.impurity) {
                let mid = prev + (next - prev) / 2.0;
                let threshold = if mid < next { mid } else { prev };
                best = Some(Split {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}
