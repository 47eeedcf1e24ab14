use super::tree::DecisionTree;
use crate::ml::classifier::BinaryClassifier;

/// Fitted random forest for a single yes/no label.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestModel {
    /// Row width the forest was trained on.
    pub feature_count: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Mean of the per-tree positive fractions. `row` must be as wide as
    /// the training rows.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        debug_assert_eq!(
            row.len(),
            self.feature_count,
            "row width differs from training width"
        );
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|tree| tree.predict_proba(row)).sum();
        sum / self.trees.len() as f64
    }
}

impl BinaryClassifier for ForestModel {
    /// Positive only on a strict majority; an even vote is negative.
    fn predict_row(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::forest::tree::Node;

    fn leaf(positive_fraction: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![Node::Leaf { positive_fraction }],
        }
    }

    #[test]
    fn averages_tree_probabilities() {
        let model = ForestModel {
            feature_count: 1,
            trees: vec![leaf(1.0), leaf(0.0), leaf(0.8)],
        };
        assert!((model.predict_proba(&[0.0]) - 0.6).abs() < 1e-12);
        assert!(model.predict_row(&[0.0]));
    }

    #[test]
    fn even_vote_is_negative() {
        let model = ForestModel {
            feature_count: 1,
            trees: vec![leaf(1.0), leaf(0.0)],
        };
        assert!(!model.predict_row(&[0.0]));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "row width differs from training width")]
    fn narrow_row_is_rejected() {
        let model = ForestModel {
            feature_count: 2,
            trees: vec![leaf(1.0)],
        };
        model.predict_proba(&[0.0]);
    }
}
