//! Classifiers that learn the recommendation rules from company features.
//!
//! `BinaryLearner`/`BinaryClassifier` are the seam; the random forest is the
//! learner the pipeline uses, wrapped once per label by `multi_label`.

pub mod classifier;
pub mod forest;
pub mod metrics;
pub mod multi_label;

pub use classifier::{BinaryClassifier, BinaryLearner, TrainingError};
pub use multi_label::{MultiLabelModel, TrainedModel, fit_multi_label};
