//! One independent binary model per recommendation label.

use tracing::{debug, warn};

use super::classifier::{BinaryClassifier, BinaryLearner, TrainingError};
use super::forest::ForestModel;
use crate::labeling::{Label, LabeledCompany, PredictionVector};
use crate::orders::CompanyFeatures;

/// Four fitted binary models, one per `Label`, trained for a single batch.
#[derive(Debug, Clone)]
pub struct MultiLabelModel<M> {
    models: Vec<(Label, M)>,
}

/// The batch model used by the pipeline.
pub type TrainedModel = MultiLabelModel<ForestModel>;

/// Fit one model per label on the companies' features against their rule
/// labels. A label with a single class present is fitted anyway.
pub fn fit_multi_label<L: BinaryLearner>(
    learner: &L,
    companies: &[LabeledCompany],
) -> Result<MultiLabelModel<L::Model>, TrainingError> {
    let x: Vec<Vec<f64>> = companies
        .iter()
        .map(|company| company.features.feature_row())
        .collect();

    let mut models = Vec::with_capacity(Label::ALL.len());
    for label in Label::ALL {
        let y: Vec<bool> = companies
            .iter()
            .map(|company| company.labels.get(label))
            .collect();
        let positives = y.iter().filter(|&&v| v).count();
        if !y.is_empty() && (positives == 0 || positives == y.len()) {
            warn!(
                "Label {} has a single class across {} companies; model will echo it",
                label.label_column(),
                y.len()
            );
        }
        let model = learner.fit(&x, &y)?;
        debug!(
            "Fitted {} on {} rows ({} positive)",
            label.label_column(),
            y.len(),
            positives
        );
        models.push((label, model));
    }
    Ok(MultiLabelModel { models })
}

impl<M: BinaryClassifier> MultiLabelModel<M> {
    /// The fitted model for one label.
    pub fn model(&self, label: Label) -> Option<&M> {
        self.models
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, model)| model)
    }

    pub fn predict_one(&self, features: &CompanyFeatures) -> PredictionVector {
        let row = features.feature_row();
        PredictionVector::from_fn(|label| {
            self.model(label)
                .map(|model| model.predict_row(&row))
                .unwrap_or(false)
        })
    }

    /// One prediction per company, in input order.
    pub fn predict<'a, I>(&self, companies: I) -> Vec<PredictionVector>
    where
        I: IntoIterator<Item = &'a CompanyFeatures>,
    {
        companies
            .into_iter()
            .map(|features| self.predict_one(features))
            .collect()
    }
}
