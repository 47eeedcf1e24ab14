//! Agreement between rule labels and model predictions.
//!
//! The model is scored on the batch it was fitted on, so these numbers show
//! how closely it reproduces the rules, not how well it generalizes.

use serde::Serialize;

use crate::labeling::{Label, LabelVector, PredictionVector};

/// Binary confusion counts for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryConfusion {
    pub true_positive: u32,
    pub false_positive: u32,
    pub true_negative: u32,
    pub false_negative: u32,
}

impl BinaryConfusion {
    pub fn add(&mut self, truth: bool, predicted: bool) {
        let slot = match (truth, predicted) {
            (true, true) => &mut self.true_positive,
            (false, true) => &mut self.false_positive,
            (false, false) => &mut self.true_negative,
            (true, false) => &mut self.false_negative,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.true_positive
            .saturating_add(self.false_positive)
            .saturating_add(self.true_negative)
            .saturating_add(self.false_negative)
    }

    pub fn accuracy(&self) -> f32 {
        ratio(self.true_positive.saturating_add(self.true_negative), self.total())
    }

    /// `TP / (TP + FP)`.
    pub fn precision(&self) -> f32 {
        ratio(self.true_positive, self.true_positive.saturating_add(self.false_positive))
    }

    /// `TP / (TP + FN)`.
    pub fn recall(&self) -> f32 {
        ratio(self.true_positive, self.true_positive.saturating_add(self.false_negative))
    }
}

fn ratio(num: u32, den: u32) -> f32 {
    if den == 0 { 0.0 } else { num as f32 / den as f32 }
}

/// Per-label agreement summary.
#[derive(Debug, Clone, Serialize)]
pub struct LabelAgreement {
    pub label: Label,
    pub accuracy: f32,
    pub precision: f32,
    pub recall: f32,
    /// Number of rows the rules labelled positive.
    pub support: u32,
}

/// Compare rule labels with predictions row by row; slices are zipped, so
/// any excess rows on either side are ignored.
pub fn label_agreement(
    labels: &[LabelVector],
    predictions: &[PredictionVector],
) -> Vec<LabelAgreement> {
    Label::ALL
        .iter()
        .map(|&label| {
            let mut cm = BinaryConfusion::default();
            for (truth, predicted) in labels.iter().zip(predictions) {
                cm.add(truth.get(label), predicted.get(label));
            }
            LabelAgreement {
                label,
                accuracy: cm.accuracy(),
                precision: cm.precision(),
                recall: cm.recall(),
                support: cm.true_positive + cm.false_negative,
            }
        })
        .collect()
}

/// Share of rows where all four predictions equal the rule labels.
pub fn exact_match_ratio(labels: &[LabelVector], predictions: &[PredictionVector]) -> f32 {
    let mut matched = 0u32;
    let mut total = 0u32;
    for (truth, predicted) in labels.iter().zip(predictions) {
        total += 1;
        if Label::ALL
            .iter()
            .all(|&label| truth.get(label) == predicted.get(label))
        {
            matched += 1;
        }
    }
    ratio(matched, total)
}
