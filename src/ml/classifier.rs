use thiserror::Error;

/// Reasons a binary model cannot be fitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("feature matrix is empty")]
    EmptyFeatures,
    #[error("feature rows have no columns")]
    NoColumns,
    #[error("feature matrix has {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("non-finite value in row {row}, feature {feature}")]
    NonFinite { row: usize, feature: usize },
    #[error("invalid training options: {0}")]
    InvalidOptions(String),
}

/// A fitted model answering one yes/no question per feature row.
pub trait BinaryClassifier {
    fn predict_row(&self, row: &[f64]) -> bool;

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<bool> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Something that fits a `BinaryClassifier` from labelled rows.
pub trait BinaryLearner {
    type Model: BinaryClassifier;

    fn fit(&self, x: &[Vec<f64>], y: &[bool]) -> Result<Self::Model, TrainingError>;
}

/// Check shape and finiteness of a training set; returns the row width.
pub fn validate_training_input(x: &[Vec<f64>], y: &[bool]) -> Result<usize, TrainingError> {
    if x.is_empty() {
        return Err(TrainingError::EmptyFeatures);
    }
    if x.len() != y.len() {
        return Err(TrainingError::LengthMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }
    let width = x[0].len();
    if width == 0 {
        return Err(TrainingError::NoColumns);
    }
    for (row_idx, row) in x.iter().enumerate() {
        if row.len() != width {
            return Err(TrainingError::RaggedRow {
                row: row_idx,
                expected: width,
                found: row.len(),
            });
        }
        if let Some(feature) = row.iter().position(|v| !v.is_finite()) {
            return Err(TrainingError::NonFinite {
                row: row_idx,
                feature,
            });
        }
    }
    Ok(width)
}
