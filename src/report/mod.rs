//! Prediction export and stage previews.
//!
//! Predictions are joined back to their company ids in aggregation order and
//! written as CSV with a fixed header.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::labeling::{LabeledCompany, PredictionVector};
use crate::ml::metrics::LabelAgreement;

pub mod table;

pub use table::{Table, agreement_table, labeled_table, prediction_table, raw_preview};

/// Header of the exported prediction file.
pub const PREDICTION_HEADER: [&str; 5] = [
    "company_id",
    "pred_insurance",
    "pred_engage",
    "pred_rto_alert",
    "pred_capital",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode predictions as CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write predictions: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to save predictions to {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode run summary as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One exported row: a company and its predicted recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub company_id: String,
    pub pred_insurance: bool,
    pub pred_engage: bool,
    pub pred_rto_alert: bool,
    pub pred_capital: bool,
}

impl PredictionRow {
    pub fn new(company_id: String, prediction: PredictionVector) -> Self {
        Self {
            company_id,
            pred_insurance: prediction.pred_insurance,
            pred_engage: prediction.pred_engage,
            pred_rto_alert: prediction.pred_rto_alert,
            pred_capital: prediction.pred_capital,
        }
    }

    pub fn prediction(&self) -> PredictionVector {
        PredictionVector {
            pred_insurance: self.pred_insurance,
            pred_engage: self.pred_engage,
            pred_rto_alert: self.pred_rto_alert,
            pred_capital: self.pred_capital,
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.company_id.clone(),
            self.pred_insurance.to_string(),
            self.pred_engage.to_string(),
            self.pred_rto_alert.to_string(),
            self.pred_capital.to_string(),
        ]
    }
}

/// Pair each company with the prediction at the same position.
pub fn join_predictions(
    companies: &[LabeledCompany],
    predictions: &[PredictionVector],
) -> Vec<PredictionRow> {
    companies
        .iter()
        .zip(predictions)
        .map(|(company, prediction)| {
            PredictionRow::new(company.features.company_id.clone(), *prediction)
        })
        .collect()
}

/// Write the header and one CSV line per row.
pub fn write_predictions_csv<W: Write>(writer: W, rows: &[PredictionRow]) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(PREDICTION_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The downloadable CSV as bytes.
pub fn predictions_to_csv_bytes(rows: &[PredictionRow]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_predictions_csv(&mut buf, rows)?;
    Ok(buf)
}

/// Write predictions to `path`, replacing any existing file only once the
/// new content is complete.
pub fn export_predictions(path: &Path, rows: &[PredictionRow]) -> Result<(), ExportError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|source| ExportError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tmp = NamedTempFile::new_in(&parent)?;
    write_predictions_csv(tmp.as_file_mut(), rows)?;
    tmp.persist(path).map_err(|err| ExportError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    tracing::info!("Wrote {} prediction rows to {}", rows.len(), path.display());
    Ok(())
}

/// Machine-readable form of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub companies: &'a [LabeledCompany],
    pub predictions: &'a [PredictionRow],
    pub agreement: &'a [LabelAgreement],
}

impl RunSummary<'_> {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
