//! End-to-end batch run: load, aggregate, label, train, predict.
//!
//! Every run is independent; nothing is cached between batches. Any stage
//! failure aborts the batch before any output is produced.

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::labeling::{Label, LabelVector, LabeledCompany, PredictionVector, label_companies};
use crate::ml::forest::{ForestOptions, RandomForest};
use crate::ml::metrics::{LabelAgreement, exact_match_ratio, label_agreement};
use crate::ml::{BinaryLearner, TrainingError, fit_multi_label};
use crate::orders::{LoadError, OrderRecord, aggregate_companies, load_orders, load_orders_file};
use crate::report::{self, ExportError, PredictionRow};

/// Failure category of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Schema,
    Training,
    Export,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Parse => "ParseError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Training => "TrainingError",
            ErrorKind::Export => "ExportError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("training failed: {0}")]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Load(err) if err.is_schema_error() => ErrorKind::Schema,
            PipelineError::Load(_) => ErrorKind::Parse,
            PipelineError::Training(_) => ErrorKind::Training,
            PipelineError::Export(_) => ErrorKind::Export,
        }
    }
}

/// Everything a batch run produces, in company first-appearance order.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<OrderRecord>,
    pub companies: Vec<LabeledCompany>,
    pub predictions: Vec<PredictionRow>,
    pub agreement: Vec<LabelAgreement>,
    /// Share of companies whose four predictions all equal their labels.
    pub exact_match: f32,
}

impl PipelineOutput {
    pub fn labels(&self) -> Vec<LabelVector> {
        self.companies.iter().map(|c| c.labels).collect()
    }

    pub fn prediction_vectors(&self) -> Vec<PredictionVector> {
        self.predictions.iter().map(PredictionRow::prediction).collect()
    }

    pub fn export(&self, path: &Path) -> Result<(), PipelineError> {
        report::export_predictions(path, &self.predictions)?;
        Ok(())
    }

    pub fn summary(&self) -> report::RunSummary<'_> {
        report::RunSummary {
            companies: &self.companies,
            predictions: &self.predictions,
            agreement: &self.agreement,
        }
    }
}

/// Run the batch over CSV text with the random forest learner.
pub fn run_pipeline<R: Read>(reader: R, options: &ForestOptions) -> Result<PipelineOutput, PipelineError> {
    let records = load_orders(reader)?;
    run_on_records(records, &RandomForest::new(options.clone()))
}

pub fn run_pipeline_file(path: &Path, options: &ForestOptions) -> Result<PipelineOutput, PipelineError> {
    let records = load_orders_file(path)?;
    run_on_records(records, &RandomForest::new(options.clone()))
}

/// Aggregate, label, fit and predict over already-loaded records.
pub fn run_on_records<L: BinaryLearner>(
    records: Vec<OrderRecord>,
    learner: &L,
) -> Result<PipelineOutput, PipelineError> {
    info!("Loaded {} order rows", records.len());

    let companies = label_companies(aggregate_companies(&records));
    info!("Aggregated {} companies", companies.len());
    for label in Label::ALL {
        let positives = companies.iter().filter(|c| c.labels.get(label)).count();
        info!("{}: {} of {} companies", label.label_column(), positives, companies.len());
    }

    let model = fit_multi_label(learner, &companies)?;
    let vectors = model.predict(companies.iter().map(|c| &c.features));
    info!("Trained models and predicted {} companies", vectors.len());

    let labels: Vec<LabelVector> = companies.iter().map(|c| c.labels).collect();
    let agreement = label_agreement(&labels, &vectors);
    let exact_match = exact_match_ratio(&labels, &vectors);
    let predictions = report::join_predictions(&companies, &vectors);

    Ok(PipelineOutput {
        records,
        companies,
        predictions,
        agreement,
        exact_match,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "company_id,total,payment_method,status,customer_pincode,channel_order_id\n\
        c1,100,cod,15,173212,o1\n\
        c1,300,prepaid,1,110001,o2\n\
        c2,900,cod,2,560001,o3\n";

    fn quick() -> ForestOptions {
        ForestOptions {
            trees: 10,
            ..ForestOptions::default()
        }
    }

    #[test]
    fn produces_one_row_per_company() {
        let output = run_pipeline(SMALL.as_bytes(), &quick()).unwrap();
        assert_eq!(output.records.len(), 3);
        let ids: Vec<&str> = output
            .predictions
            .iter()
            .map(|row| row.company_id.as_str())
            .collect();
        assert_eq!(ids, ["c1", "c2"]);
        assert_eq!(output.companies[0].features.avg_total, 200.0);
        assert_eq!(output.agreement.len(), 4);
        assert_eq!(output.labels().len(), output.prediction_vectors().len());
    }

    #[test]
    fn missing_column_is_schema_error() {
        let input = "company_id,total,payment_method,status,customer_pincode\nc1,1,cod,1,1\n";
        let err = run_pipeline(input.as_bytes(), &quick()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn repeated_column_is_schema_error() {
        let input = "company_id,total,total,payment_method,status,customer_pincode,channel_order_id\n\
            c1,1,2,cod,1,1,o1\n";
        let err = run_pipeline(input.as_bytes(), &quick()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("duplicate required column(s): total"));
    }

    #[test]
    fn bad_numeric_is_schema_error() {
        let input = "company_id,total,payment_method,status,customer_pincode,channel_order_id\n\
            c1,lots,cod,1,1,o1\n";
        let err = run_pipeline(input.as_bytes(), &quick()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn empty_input_is_parse_error() {
        let err = run_pipeline("".as_bytes(), &quick()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.kind().to_string(), "ParseError");
    }

    #[test]
    fn header_only_is_training_error() {
        let input = "company_id,total,payment_method,status,customer_pincode,channel_order_id\n";
        let err = run_pipeline(input.as_bytes(), &quick()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Training);
        assert!(matches!(
            err,
            PipelineError::Training(TrainingError::EmptyFeatures)
        ));
    }

    #[test]
    fn export_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company_predictions.csv");
        let output = run_pipeline(SMALL.as_bytes(), &quick()).unwrap();
        output.export(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
