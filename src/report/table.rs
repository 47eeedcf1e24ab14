//! Plain-text tables for previewing each pipeline stage.

use std::fmt;

use serde::Serialize;

use super::PredictionRow;
use crate::labeling::{Label, LabeledCompany};
use crate::ml::metrics::LabelAgreement;
use crate::orders::{FEATURE_DESCRIPTIONS, OrderRecord, REQUIRED_COLUMNS};

/// Header plus string cells; `Display` renders aligned columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(idx) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        let write_line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let line = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(f, "{}", line.trim_end())
        };
        write_line(f, &self.headers)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(f, &rule)?;
        for row in &self.rows {
            write_line(f, row)?;
        }
        Ok(())
    }
}

fn feature_cell(value: f64) -> String {
    format!("{value:.4}")
}

/// First `limit` raw order rows, required columns only.
pub fn raw_preview(records: &[OrderRecord], limit: usize) -> Table {
    let mut table = Table::new(REQUIRED_COLUMNS);
    for record in records.iter().take(limit) {
        table.push_row(vec![
            record.company_id.clone(),
            record.total.to_string(),
            record.payment_method.clone(),
            record.status.to_string(),
            record.customer_pincode.clone(),
            record.channel_order_id.clone(),
        ]);
    }
    table
}

/// Aggregated features and rule labels for every company.
pub fn labeled_table(companies: &[LabeledCompany]) -> Table {
    let headers = std::iter::once("company_id")
        .chain(FEATURE_DESCRIPTIONS.iter().map(|(name, _)| *name))
        .chain(Label::ALL.iter().map(|label| label.label_column()));
    let mut table = Table::new(headers);
    for company in companies {
        let f = &company.features;
        let mut row = vec![
            f.company_id.clone(),
            feature_cell(f.avg_total),
            feature_cell(f.cod_ratio),
            feature_cell(f.rto_ratio),
            feature_cell(f.remote_ratio),
            f.order_count.to_string(),
        ];
        row.extend(Label::ALL.iter().map(|&label| company.labels.get(label).to_string()));
        table.push_row(row);
    }
    table
}

pub fn prediction_table(rows: &[PredictionRow]) -> Table {
    let mut table = Table::new(super::PREDICTION_HEADER);
    for row in rows {
        table.push_row(row.cells());
    }
    table
}

pub fn agreement_table(report: &[LabelAgreement]) -> Table {
    let mut table = Table::new(["label", "accuracy", "precision", "recall", "support"]);
    for entry in report {
        table.push_row(vec![
            entry.label.to_string(),
            format!("{:.3}", entry.accuracy),
            format!("{:.3}", entry.precision),
            format!("{:.3}", entry.recall),
            entry.support.to_string(),
        ]);
    }
    table
}
