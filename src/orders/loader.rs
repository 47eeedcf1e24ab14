//! CSV order loader.
//!
//! Parses an order export into typed `OrderRecord`s. Columns are matched by
//! header name, in any order; columns beyond the required set are ignored.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns that must be present in every order export.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "company_id",
    "total",
    "payment_method",
    "status",
    "customer_pincode",
    "channel_order_id",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open orders file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("input has no header row")]
    EmptyInput,
    #[error("malformed CSV input: {0}")]
    Parse(#[source] csv::Error),
    #[error("missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("duplicate required column(s): {}", .columns.join(", "))]
    DuplicateColumns { columns: Vec<String> },
    #[error("invalid value at line {line} in column `{column}`: {reason}")]
    InvalidValue {
        line: u64,
        column: String,
        reason: String,
    },
}

impl LoadError {
    /// True for failures caused by a missing or repeated column or a value
    /// that cannot be coerced to its column type, as opposed to unreadable
    /// tabular data.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            LoadError::MissingColumns { .. }
                | LoadError::DuplicateColumns { .. }
                | LoadError::InvalidValue { .. }
        )
    }
}

/// One order row from the export. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub company_id: String,
    pub total: f64,
    pub payment_method: String,
    pub status: i64,
    pub customer_pincode: String,
    pub channel_order_id: String,
}

/// Untyped view of a row; every required column as text.
#[derive(Debug, Deserialize)]
struct RawOrderRow {
    company_id: String,
    total: String,
    payment_method: String,
    status: String,
    customer_pincode: String,
    channel_order_id: String,
}

impl RawOrderRow {
    fn coerce(self, line: u64) -> Result<OrderRecord, LoadError> {
        let invalid = |column: &str, reason: String| LoadError::InvalidValue {
            line,
            column: column.to_string(),
            reason,
        };
        if self.company_id.trim().is_empty() {
            return Err(invalid("company_id", "company_id must not be empty".into()));
        }
        let total = parse_total(&self.total).map_err(|reason| invalid("total", reason))?;
        let status = parse_status(&self.status).map_err(|reason| invalid("status", reason))?;
        Ok(OrderRecord {
            company_id: self.company_id,
            total,
            payment_method: self.payment_method,
            status,
            customer_pincode: self.customer_pincode,
            channel_order_id: self.channel_order_id,
        })
    }
}

/// Load order records from a CSV reader.
pub fn load_orders<R: Read>(reader: R) -> Result<Vec<OrderRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(LoadError::Parse)?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptyInput);
    }
    check_required_columns(&headers)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result.map_err(LoadError::Parse)?;
        let line = row.position().map(|pos| pos.line()).unwrap_or(0);
        let raw: RawOrderRow = row.deserialize(Some(&headers)).map_err(LoadError::Parse)?;
        records.push(raw.coerce(line)?);
    }
    tracing::debug!("Loaded {} order rows", records.len());
    Ok(records)
}

/// Load order records from a CSV file path.
pub fn load_orders_file(path: &Path) -> Result<Vec<OrderRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_orders(file)
}

/// Each required column must appear exactly once; missing ones are
/// reported before repeated ones.
fn check_required_columns(headers: &csv::StringRecord) -> Result<(), LoadError> {
    let occurrences = |column: &str| headers.iter().filter(|h| *h == column).count();
    let with_count = |keep: fn(usize) -> bool| -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|column| keep(occurrences(**column)))
            .map(|column| column.to_string())
            .collect()
    };

    let missing = with_count(|n| n == 0);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { columns: missing });
    }
    let duplicated = with_count(|n| n > 1);
    if !duplicated.is_empty() {
        return Err(LoadError::DuplicateColumns {
            columns: duplicated,
        });
    }
    Ok(())
}

fn parse_total(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("expected a finite number, got '{raw}'")),
    }
}

/// Integer status codes; integral floats such as `15.0` are accepted.
fn parse_status(raw: &str) -> Result<i64, String> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(format!("expected an integer status code, got '{raw}'")),
    }
}
