//! Order ingestion: CSV loading and per-company aggregation.

pub mod aggregate;
pub mod loader;

pub use aggregate::{
    CompanyFeatures, FEATURE_COUNT, FEATURE_DESCRIPTIONS, REMOTE_PINCODES, RTO_STATUSES,
    aggregate_companies,
};
pub use loader::{LoadError, OrderRecord, REQUIRED_COLUMNS, load_orders, load_orders_file};
