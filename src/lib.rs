//! Library exports for the CLI, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// TOML settings for training and output.
pub mod config;
/// Rule-derived recommendation labels.
pub mod labeling;
/// Tracing subscriber setup and log file rotation.
pub mod logging;
/// Binary classifiers, the random forest and agreement metrics.
pub mod ml;
/// Order CSV loading and per-company feature aggregation.
pub mod orders;
/// End-to-end batch run.
pub mod pipeline;
/// Prediction export and preview tables.
pub mod report;
