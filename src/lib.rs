//! Library exports for the training binaries, tests and benchmarks.
/// Per-user application directories.
pub mod app_dirs;
/// Pipeline configuration.
pub mod config;
/// CSV loading and the in-memory feature table.
pub mod dataset;
/// Column transforms and numeric matrix conversion.
pub mod features;
/// Tracing subscriber setup.
pub mod logging;
/// Ensemble classifiers and metrics.
pub mod ml;
/// End-to-end training runs.
pub mod pipeline;
/// Submission output and run reporting.
pub mod report;
