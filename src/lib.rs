//! Library exports for the winning-bid trainer, its tests and benchmarks.
/// Application directory resolution.
pub mod app_dirs;
/// TOML run configuration.
pub mod config;
/// CSV tables, schema resolution and input path lookup.
pub mod dataset;
/// Tracing setup.
pub mod logging;
/// Scalers, metrics and the transformer regressor.
pub mod ml;
/// End-to-end run orchestration and reporting.
pub mod pipeline;
