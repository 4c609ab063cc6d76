//! Error handling for dataset loading and statistical comparison.
//!
//! Every failure is raised at the point of computation and propagated to the
//! caller unchanged. No variant carries a partial result.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolarError {
    #[error("Unknown country: {name} (expected one of Benin, Sierra Leone, Togo)")]
    UnknownCountry { name: String },

    #[error("Data source unavailable: {path} - {reason}")]
    DataSourceUnavailable { path: PathBuf, reason: String },

    #[error("Schema violation in {source_name}: {reason}")]
    SchemaViolation { source_name: String, reason: String },

    #[error("Unknown metric: {metric} is not a numeric column of the dataset")]
    UnknownMetric { metric: String },

    #[error("Insufficient data for {metric}: {reason}")]
    InsufficientData { metric: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SolarError {
    pub fn schema_violation(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_metric(metric: impl Into<String>) -> Self {
        Self::UnknownMetric {
            metric: metric.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolarError>;
