//! Error types for the demand_forecast crate

use polars::prelude::PolarsError;
use sales_math::MathError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The sales file does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The sales file exists but could not be read or parsed
    #[error("failed to load sales data: {0}")]
    LoadError(String),

    /// No dataset is available because loading failed at startup
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// No transactions match the requested filters
    #[error("no data for {category}/{region}/{year}")]
    NoData {
        category: String,
        region: String,
        year: String,
    },

    /// Not enough monthly points for the requested operation
    #[error("insufficient data: {required} months required, {available} available")]
    InsufficientData { required: usize, available: usize },

    /// Fitting or predicting failed inside a model
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// The requested model name is not known
    #[error("unknown model type '{0}': expected 'sarima' or 'xgboost'")]
    UnknownStrategy(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from numerical kernels
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV export
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl ForecastError {
    /// Whether the error means the dataset itself is missing, as opposed to a
    /// problem with one request
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, ForecastError::DataUnavailable(_))
    }
}
