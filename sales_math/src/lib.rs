//! # Sales Math
//!
//! Numerical building blocks used by the demand forecasting models.
//! Nothing in this crate knows about sales, dates or categories; it works on
//! plain `f64` slices so the kernels can be tested in isolation.
//!
//! - [`differencing`]: lagged differencing and its inverse
//! - [`optimize`]: derivative-free Nelder–Mead minimisation
//! - [`boosting`]: gradient-boosted regression trees (squared error)

use thiserror::Error;

pub mod boosting;
pub mod differencing;
pub mod optimize;

pub use boosting::{BoostingParams, GradientBoostedRegressor};
pub use optimize::{Minimum, NelderMead};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean of a slice, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
