//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::Serialize;
use tracing::warn;

/// Root mean squared error
pub fn root_mean_squared_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(forecast, actual)?;
    let mse = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (a - f).powi(2))
        .sum::<f64>()
        / forecast.len() as f64;
    Ok(mse.sqrt())
}

/// Mean absolute percentage error over the points whose actual value is
/// non-zero, with the number of points used.
///
/// Returns `NaN` when every actual value is zero.
pub fn mean_absolute_percentage_error(forecast: &[f64], actual: &[f64]) -> Result<(f64, usize)> {
    check_lengths(forecast, actual)?;
    let (sum, count) = forecast
        .iter()
        .zip(actual)
        .filter(|(_, a)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (f, a)| {
            (sum + ((a - f) / a).abs(), count + 1)
        });

    if count == 0 {
        return Ok((f64::NAN, 0));
    }
    Ok((sum / count as f64 * 100.0, count))
}

/// Score a hold-out forecast against the actual values
pub fn evaluate_forecast(forecast: &[f64], actual: &[f64]) -> Result<EvaluationMetrics> {
    let rmse = root_mean_squared_error(forecast, actual)?;
    let (mape, mape_observations) = mean_absolute_percentage_error(forecast, actual)?;
    if mape_observations == 0 {
        warn!(
            test_points = actual.len(),
            "every actual value in the test window is zero, MAPE is undefined"
        );
    }

    Ok(EvaluationMetrics {
        test_period_months: actual.len(),
        mape,
        rmse,
        mape_observations,
    })
}

fn check_lengths(forecast: &[f64], actual: &[f64]) -> Result<()> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::DataError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}

/// Backtest accuracy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    /// Length of the hold-out window
    pub test_period_months: usize,
    /// Mean Absolute Percentage Error; `NaN` (JSON `null`) if undefined
    pub mape: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Test points with a non-zero actual value
    pub mape_observations: usize,
}

impl std::fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Backtest Metrics ({} months):", self.test_period_months)?;
        if self.mape.is_nan() {
            writeln!(f, "  MAPE:    n/a")?;
        } else {
            writeln!(f, "  MAPE:    {:.4}%", self.mape)?;
        }
        writeln!(f, "  RMSE:    {:.4}", self.rmse)?;
        Ok(())
    }
}

/// Outcome of a backtest in the status/message contract
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum BacktestReport {
    Success(EvaluationMetrics),
    Error { message: String },
}

impl BacktestReport {
    /// Whether the backtest completed
    pub fn is_success(&self) -> bool {
        matches!(self, BacktestReport::Success(_))
    }

    /// Metrics of a successful backtest
    pub fn metrics(&self) -> Option<&EvaluationMetrics> {
        match self {
            BacktestReport::Success(metrics) => Some(metrics),
            BacktestReport::Error { .. } => None,
        }
    }
}

impl From<Result<EvaluationMetrics>> for BacktestReport {
    fn from(result: Result<EvaluationMetrics>) -> Self {
        match result {
            Ok(metrics) => BacktestReport::Success(metrics),
            Err(e) => BacktestReport::Error {
                message: e.to_string(),
            },
        }
    }
}
