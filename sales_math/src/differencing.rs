//! Lagged differencing and integration
//!
//! Seasonal models work on `(1 - B^lag)` differenced data and need to map
//! forecasts of the differenced series back onto the original scale.

use crate::{MathError, Result};

/// Apply `(1 - B^lag)` to a series, returning `values.len() - lag` points
pub fn difference(values: &[f64], lag: usize) -> Result<Vec<f64>> {
    if lag == 0 {
        return Err(MathError::InvalidInput(
            "Differencing lag must be greater than zero".to_string(),
        ));
    }
    if values.len() <= lag {
        return Err(MathError::InsufficientData(format!(
            "Differencing at lag {} needs more than {} observations, got {}",
            lag,
            lag,
            values.len()
        )));
    }

    Ok(values
        .windows(lag + 1)
        .map(|w| w[lag] - w[0])
        .collect())
}

/// Apply a sequence of differencing operations, e.g. `[1, 12]` for
/// first-order plus seasonal differencing
pub fn difference_all(values: &[f64], lags: &[usize]) -> Result<Vec<f64>> {
    let mut current = values.to_vec();
    for &lag in lags {
        current = difference(&current, lag)?;
    }
    Ok(current)
}

/// Expand a differencing polynomial `prod(1 - B^lag)` into AR-form weights.
///
/// Returns `phi` such that `y_t = sum_i phi[i] * y_{t-1-i} + w_t`, where `w` is
/// the differenced series. For lags `[1, 12]` this yields `phi[0] = 1`,
/// `phi[11] = 1` and `phi[12] = -1`.
pub fn integration_weights(lags: &[usize]) -> Vec<f64> {
    // Polynomial coefficients in B, starting with the constant term
    let mut poly = vec![1.0];
    for &lag in lags {
        let mut next = vec![0.0; poly.len() + lag];
        for (i, &c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + lag] -= c;
        }
        poly = next;
    }

    poly.iter().skip(1).map(|c| -c).collect()
}

/// Undo differencing for a forecast: extend `history` with `differenced`
/// future values and return only the newly integrated points
pub fn integrate_forecast(history: &[f64], differenced: &[f64], lags: &[usize]) -> Result<Vec<f64>> {
    let phi = integration_weights(lags);
    if history.len() < phi.len() {
        return Err(MathError::InsufficientData(format!(
            "Integration needs at least {} historical observations, got {}",
            phi.len(),
            history.len()
        )));
    }

    let mut extended = history.to_vec();
    for &w in differenced {
        let t = extended.len();
        let mut value = w;
        for (i, &coef) in phi.iter().enumerate() {
            if coef != 0.0 {
                value += coef * extended[t - 1 - i];
            }
        }
        extended.push(value);
    }

    Ok(extended.split_off(history.len()))
}
