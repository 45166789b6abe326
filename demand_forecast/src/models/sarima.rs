//! Seasonal ARIMA(0,1,1)(0,1,1)12, the "airline" model
//!
//! The series is differenced once at lag 1 and once at lag 12. The remaining
//! process `w_t = e_t + θ e_{t-1} + Θ e_{t-12} + θΘ e_{t-13}` is fitted by
//! conditional sum of squares with pre-sample residuals set to zero. Both MA
//! coefficients are searched as `tanh` of an unconstrained value so the
//! optimiser stays inside the invertible region.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, Prediction, TrainedForecastModel};
use crate::series::MonthlySeries;
use sales_math::differencing::{difference_all, integrate_forecast, integration_weights};
use sales_math::NelderMead;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Seasonal period in months
pub const SEASONAL_PERIOD: usize = 12;

const DIFFERENCING_LAGS: [usize; 2] = [1, SEASONAL_PERIOD];

/// SARIMA(0,1,1)(0,1,1)12 specification
#[derive(Debug, Clone)]
pub struct SarimaModel {
    name: String,
    /// Two-sided coverage of the prediction interval
    confidence_level: f64,
    optimizer: NelderMead,
}

/// Fitted SARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarimaModel {
    name: String,
    /// Non-seasonal MA coefficient
    theta: f64,
    /// Seasonal MA coefficient
    seasonal_theta: f64,
    /// Residual variance
    sigma2: f64,
    /// Normal quantile for the interval half-width
    z: f64,
    history: Vec<f64>,
    residuals: Vec<f64>,
}

impl Default for SarimaModel {
    fn default() -> Self {
        Self {
            name: "SARIMA(0,1,1)(0,1,1)12".to_string(),
            confidence_level: 0.95,
            optimizer: NelderMead::default(),
        }
    }
}

impl SarimaModel {
    /// Create a model producing intervals at `confidence_level`
    pub fn new(confidence_level: f64) -> Result<Self> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be between 0 and 1, got {}",
                confidence_level
            )));
        }
        Ok(Self {
            confidence_level,
            ..Self::default()
        })
    }

    /// Interval coverage
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    fn z_score(&self) -> Result<f64> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ModelFit(format!("standard normal unavailable: {}", e)))?;
        Ok(normal.inverse_cdf(0.5 + self.confidence_level / 2.0))
    }
}

/// One-step residuals of the airline MA process given its coefficients
pub fn css_residuals(differenced: &[f64], theta: f64, seasonal_theta: f64) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(differenced.len());
    for (t, &w) in differenced.iter().enumerate() {
        let e = w - ma_component(&residuals, t, theta, seasonal_theta);
        residuals.push(e);
    }
    residuals
}

/// MA part of `w_t` from residuals before `t`; missing residuals count as zero
fn ma_component(residuals: &[f64], t: usize, theta: f64, seasonal_theta: f64) -> f64 {
    let lagged = |lag: usize| {
        t.checked_sub(lag)
            .and_then(|i| residuals.get(i))
            .copied()
            .unwrap_or(0.0)
    };
    theta * lagged(1)
        + seasonal_theta * lagged(SEASONAL_PERIOD)
        + theta * seasonal_theta * lagged(SEASONAL_PERIOD + 1)
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarimaModel;

    fn train(&self, history: &MonthlySeries) -> Result<TrainedSarimaModel> {
        let values = history.values();
        let differenced = difference_all(values, &DIFFERENCING_LAGS)?;

        let fit = self.optimizer.minimize(
            |p| sum_of_squares(&css_residuals(&differenced, p[0].tanh(), p[1].tanh())),
            &[0.0, 0.0],
        )?;

        let theta = fit.point[0].tanh();
        let seasonal_theta = fit.point[1].tanh();
        let residuals = css_residuals(&differenced, theta, seasonal_theta);
        let sigma2 = sum_of_squares(&residuals) / residuals.len() as f64;
        if !sigma2.is_finite() {
            return Err(ForecastError::ModelFit(
                "residual variance is not finite".to_string(),
            ));
        }

        debug!(
            theta,
            seasonal_theta,
            sigma2,
            iterations = fit.iterations,
            converged = fit.converged,
            "fitted {}",
            self.name
        );

        Ok(TrainedSarimaModel {
            name: self.name.clone(),
            theta,
            seasonal_theta,
            sigma2,
            z: self.z_score()?,
            history: values.to_vec(),
            residuals,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaModel {
    /// Fitted `(θ, Θ)`
    pub fn coefficients(&self) -> (f64, f64) {
        (self.theta, self.seasonal_theta)
    }

    /// Residual variance of the differenced process
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// ψ-weights of the integrated model, `ψ_0 = 1`
    fn psi_weights(&self, count: usize) -> Vec<f64> {
        let phi = integration_weights(&DIFFERENCING_LAGS);
        let ma = |j: usize| match j {
            1 => self.theta,
            SEASONAL_PERIOD => self.seasonal_theta,
            j if j == SEASONAL_PERIOD + 1 => self.theta * self.seasonal_theta,
            _ => 0.0,
        };

        let mut psi: Vec<f64> = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let ar: f64 = phi
                .iter()
                .enumerate()
                .take(j)
                .map(|(i, &coef)| coef * psi[j - 1 - i])
                .sum();
            psi.push(ma(j) + ar);
        }
        psi
    }
}

impl TrainedForecastModel for TrainedSarimaModel {
    fn forecast(&self, horizon: usize) -> Result<Prediction> {
        let mut residuals = self.residuals.clone();
        let start = residuals.len();
        let mut differenced = Vec::with_capacity(horizon);
        for t in start..start + horizon {
            differenced.push(ma_component(&residuals, t, self.theta, self.seasonal_theta));
            // future shocks have zero expectation
            residuals.push(0.0);
        }

        let mean = integrate_forecast(&self.history, &differenced, &DIFFERENCING_LAGS)?;

        let psi = self.psi_weights(horizon);
        let mut cumulative = 0.0;
        let intervals = psi
            .iter()
            .zip(&mean)
            .map(|(weight, m)| {
                cumulative += weight * weight;
                let half_width = self.z * (self.sigma2 * cumulative).sqrt();
                (m - half_width, m + half_width)
            })
            .collect();

        Prediction::new_with_intervals(mean, horizon, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> MonthlySeries {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start.checked_add_months(chrono::Months::new(i as u32)).unwrap())
            .collect();
        MonthlySeries::new(dates, values).unwrap()
    }

    #[test]
    fn residuals_of_pure_ma_process_are_recovered() {
        let shocks: Vec<f64> = (0..40).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
        let (theta, big_theta) = (0.4, -0.3);
        let w: Vec<f64> = (0..shocks.len())
            .map(|t| shocks[t] + ma_component(&shocks[..t], t, theta, big_theta))
            .collect();
        let recovered = css_residuals(&w, theta, big_theta);
        for (a, b) in recovered.iter().zip(&shocks) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn constant_series_forecasts_constant() {
        let model = SarimaModel::default();
        let trained = model.train(&series(vec![1000.0; 36])).unwrap();
        let prediction = trained.forecast(6).unwrap();
        for v in prediction.values() {
            assert_relative_eq!(*v, 1000.0, epsilon = 1e-6);
        }
        assert_relative_eq!(trained.sigma2(), 0.0);
    }

    #[test]
    fn repeating_season_with_trend_is_extended() {
        let pattern = [5.0, 3.0, 4.0, 6.0, 8.0, 9.0, 7.0, 6.0, 5.0, 7.0, 10.0, 12.0];
        let values: Vec<f64> = (0..48)
            .map(|i| 100.0 + 2.0 * i as f64 + pattern[i % 12] * 10.0)
            .collect();
        let trained = SarimaModel::default().train(&series(values)).unwrap();
        let prediction = trained.forecast(12).unwrap();
        for (h, v) in prediction.values().iter().enumerate() {
            let expected = 100.0 + 2.0 * (48 + h) as f64 + pattern[h] * 10.0;
            assert_relative_eq!(*v, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..36)
            .map(|i| 500.0 + ((i * 37) % 11) as f64 * 15.0 + (i % 12) as f64 * 20.0)
            .collect();
        let trained = SarimaModel::default().train(&series(values)).unwrap();
        let prediction = trained.forecast(24).unwrap();
        let widths: Vec<f64> = prediction
            .intervals()
            .unwrap()
            .iter()
            .map(|(lo, hi)| hi - lo)
            .collect();
        assert!(widths.windows(2).all(|w| w[1] >= w[0] - 1e-9));
        for ((lo, hi), m) in prediction.intervals().unwrap().iter().zip(prediction.values()) {
            assert!(lo <= m && m <= hi);
        }
        let (theta, big_theta) = trained.coefficients();
        assert!(theta.abs() <= 1.0 && big_theta.abs() <= 1.0);
    }

    #[test]
    fn first_psi_weights_follow_integrated_form() {
        let trained = TrainedSarimaModel {
            name: "test".to_string(),
            theta: 0.5,
            seasonal_theta: 0.0,
            sigma2: 1.0,
            z: 1.96,
            history: Vec::new(),
            residuals: Vec::new(),
        };
        // below the seasonal lag only the first difference contributes
        let psi = trained.psi_weights(4);
        assert_relative_eq!(psi[0], 1.0);
        assert_relative_eq!(psi[1], 1.5);
        assert_relative_eq!(psi[2], 1.5);
        assert_relative_eq!(psi[3], 1.5);
    }

    #[test]
    fn too_short_history_is_an_error() {
        let result = SarimaModel::default().train(&series(vec![1.0; 13]));
        assert!(matches!(result, Err(ForecastError::MathError(_))));
    }

    #[test]
    fn invalid_confidence_is_rejected() {
        assert!(SarimaModel::new(1.0).is_err());
        assert_relative_eq!(SarimaModel::new(0.8).unwrap().confidence_level(), 0.8);
    }
}
