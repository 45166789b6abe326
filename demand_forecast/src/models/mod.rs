//! Forecasting models for monthly sales series

use crate::error::{ForecastError, Result};
use crate::series::MonthlySeries;
use std::fmt::Debug;

/// Raw model output for the periods after the training data
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Point forecasts
    values: Vec<f64>,
    /// Lower/upper interval per period (optional)
    intervals: Option<Vec<(f64, f64)>>,
}

impl Prediction {
    /// Create a prediction without intervals
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self {
            values,
            intervals: None,
        })
    }

    /// Create a prediction with intervals
    pub fn new_with_intervals(
        values: Vec<f64>,
        horizon: usize,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        let mut prediction = Self::new(values, horizon)?;
        if intervals.len() != horizon {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                horizon,
                intervals.len()
            )));
        }
        prediction.intervals = Some(intervals);
        Ok(prediction)
    }

    /// Point forecasts
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of periods predicted
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Intervals, if the model produces them
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Floor the point forecasts at zero; sales cannot be negative.
    ///
    /// Interval bounds are reported as the model produced them, so a lower
    /// bound may be negative and still shows the full width of the band.
    pub fn clipped(mut self) -> Self {
        for v in &mut self.values {
            *v = v.max(0.0);
        }
        self
    }
}

/// Model fitted to one history
pub trait TrainedForecastModel: Debug + Send {
    /// Predict the `horizon` months following the training data
    fn forecast(&self, horizon: usize) -> Result<Prediction>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Model specification that can be trained on a monthly series
pub trait ForecastModel: Debug + Clone + Send + Sync {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model from scratch
    fn train(&self, history: &MonthlySeries) -> Result<Self::Trained>;

    /// Name of the model
    fn name(&self) -> &str;
}

pub mod gradient_boosting;
pub mod sarima;

pub use gradient_boosting::{GradientBoostingModel, TrainedGradientBoostingModel};
pub use sarima::{SarimaModel, TrainedSarimaModel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_lengths_are_checked() {
        assert!(Prediction::new(vec![1.0, 2.0], 3).is_err());
        assert!(Prediction::new_with_intervals(vec![1.0], 1, vec![]).is_err());
        let p = Prediction::new_with_intervals(vec![1.0], 1, vec![(0.5, 1.5)]).unwrap();
        assert_eq!(p.horizon(), 1);
        assert_eq!(p.intervals(), Some(&[(0.5, 1.5)][..]));
    }

    #[test]
    fn clipping_floors_values_only() {
        let p = Prediction::new_with_intervals(vec![-3.0, 4.0], 2, vec![(-10.0, -1.0), (-2.0, 6.0)])
            .unwrap()
            .clipped();
        assert_eq!(p.values(), &[0.0, 4.0]);
        assert_eq!(p.intervals().unwrap(), &[(-10.0, -1.0), (-2.0, 6.0)]);
    }
}
