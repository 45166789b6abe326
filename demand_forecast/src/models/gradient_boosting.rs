//! Tree-ensemble forecaster on calendar and seasonal-lag features

use crate::error::{ForecastError, Result};
use crate::features::{build_features, build_features_with_horizon};
use crate::models::{ForecastModel, Prediction, TrainedForecastModel};
use crate::series::MonthlySeries;
use sales_math::{BoostingParams, GradientBoostedRegressor};
use tracing::debug;

/// Gradient-boosted trees with squared-error loss
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    name: String,
    params: BoostingParams,
}

/// Booster fitted to one history
#[derive(Debug, Clone)]
pub struct TrainedGradientBoostingModel {
    name: String,
    regressor: GradientBoostedRegressor,
    history: MonthlySeries,
}

impl Default for GradientBoostingModel {
    fn default() -> Self {
        Self {
            name: "GradientBoosting".to_string(),
            params: BoostingParams::default(),
        }
    }
}

impl GradientBoostingModel {
    /// Create a model with explicit hyper-parameters
    pub fn new(params: BoostingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::default()
        })
    }

    /// Hyper-parameters in use
    pub fn params(&self) -> &BoostingParams {
        &self.params
    }
}

impl ForecastModel for GradientBoostingModel {
    type Trained = TrainedGradientBoostingModel;

    fn train(&self, history: &MonthlySeries) -> Result<TrainedGradientBoostingModel> {
        if history.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot train on an empty series".to_string(),
            ));
        }

        let features = build_features(history);
        let mut regressor = GradientBoostedRegressor::new(self.params.clone())?;
        regressor.fit(&features.rows, &features.target)?;

        debug!(
            rows = features.len(),
            trees = regressor.trees().len(),
            "fitted {}",
            self.name
        );

        Ok(TrainedGradientBoostingModel {
            name: self.name.clone(),
            regressor,
            history: history.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedGradientBoostingModel {
    fn forecast(&self, horizon: usize) -> Result<Prediction> {
        let features = build_features_with_horizon(&self.history, horizon)?;
        let values = self.regressor.predict(features.tail_rows(horizon))?;
        Prediction::new(values, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
