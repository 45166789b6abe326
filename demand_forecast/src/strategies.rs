//! Forecasting strategies behind a common contract
//!
//! A strategy wraps a [`ForecastModel`] with the history policy: it checks
//! the series length, retrains from scratch on every call and turns model
//! output into dated, non-negative forecasts or backtest metrics.

use crate::config::{ForecastConfig, HistoryPolicy};
use crate::error::{ForecastError, Result};
use crate::forecast::ForecastResult;
use crate::metrics::{evaluate_forecast, EvaluationMetrics};
use crate::models::{
    ForecastModel, GradientBoostingModel, Prediction, SarimaModel, TrainedForecastModel,
};
use crate::series::MonthlySeries;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Common interface of the forecasting strategies
pub trait Forecaster: fmt::Debug + Send + Sync {
    /// Strategy name as accepted by [`StrategyKind::from_str`]
    fn name(&self) -> &str;

    /// Forecast the `horizon` months after `history`
    fn forecast(&self, history: &MonthlySeries, horizon: usize) -> Result<ForecastResult>;

    /// Hold out the last `test_months` points, refit on the rest and score
    /// the raw predictions against the held-out values
    fn backtest(&self, history: &MonthlySeries, test_months: usize) -> Result<EvaluationMetrics>;
}

/// Strategy built from a model specification and a history policy
#[derive(Debug, Clone)]
pub struct ModelForecaster<M: ForecastModel> {
    kind: StrategyKind,
    model: M,
    policy: HistoryPolicy,
}

impl<M: ForecastModel> ModelForecaster<M> {
    /// Wrap `model` under `policy`
    pub fn new(kind: StrategyKind, model: M, policy: HistoryPolicy) -> Self {
        Self {
            kind,
            model,
            policy,
        }
    }

    /// The wrapped model specification
    pub fn model(&self) -> &M {
        &self.model
    }

    fn fit_and_predict(&self, history: &MonthlySeries, horizon: usize) -> Result<Prediction> {
        let trained = self.model.train(history).map_err(|e| self.fit_error(e))?;
        debug!(model = trained.name(), points = history.len(), "trained");
        trained.forecast(horizon).map_err(|e| self.fit_error(e))
    }

    fn fit_error(&self, err: ForecastError) -> ForecastError {
        match err {
            ForecastError::ModelFit(_) => err,
            other => ForecastError::ModelFit(format!("{}: {}", self.model.name(), other)),
        }
    }
}

impl<M: ForecastModel> Forecaster for ModelForecaster<M> {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn forecast(&self, history: &MonthlySeries, horizon: usize) -> Result<ForecastResult> {
        self.policy.check_forecast(history.len(), horizon)?;

        let prediction = self.fit_and_predict(history, horizon)?.clipped();
        let result = ForecastResult::from_prediction(history.future_dates(horizon)?, &prediction)?;

        info!(strategy = self.name(), history = history.len(), horizon, "forecast complete");
        Ok(result)
    }

    fn backtest(&self, history: &MonthlySeries, test_months: usize) -> Result<EvaluationMetrics> {
        self.policy.check_backtest(history.len(), test_months)?;

        let (train, test) = history.split_tail(test_months)?;
        let prediction = self.fit_and_predict(&train, test_months)?;
        let metrics = evaluate_forecast(prediction.values(), test.values())?;

        info!(
            strategy = self.name(),
            train = train.len(),
            test = test.len(),
            rmse = metrics.rmse,
            mape = metrics.mape,
            "backtest complete"
        );
        Ok(metrics)
    }
}

/// The available strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Seasonal ARIMA
    Sarima,
    /// Gradient-boosted trees
    #[serde(rename = "xgboost")]
    XgBoost,
}

impl StrategyKind {
    /// Every strategy, in display order
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Sarima, StrategyKind::XgBoost];

    /// Name used in requests and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Sarima => "sarima",
            StrategyKind::XgBoost => "xgboost",
        }
    }

    /// Instantiate the strategy with the configured parameters
    pub fn build(self, config: &ForecastConfig) -> Result<Box<dyn Forecaster>> {
        let policy = config.history_policy();
        let forecaster: Box<dyn Forecaster> = match self {
            StrategyKind::Sarima => Box::new(ModelForecaster::new(
                self,
                SarimaModel::new(config.confidence_level)?,
                policy,
            )),
            StrategyKind::XgBoost => Box::new(ModelForecaster::new(
                self,
                GradientBoostingModel::new(config.boosting.clone())?,
                policy,
            )),
        };
        Ok(forecaster)
    }
}

impl FromStr for StrategyKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sarima" => Ok(StrategyKind::Sarima),
            "xgboost" => Ok(StrategyKind::XgBoost),
            _ => Err(ForecastError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!("sarima".parse::<StrategyKind>().unwrap(), StrategyKind::Sarima);
        assert_eq!(" XGBoost ".parse::<StrategyKind>().unwrap(), StrategyKind::XgBoost);
        assert!(matches!(
            "prophet".parse::<StrategyKind>(),
            Err(ForecastError::UnknownStrategy(name)) if name == "prophet"
        ));
    }

    #[test]
    fn built_strategies_report_their_name() {
        let config = ForecastConfig::default();
        for kind in StrategyKind::ALL {
            let forecaster = kind.build(&config).unwrap();
            assert_eq!(forecaster.name(), kind.as_str());
        }
        assert_eq!(serde_json::to_value(StrategyKind::XgBoost).unwrap(), "xgboost");
    }

    #[test]
    fn policy_runs_before_fitting() {
        let forecaster = StrategyKind::Sarima.build(&ForecastConfig::default()).unwrap();
        let err = forecaster.forecast(&MonthlySeries::empty(), 12).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                required: 24,
                available: 0
            }
        ));
    }
}
