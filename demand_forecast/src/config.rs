//! Runtime configuration
//!
//! Policy thresholds (minimum history, default backtest window, horizon
//! limits) and model hyper-parameters. Defaults match the behaviour of the
//! forecasting service; every value can be overridden from the environment or
//! a JSON file.

use crate::error::{ForecastError, Result};
use sales_math::BoostingParams;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Default location of the cleaned transactions file
pub const DEFAULT_DATA_PATH: &str = "data/processed/superstore_clean.csv";

/// Configuration for the forecasting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Path of the transactions CSV read at startup
    pub data_path: PathBuf,
    /// Minimum number of monthly points before any model is fitted
    pub min_history_months: usize,
    /// Default size of the backtest hold-out window
    pub test_months: usize,
    /// Largest accepted forecast horizon
    pub max_horizon: usize,
    /// Confidence level of SARIMA prediction intervals
    pub confidence_level: f64,
    /// Hyper-parameters of the tree ensemble
    pub boosting: BoostingParams,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            min_history_months: 24,
            test_months: 12,
            max_horizon: 60,
            confidence_level: 0.95,
            boosting: BoostingParams::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ForecastError::InvalidParameter(format!("{} has an invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

impl ForecastConfig {
    /// Defaults overridden by any `SALES_DATA_PATH` / `FORECAST_*` variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var("SALES_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(v) = env_parse("FORECAST_MIN_HISTORY_MONTHS")? {
            config.min_history_months = v;
        }
        if let Some(v) = env_parse("FORECAST_TEST_MONTHS")? {
            config.test_months = v;
        }
        if let Some(v) = env_parse("FORECAST_MAX_HORIZON")? {
            config.max_horizon = v;
        }
        if let Some(v) = env_parse("FORECAST_CONFIDENCE_LEVEL")? {
            config.confidence_level = v;
        }
        if let Some(v) = env_parse("FORECAST_GBT_TREES")? {
            config.boosting.n_estimators = v;
        }
        if let Some(v) = env_parse("FORECAST_GBT_LEARNING_RATE")? {
            config.boosting.learning_rate = v;
        }
        if let Some(v) = env_parse("FORECAST_GBT_MAX_DEPTH")? {
            config.boosting.max_depth = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ForecastError::InvalidParameter(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.min_history_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_history_months must be greater than zero".to_string(),
            ));
        }
        if self.test_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "test_months must be greater than zero".to_string(),
            ));
        }
        if self.max_horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_horizon must be greater than zero".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        self.boosting.validate()?;
        Ok(())
    }

    /// Minimum history needed to backtest with a hold-out of `test_months`
    pub fn min_backtest_months(&self, test_months: usize) -> usize {
        self.min_history_months + test_months
    }

    /// History policy handed to the forecasting strategies
    pub fn history_policy(&self) -> HistoryPolicy {
        HistoryPolicy {
            min_history_months: self.min_history_months,
            max_horizon: self.max_horizon,
        }
    }
}

/// Minimum-history and horizon limits enforced before a model is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPolicy {
    /// Minimum monthly points needed to fit
    pub min_history_months: usize,
    /// Largest accepted horizon
    pub max_horizon: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        ForecastConfig::default().history_policy()
    }
}

impl HistoryPolicy {
    /// Reject series shorter than the minimum
    pub fn check_forecast(&self, available: usize, horizon: usize) -> Result<()> {
        if horizon == 0 || horizon > self.max_horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be between 1 and {}, got {}",
                self.max_horizon, horizon
            )));
        }
        self.check_length(self.min_history_months, available)
    }

    /// Reject series that cannot provide both a training and a test window
    pub fn check_backtest(&self, available: usize, test_months: usize) -> Result<()> {
        if test_months == 0 {
            return Err(ForecastError::InvalidParameter(
                "test_months must be greater than zero".to_string(),
            ));
        }
        self.check_length(self.min_history_months + test_months, available)
    }

    fn check_length(&self, required: usize, available: usize) -> Result<()> {
        if available < required {
            return Err(ForecastError::InsufficientData { required, available });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_service_policy() {
        let config = ForecastConfig::default();
        assert_eq!(config.min_history_months, 24);
        assert_eq!(config.test_months, 12);
        assert_eq!(config.max_horizon, 60);
        assert_eq!(config.min_backtest_months(12), 36);
        assert_eq!(config.boosting.n_estimators, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn policy_reports_required_and_available() {
        let policy = HistoryPolicy::default();
        match policy.check_forecast(23, 12) {
            Err(ForecastError::InsufficientData { required, available }) => {
                assert_eq!(required, 24);
                assert_eq!(available, 23);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(policy.check_forecast(24, 12).is_ok());
        assert!(matches!(
            policy.check_forecast(24, 61),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            policy.check_backtest(35, 12),
            Err(ForecastError::InsufficientData { required: 36, .. })
        ));
        assert!(policy.check_backtest(40, 0).is_err());
    }

    #[test]
    fn json_file_overrides_selected_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"min_history_months": 30, "boosting": {{"n_estimators": 50}}}}"#).unwrap();

        let config = ForecastConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.min_history_months, 30);
        assert_eq!(config.test_months, 12);
        assert_eq!(config.boosting.n_estimators, 50);
        assert_eq!(config.boosting.max_depth, 6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = ForecastConfig {
            confidence_level: 1.5,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ForecastConfig {
            test_months: 0,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
