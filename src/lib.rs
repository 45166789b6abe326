//! # Sales Owl
//!
//! Umbrella crate for the retail demand forecasting workspace.
//!
//! - [`demand_forecast`]: loading, aggregation, KPIs, forecasting strategies
//!   and backtesting
//! - [`sales_math`]: numerical kernels used by the models
//!
//! ## Example
//!
//! ```
//! use sales_owl_workspace::demand_forecast::{ForecastConfig, StrategyKind};
//!
//! let kind: StrategyKind = "xgboost".parse().unwrap();
//! let forecaster = kind.build(&ForecastConfig::default()).unwrap();
//! assert_eq!(forecaster.name(), "xgboost");
//! ```

pub use demand_forecast;
pub use sales_math;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexports_are_reachable() {
        assert_eq!(demand_forecast::NAME, "demand_forecast");
        assert_eq!(sales_math::mean(&[2.0, 4.0]), Some(3.0));
    }
}
