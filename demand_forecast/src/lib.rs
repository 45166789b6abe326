//! # Demand Forecast
//!
//! Monthly retail demand forecasting over a table of sales transactions.
//!
//! ## Features
//!
//! - Transaction loading from CSV with column-name normalisation
//! - Category / region / year filters and month-start aggregation
//! - Sales KPIs (total, by region, by year)
//! - Two forecasting strategies behind one contract:
//!   - `sarima`: SARIMA(0,1,1)(0,1,1)12 with prediction intervals
//!   - `xgboost`: gradient-boosted trees on calendar and lag-12 features
//! - Hold-out backtesting with MAPE and RMSE
//! - A status-string facade ([`service`]) and, behind the `server` feature,
//!   an HTTP API
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::{aggregate, DataLoader, FilterCriteria, ForecastConfig, StrategyKind};
//!
//! # fn main() -> demand_forecast::Result<()> {
//! let config = ForecastConfig::default();
//! let dataset = DataLoader::from_csv(&config.data_path)?;
//!
//! let criteria = FilterCriteria::all().with_category("Technology");
//! let series = aggregate::require_monthly_sales(&dataset, &criteria)?;
//!
//! let forecaster = StrategyKind::Sarima.build(&config)?;
//! let forecast = forecaster.forecast(&series, 12)?;
//! let metrics = forecaster.backtest(&series, config.test_months)?;
//! println!("{} months forecast, {}", forecast.len(), metrics);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod features;
pub mod filter;
pub mod forecast;
pub mod kpi;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod series;
pub mod service;
pub mod strategies;
pub mod utils;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use crate::config::{ForecastConfig, HistoryPolicy};
pub use crate::data::{DataLoader, SalesDataset, TransactionRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::filter::{FilterCriteria, YearFilter};
pub use crate::forecast::{ForecastPoint, ForecastResult};
pub use crate::kpi::KpiSummary;
pub use crate::metrics::{BacktestReport, EvaluationMetrics};
pub use crate::models::{ForecastModel, Prediction, TrainedForecastModel};
pub use crate::series::MonthlySeries;
pub use crate::strategies::{Forecaster, StrategyKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
