//! Status-string facade over the pipeline
//!
//! These functions never return `Err`: every failure is folded into the
//! `(value, status)` or `{status, message}` contract consumed by the HTTP
//! layer and the report binary. `"Success"` is the only non-error status.

use crate::aggregate;
use crate::config::ForecastConfig;
use crate::data::{DataLoader, SalesDataset};
use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::forecast::ForecastResult;
use crate::kpi::{self, KpiSummary};
use crate::metrics::BacktestReport;
use crate::series::MonthlySeries;
use crate::strategies::StrategyKind;
use std::path::Path;
use tracing::{error, warn};

/// Status reported when an operation completed
pub const SUCCESS: &str = "Success";

/// Load the transactions file
pub fn load_data<P: AsRef<Path>>(path: P) -> (Option<SalesDataset>, String) {
    match DataLoader::from_csv(path) {
        Ok(dataset) => (Some(dataset), SUCCESS.to_string()),
        Err(e) => {
            error!(error = %e, "failed to load sales data");
            (None, e.to_string())
        }
    }
}

/// Ascending distinct years in the dataset
pub fn list_years(dataset: &SalesDataset) -> Vec<i32> {
    aggregate::list_years(dataset)
}

/// Monthly series for a selection given as raw request values; the flag is
/// false when the selection is invalid or matches nothing
pub fn aggregate_sales(
    dataset: &SalesDataset,
    category: &str,
    region: &str,
    year: &str,
) -> (MonthlySeries, bool) {
    let series = FilterCriteria::from_params(category, region, year)
        .and_then(|criteria| aggregate::monthly_sales(dataset, &criteria));
    match series {
        Ok(series) if !series.is_empty() => (series, true),
        Ok(series) => (series, false),
        Err(e) => {
            warn!(error = %e, "rejected selection");
            (MonthlySeries::empty(), false)
        }
    }
}

/// KPI summary for a selection; an invalid selection yields zero totals
pub fn kpis(dataset: &SalesDataset, category: &str, region: &str, year: &str) -> KpiSummary {
    match FilterCriteria::from_params(category, region, year) {
        Ok(criteria) => kpi::compute_kpis(dataset, &criteria),
        Err(e) => {
            warn!(error = %e, "rejected selection");
            KpiSummary::default()
        }
    }
}

/// Forecast `horizon` months with the named strategy
pub fn forecast(
    strategy_name: &str,
    series: &MonthlySeries,
    horizon: usize,
    config: &ForecastConfig,
) -> (Option<ForecastResult>, String) {
    match try_forecast(strategy_name, series, horizon, config) {
        Ok(result) => (Some(result), SUCCESS.to_string()),
        Err(e) => {
            warn!(strategy = strategy_name, error = %e, "forecast failed");
            (None, e.to_string())
        }
    }
}

/// Backtest the named strategy on the last `test_months` points
pub fn backtest(
    strategy_name: &str,
    series: &MonthlySeries,
    test_months: usize,
    config: &ForecastConfig,
) -> BacktestReport {
    let result = strategy_name
        .parse::<StrategyKind>()
        .and_then(|kind| kind.build(config))
        .and_then(|forecaster| forecaster.backtest(series, test_months));
    if let Err(e) = &result {
        warn!(strategy = strategy_name, error = %e, "backtest failed");
    }
    result.into()
}

fn try_forecast(
    strategy_name: &str,
    series: &MonthlySeries,
    horizon: usize,
    config: &ForecastConfig,
) -> Result<ForecastResult> {
    let forecaster = strategy_name.parse::<StrategyKind>()?.build(config)?;
    forecaster.forecast(series, horizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ALL_CATEGORIES, ALL_REGIONS, ALL_YEARS};

    #[test]
    fn missing_file_status_names_the_path() {
        let (dataset, status) = load_data("/definitely/not/here.csv");
        assert!(dataset.is_none());
        assert_eq!(status, "file not found: /definitely/not/here.csv");
    }

    #[test]
    fn unknown_strategy_is_rejected_before_fitting() {
        let (result, status) = forecast("prophet", &MonthlySeries::empty(), 12, &ForecastConfig::default());
        assert!(result.is_none());
        assert!(status.contains("unknown model type 'prophet'"));

        let report = backtest("prophet", &MonthlySeries::empty(), 12, &ForecastConfig::default());
        assert!(!report.is_success());
    }

    #[test]
    fn bad_year_yields_failure_flag() {
        let dataset = SalesDataset::from_records(Vec::new()).unwrap();
        let (series, ok) = aggregate_sales(&dataset, ALL_CATEGORIES, ALL_REGIONS, "20x6");
        assert!(!ok);
        assert!(series.is_empty());

        let (_, ok) = aggregate_sales(&dataset, ALL_CATEGORIES, ALL_REGIONS, ALL_YEARS);
        assert!(!ok);
        assert_eq!(kpis(&dataset, ALL_CATEGORIES, ALL_REGIONS, "20x6"), KpiSummary::default());
    }
}
