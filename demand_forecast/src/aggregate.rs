//! Filtering and monthly aggregation of transactions

use crate::data::SalesDataset;
use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::series::MonthlySeries;
use crate::utils::month_start;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Distinct values available for each filter dimension
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub regions: Vec<String>,
    pub years: Vec<i32>,
}

/// Sum sales per calendar month for the transactions matching `criteria`.
///
/// Months without matching transactions are absent from the result. An empty
/// series is returned when nothing matches; callers decide whether that is an
/// error.
pub fn monthly_sales(dataset: &SalesDataset, criteria: &FilterCriteria) -> Result<MonthlySeries> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in dataset.filtered(criteria) {
        *buckets.entry(month_start(record.order_date)).or_insert(0.0) += record.sales;
    }

    debug!(months = buckets.len(), "aggregated monthly sales");
    let (dates, values) = buckets.into_iter().unzip();
    MonthlySeries::new(dates, values)
}

/// Like [`monthly_sales`] but reports an empty selection as an error
pub fn require_monthly_sales(
    dataset: &SalesDataset,
    criteria: &FilterCriteria,
) -> Result<MonthlySeries> {
    let series = monthly_sales(dataset, criteria)?;
    if series.is_empty() {
        return Err(criteria.no_data_error());
    }
    Ok(series)
}

/// Ascending, de-duplicated order years present in the dataset
pub fn list_years(dataset: &SalesDataset) -> Vec<i32> {
    dataset
        .records()
        .iter()
        .map(|r| r.order_date.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct categories, regions and years
pub fn filter_options(dataset: &SalesDataset) -> FilterOptions {
    let mut categories = BTreeSet::new();
    let mut regions = BTreeSet::new();
    for record in dataset.records() {
        categories.insert(record.category.as_str());
        regions.insert(record.region.as_str());
    }

    FilterOptions {
        categories: categories.into_iter().map(str::to_string).collect(),
        regions: regions.into_iter().map(str::to_string).collect(),
        years: list_years(dataset),
    }
}
