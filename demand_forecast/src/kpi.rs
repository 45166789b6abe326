//! Headline sales indicators for a filter selection

use crate::data::SalesDataset;
use crate::filter::FilterCriteria;
use crate::utils::round_cents;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Total sales of one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSales {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Sales")]
    pub sales: f64,
}

/// Total sales of one calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSales {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Sales")]
    pub sales: f64,
}

/// Sales totals for a selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Sum of sales rounded to cents
    pub total_sales: f64,
    /// Regions by descending sales
    pub by_region: Vec<RegionSales>,
    /// Years in ascending order
    pub by_year: Vec<YearSales>,
}

/// Compute the KPI summary; an empty selection yields zero totals
pub fn compute_kpis(dataset: &SalesDataset, criteria: &FilterCriteria) -> KpiSummary {
    let mut total = 0.0;
    let mut regions: HashMap<&str, f64> = HashMap::new();
    let mut years: BTreeMap<i32, f64> = BTreeMap::new();

    for record in dataset.filtered(criteria) {
        total += record.sales;
        *regions.entry(record.region.as_str()).or_insert(0.0) += record.sales;
        *years.entry(record.order_date.year()).or_insert(0.0) += record.sales;
    }

    let mut by_region: Vec<RegionSales> = regions
        .into_iter()
        .map(|(region, sales)| RegionSales {
            region: region.to_string(),
            sales,
        })
        .collect();
    by_region.sort_by(|a, b| b.sales.total_cmp(&a.sales).then_with(|| a.region.cmp(&b.region)));

    KpiSummary {
        total_sales: round_cents(total),
        by_region,
        by_year: years
            .into_iter()
            .map(|(year, sales)| YearSales { year, sales })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransactionRecord;
    use chrono::NaiveDate;

    fn record(year: i32, region: &str, sales: f64) -> TransactionRecord {
        TransactionRecord {
            order_date: NaiveDate::from_ymd_opt(year, 4, 10).unwrap(),
            category: "Office Supplies".to_string(),
            region: region.to_string(),
            sales,
        }
    }

    #[test]
    fn regions_sorted_by_sales_then_name() {
        let dataset = SalesDataset::from_records(vec![
            record(2016, "West", 10.0),
            record(2016, "East", 30.0),
            record(2017, "South", 10.0),
            record(2017, "Central", 0.004),
        ])
        .unwrap();

        let kpis = compute_kpis(&dataset, &FilterCriteria::all());
        let order: Vec<&str> = kpis.by_region.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(order, vec!["East", "South", "West", "Central"]);
        assert_eq!(kpis.total_sales, 50.0);
        assert_eq!(kpis.by_year.len(), 2);
        assert_eq!(kpis.by_year[0].year, 2016);
        assert_eq!(kpis.by_year[0].sales, 40.0);
    }

    #[test]
    fn empty_selection_has_zero_total() {
        let dataset = SalesDataset::from_records(vec![record(2016, "West", 10.0)]).unwrap();
        let kpis = compute_kpis(&dataset, &FilterCriteria::all().with_region("North"));
        assert_eq!(kpis, KpiSummary::default());
    }

    #[test]
    fn serializes_with_column_names() {
        let dataset = SalesDataset::from_records(vec![record(2016, "West", 12.5)]).unwrap();
        let json = serde_json::to_value(compute_kpis(&dataset, &FilterCriteria::all())).unwrap();
        assert_eq!(json["by_region"][0]["Region"], "West");
        assert_eq!(json["by_year"][0]["Year"], 2016);
        assert_eq!(json["by_year"][0]["Sales"], 12.5);
    }
}
