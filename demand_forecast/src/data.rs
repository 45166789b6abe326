//! Transaction data loading
//!
//! Reads the cleaned transactions CSV into an immutable [`SalesDataset`].
//! Column names are normalised (spaces and hyphens become underscores) and
//! matched case-insensitively against the canonical schema.

use crate::error::{ForecastError, Result};
use crate::filter::FilterCriteria;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Canonical name of the order date column
pub const ORDER_DATE_COLUMN: &str = "Order_Date";
/// Canonical name of the category column
pub const CATEGORY_COLUMN: &str = "Category";
/// Canonical name of the region column
pub const REGION_COLUMN: &str = "Region";
/// Canonical name of the sales amount column
pub const SALES_COLUMN: &str = "Sales";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One retail sale line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Date the order was placed
    pub order_date: NaiveDate,
    /// Product category
    pub category: String,
    /// Sales region
    pub region: String,
    /// Sale amount in currency units
    pub sales: f64,
}

/// Immutable, cheaply clonable handle to the loaded transactions
#[derive(Debug, Clone)]
pub struct SalesDataset {
    records: Arc<[TransactionRecord]>,
}

impl SalesDataset {
    /// Build a dataset from in-memory records
    pub fn from_records(records: Vec<TransactionRecord>) -> Result<Self> {
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| !r.sales.is_finite() || r.sales < 0.0)
        {
            return Err(ForecastError::LoadError(format!(
                "row {} has an invalid sales amount {}",
                row + 1,
                record.sales
            )));
        }

        Ok(Self {
            records: records.into(),
        })
    }

    /// All records in file order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Records passing the given filters
    pub fn filtered<'a>(
        &'a self,
        criteria: &'a FilterCriteria,
    ) -> impl Iterator<Item = &'a TransactionRecord> + 'a {
        self.records.iter().filter(move |r| criteria.matches(r))
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loader for the transactions file
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load transactions from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesDataset> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ForecastError::FileNotFound(path.to_path_buf()),
            _ => ForecastError::IoError(e),
        })?;

        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let dataset = Self::from_dataframe(df)?;
        info!(path = %path.display(), rows = dataset.len(), "loaded sales data");
        Ok(dataset)
    }

    /// Build a dataset from an existing DataFrame
    pub fn from_dataframe(mut df: DataFrame) -> Result<SalesDataset> {
        let normalized: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| normalize_column_name(name))
            .collect();
        df.set_column_names(&normalized)?;

        let dates = utf8_values(find_column(&df, ORDER_DATE_COLUMN)?)?;
        let categories = utf8_values(find_column(&df, CATEGORY_COLUMN)?)?;
        let regions = utf8_values(find_column(&df, REGION_COLUMN)?)?;
        let sales_column = find_column(&df, SALES_COLUMN)?;
        let raw_sales = utf8_values(sales_column)?;
        let sales = f64_values(sales_column)?;

        let mut records = Vec::with_capacity(df.height());
        let mut dropped = 0usize;

        for (row, ((((date, category), region), amount), raw_amount)) in dates
            .into_iter()
            .zip(categories)
            .zip(regions)
            .zip(sales)
            .zip(raw_sales)
            .enumerate()
        {
            // the numeric cast turns unparseable text into null
            if let (None, Some(raw)) = (amount, &raw_amount) {
                if !raw.is_empty() {
                    return Err(ForecastError::LoadError(format!(
                        "row {}: cannot parse {} '{}'",
                        row + 1,
                        SALES_COLUMN,
                        raw
                    )));
                }
            }

            let (Some(date), Some(category), Some(region), Some(amount)) =
                (date, category, region, amount)
            else {
                dropped += 1;
                continue;
            };
            if date.is_empty() {
                dropped += 1;
                continue;
            }

            let order_date = parse_order_date(&date).ok_or_else(|| {
                ForecastError::LoadError(format!(
                    "row {}: cannot parse {} '{}'",
                    row + 1,
                    ORDER_DATE_COLUMN,
                    date
                ))
            })?;

            records.push(TransactionRecord {
                order_date,
                category,
                region,
                sales: amount,
            });
        }

        if dropped > 0 {
            warn!(dropped, "dropped rows with missing required fields");
        }

        SalesDataset::from_records(records)
    }
}

/// Replace spaces and hyphens with underscores
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace([' ', '-'], "_")
}

/// Parse an order date in any of the accepted layouts
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn find_column<'a>(df: &'a DataFrame, canonical: &str) -> Result<&'a Series> {
    df.get_columns()
        .iter()
        .find(|s| s.name().eq_ignore_ascii_case(canonical))
        .ok_or_else(|| ForecastError::LoadError(format!("missing required column '{}'", canonical)))
}

fn utf8_values(series: &Series) -> Result<Vec<Option<String>>> {
    let casted = series.cast(&DataType::Utf8)?;
    let values = casted
        .utf8()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect();
    Ok(values)
}

fn f64_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    let values = casted.f64()?.into_iter().collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_column_names() {
        assert_eq!(normalize_column_name("Order Date"), "Order_Date");
        assert_eq!(normalize_column_name("Sub-Category"), "Sub_Category");
        assert_eq!(normalize_column_name(" Sales "), "Sales");
    }

    #[test]
    fn parses_supported_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        assert_eq!(parse_order_date("2016-11-08"), Some(expected));
        assert_eq!(parse_order_date("2016/11/08"), Some(expected));
        assert_eq!(parse_order_date("11/8/2016"), Some(expected));
        assert_eq!(parse_order_date("2016-11-08 00:00:00"), Some(expected));
        assert_eq!(parse_order_date("2016-11-08T13:45:00"), Some(expected));
        assert_eq!(parse_order_date("not a date"), None);
    }

    #[test]
    fn rejects_negative_sales() {
        let record = TransactionRecord {
            order_date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            category: "X".to_string(),
            region: "Y".to_string(),
            sales: -5.0,
        };
        assert!(matches!(
            SalesDataset::from_records(vec![record]),
            Err(ForecastError::LoadError(_))
        ));
    }

    #[test]
    fn dataset_clones_share_records() {
        let record = TransactionRecord {
            order_date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            category: "X".to_string(),
            region: "Y".to_string(),
            sales: 5.0,
        };
        let dataset = SalesDataset::from_records(vec![record]).unwrap();
        let clone = dataset.clone();
        assert!(std::ptr::eq(dataset.records(), clone.records()));
    }
}
