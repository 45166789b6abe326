#![allow(dead_code)]

use chrono::{Datelike, Months, NaiveDate};
use demand_forecast::{MonthlySeries, SalesDataset, TransactionRecord};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use tempfile::NamedTempFile;

pub const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
pub const CATEGORIES: [&str; 3] = ["Furniture", "Office Supplies", "Technology"];

pub fn month(index: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1)
        .unwrap()
        .checked_add_months(Months::new(index as u32))
        .unwrap()
}

pub fn monthly_series(values: &[f64]) -> MonthlySeries {
    let dates = (0..values.len()).map(month).collect();
    MonthlySeries::new(dates, values.to_vec()).unwrap()
}

/// Trend plus a yearly pattern plus seeded gaussian noise
pub fn noisy_seasonal_series(months: usize, seed: u64) -> MonthlySeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 25.0).unwrap();
    let values: Vec<f64> = (0..months)
        .map(|i| {
            let season = ((i % 12) as f64 / 12.0 * std::f64::consts::TAU).sin() * 200.0;
            (1500.0 + 8.0 * i as f64 + season + noise.sample(&mut rng)).max(0.0)
        })
        .collect();
    monthly_series(&values)
}

/// One record per month worth `value`, rotating through the regions
pub fn constant_dataset(months: usize, value: f64) -> SalesDataset {
    let records = (0..months)
        .map(|i| TransactionRecord {
            order_date: month(i).with_day0(9).unwrap(),
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            region: REGIONS[i % REGIONS.len()].to_string(),
            sales: value,
        })
        .collect();
    SalesDataset::from_records(records).unwrap()
}

/// Several records per month across categories and regions
pub fn mixed_dataset(months: usize, seed: u64) -> SalesDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let amount = Normal::new(250.0, 60.0).unwrap();
    let mut records = Vec::new();
    for i in 0..months {
        for (j, region) in REGIONS.iter().enumerate() {
            records.push(TransactionRecord {
                order_date: month(i).with_day0(((i + j) % 27) as u32).unwrap(),
                category: CATEGORIES[(i + j) % CATEGORIES.len()].to_string(),
                region: region.to_string(),
                sales: f64::max(amount.sample(&mut rng), 1.0),
            });
        }
    }
    SalesDataset::from_records(records).unwrap()
}

pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

/// CSV with `months` rows, each month holding one `value` sale
pub fn constant_csv(months: usize, value: f64) -> NamedTempFile {
    let mut lines = vec!["Row ID,Order Date,Ship Mode,Category,Sub-Category,Region,Sales".to_string()];
    for i in 0..months {
        lines.push(format!(
            "{},{},Standard Class,Technology,Phones,{},{}",
            i + 1,
            month(i).with_day0(14).unwrap().format("%Y-%m-%d"),
            REGIONS[i % REGIONS.len()],
            value
        ));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_csv(&refs)
}
