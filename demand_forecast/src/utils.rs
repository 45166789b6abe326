//! Calendar helpers shared by the aggregation and forecasting code

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whether `date` is the first day of its month
pub fn is_month_start(date: NaiveDate) -> bool {
    date.day() == 1
}

/// Month-start dates following `last`, one per forecast period
pub fn future_month_starts(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let anchor = month_start(last);
    (1..=horizon)
        .map(|step| {
            u32::try_from(step)
                .ok()
                .and_then(|m| anchor.checked_add_months(Months::new(m)))
                .ok_or_else(|| {
                    ForecastError::InvalidParameter(format!(
                        "cannot advance {} months past {}",
                        step, anchor
                    ))
                })
        })
        .collect()
}

/// Calendar quarter (1-4) of a month number
pub fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Round a currency amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Split a slice into a training prefix and a test suffix of `test_len` items
pub fn train_test_split<T: Clone>(data: &[T], test_len: usize) -> (Vec<T>, Vec<T>) {
    let split = data.len().saturating_sub(test_len);
    (data[..split].to_vec(), data[split..].to_vec())
}
