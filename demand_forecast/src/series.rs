//! Monthly sales series

use crate::error::{ForecastError, Result};
use crate::utils::{future_month_starts, is_month_start, train_test_split};
use chrono::NaiveDate;
use serde::Serialize;

/// Total sales per calendar month, keyed by month-start date.
///
/// Dates are strictly increasing month starts. Months without transactions
/// are simply absent, so consecutive points are not guaranteed to be one
/// month apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// JSON shape used when a series is returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPayload {
    /// Month-start dates as `YYYY-MM-DD`
    pub index: Vec<NaiveDate>,
    /// Sales totals
    pub data: Vec<f64>,
}

impl MonthlySeries {
    /// Create a series, validating ordering and month-start anchoring
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if let Some(date) = dates.iter().find(|d| !is_month_start(**d)) {
            return Err(ForecastError::DataError(format!(
                "{} is not the first day of a month",
                date
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataError(
                "Series dates must be strictly increasing".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(
                "Series values must be finite".to_string(),
            ));
        }

        Ok(Self { dates, values })
    }

    /// An empty series
    pub fn empty() -> Self {
        Self::default()
    }

    /// Month-start dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Sales totals, aligned with [`dates`](Self::dates)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(date, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of months in the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last month in the series
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Sum of all monthly totals
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Split into the first `len - test_len` points and the last `test_len`
    pub fn split_tail(&self, test_len: usize) -> Result<(MonthlySeries, MonthlySeries)> {
        if test_len > self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "cannot hold out {} months from a series of {}",
                test_len,
                self.len()
            )));
        }
        let (train_dates, test_dates) = train_test_split(&self.dates, test_len);
        let (train_values, test_values) = train_test_split(&self.values, test_len);
        let train = MonthlySeries {
            dates: train_dates,
            values: train_values,
        };
        let test = MonthlySeries {
            dates: test_dates,
            values: test_values,
        };
        Ok((train, test))
    }

    /// Month-start dates for the `horizon` periods after the last point
    pub fn future_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.last_date().ok_or_else(|| {
            ForecastError::DataError("Cannot extend an empty series".to_string())
        })?;
        future_month_starts(last, horizon)
    }

    /// Client payload with `index` and `data` arrays
    pub fn to_payload(&self) -> SeriesPayload {
        SeriesPayload {
            index: self.dates.clone(),
            data: self.values.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn validates_dates() {
        assert!(MonthlySeries::new(vec![month(2020, 1), month(2020, 2)], vec![1.0, 2.0]).is_ok());
        assert!(MonthlySeries::new(vec![month(2020, 2), month(2020, 1)], vec![1.0, 2.0]).is_err());
        assert!(MonthlySeries::new(vec![month(2020, 1)], vec![1.0, 2.0]).is_err());

        let mid_month = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert!(MonthlySeries::new(vec![mid_month], vec![1.0]).is_err());
        assert!(MonthlySeries::new(vec![month(2020, 1)], vec![f64::NAN]).is_err());
    }

    #[test]
    fn split_tail_and_future_dates() {
        let dates: Vec<_> = (1..=6).map(|m| month(2020, m)).collect();
        let series = MonthlySeries::new(dates, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

        let (train, test) = series.split_tail(2).unwrap();
        assert_eq!(train.len(), 4);
        assert_eq!(test.values(), &[5.0, 6.0]);
        assert_eq!(test.dates()[0], month(2020, 5));
        assert!(series.split_tail(7).is_err());

        let future = series.future_dates(2).unwrap();
        assert_eq!(future, vec![month(2020, 7), month(2020, 8)]);
        assert!(MonthlySeries::empty().future_dates(1).is_err());
    }

    #[test]
    fn payload_serializes_iso_dates() {
        let series = MonthlySeries::new(vec![month(2021, 3)], vec![42.5]).unwrap();
        let json = serde_json::to_value(series.to_payload()).unwrap();
        assert_eq!(json["index"][0], "2021-03-01");
        assert_eq!(json["data"][0], 42.5);
    }
}
