//! Tabular features for the tree ensemble
//!
//! Each month becomes one row of `[month, quarter, year, lag_12]`. The first
//! twelve rows have no lagged value; they are back-filled from the first
//! available lag, which leaks values from later in the series into the
//! earliest rows. Forecast rows whose lag falls on another forecast row keep
//! a missing (`NaN`) lag.

use crate::error::Result;
use crate::series::MonthlySeries;
use crate::utils::quarter_of;
use chrono::{Datelike, NaiveDate};

/// Seasonal lag used as the autoregressive feature
pub const SEASONAL_LAG: usize = 12;

/// Column names, in row order
pub const FEATURE_NAMES: [&str; 4] = ["month", "quarter", "year", "lag_12"];

/// Feature rows and targets aligned with a list of month-start dates
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
    /// `NaN` for forecast placeholder rows
    pub target: Vec<f64>,
}

impl FeatureMatrix {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last `count` rows
    pub fn tail_rows(&self, count: usize) -> &[Vec<f64>] {
        &self.rows[self.rows.len().saturating_sub(count)..]
    }
}

/// Features and targets for every point of `series`
pub fn build_features(series: &MonthlySeries) -> FeatureMatrix {
    assemble(series.dates().to_vec(), series.values().to_vec())
}

/// Features for `series` followed by `horizon` placeholder months
pub fn build_features_with_horizon(series: &MonthlySeries, horizon: usize) -> Result<FeatureMatrix> {
    let mut dates = series.dates().to_vec();
    let mut values = series.values().to_vec();
    dates.extend(series.future_dates(horizon)?);
    values.resize(dates.len(), f64::NAN);
    Ok(assemble(dates, values))
}

fn assemble(dates: Vec<NaiveDate>, target: Vec<f64>) -> FeatureMatrix {
    let mut lags: Vec<f64> = (0..target.len())
        .map(|i| {
            if i >= SEASONAL_LAG {
                target[i - SEASONAL_LAG]
            } else {
                f64::NAN
            }
        })
        .collect();
    backfill(&mut lags);

    let rows = dates
        .iter()
        .zip(&lags)
        .map(|(date, lag)| {
            vec![
                f64::from(date.month()),
                f64::from(quarter_of(date.month())),
                f64::from(date.year()),
                *lag,
            ]
        })
        .collect();

    FeatureMatrix { dates, rows, target }
}

/// Replace each `NaN` with the next non-missing value below it.
///
/// Missing values with nothing valid after them are left as `NaN`.
pub fn backfill(values: &mut [f64]) {
    let mut next_valid = f64::NAN;
    for value in values.iter_mut().rev() {
        if value.is_nan() {
            *value = next_valid;
        } else {
            next_valid = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(len: usize) -> MonthlySeries {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let dates = crate::utils::future_month_starts(start, len - 1).unwrap();
        let dates: Vec<_> = std::iter::once(start).chain(dates).collect();
        let values = (0..len).map(|i| i as f64 * 10.0).collect();
        MonthlySeries::new(dates, values).unwrap()
    }

    #[test]
    fn backfill_uses_next_valid_value() {
        let mut values = vec![f64::NAN, f64::NAN, 3.0, f64::NAN, 5.0, f64::NAN];
        backfill(&mut values);
        assert_eq!(&values[..5], &[3.0, 3.0, 3.0, 5.0, 5.0]);
        assert!(values[5].is_nan());
    }

    #[test]
    fn calendar_columns_and_lag() {
        let features = build_features(&series(24));
        assert_eq!(features.len(), 24);
        assert_eq!(features.rows[0], vec![1.0, 1.0, 2015.0, 0.0]);
        assert_eq!(features.rows[5][..3], [6.0, 2.0, 2015.0]);
        assert_eq!(features.rows[13][3], 10.0);
        // first twelve lags copy the first real lag (row 12 -> value 0)
        assert!(features.rows[..12].iter().all(|r| r[3] == 0.0));
        assert_eq!(features.target[23], 230.0);
    }

    #[test]
    fn horizon_rows_reference_history() {
        let features = build_features_with_horizon(&series(24), 14).unwrap();
        assert_eq!(features.len(), 38);
        let future = features.tail_rows(14);
        assert_eq!(future[0][..3], [1.0, 1.0, 2017.0]);
        assert_eq!(future[0][3], 120.0);
        assert_eq!(future[11][3], 230.0);
        assert!(future[12][3].is_nan());
        assert!(future[13][3].is_nan());
        assert!(features.target[24].is_nan());
    }
}
