//! Dated forecast output

use crate::error::{ForecastError, Result};
use crate::models::Prediction;
use crate::utils::round_cents;
use chrono::NaiveDate;
use serde::Serialize;

/// One forecast month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales Forecast")]
    pub sales_forecast: f64,
    #[serde(rename = "Lower Bound")]
    pub lower_bound: Option<f64>,
    #[serde(rename = "Upper Bound")]
    pub upper_bound: Option<f64>,
}

/// Forecast for consecutive months after the history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecast month starts
    pub index: Vec<NaiveDate>,
    /// One entry per month in `index`
    pub forecast: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Attach dates to a model prediction, rounding every amount to cents
    pub fn from_prediction(dates: Vec<NaiveDate>, prediction: &Prediction) -> Result<Self> {
        if dates.len() != prediction.horizon() {
            return Err(ForecastError::DataError(format!(
                "Dates length ({}) doesn't match horizon ({})",
                dates.len(),
                prediction.horizon()
            )));
        }

        let forecast = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let bounds = prediction.intervals().map(|iv| iv[i]);
                ForecastPoint {
                    date,
                    sales_forecast: round_cents(prediction.values()[i]),
                    lower_bound: bounds.map(|(lo, _)| round_cents(lo)),
                    upper_bound: bounds.map(|(_, hi)| round_cents(hi)),
                }
            })
            .collect();

        Ok(Self {
            index: dates,
            forecast,
        })
    }

    /// Number of forecast months
    pub fn len(&self) -> usize {
        self.forecast.len()
    }

    /// Check if the forecast is empty
    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }

    /// Point forecasts in date order
    pub fn values(&self) -> Vec<f64> {
        self.forecast.iter().map(|p| p.sales_forecast).collect()
    }
}
