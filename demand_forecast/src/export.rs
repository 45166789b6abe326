//! CSV export of forecast tables

use crate::error::Result;
use crate::forecast::ForecastResult;
use std::io::Write;

/// Header written before the forecast rows
pub const FORECAST_CSV_HEADER: [&str; 4] = ["Date", "Sales Forecast", "Lower Bound", "Upper Bound"];

/// Write the forecast as CSV; absent bounds become empty cells
pub fn write_forecast_csv<W: Write>(writer: W, result: &ForecastResult) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(FORECAST_CSV_HEADER)?;

    let optional = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for point in &result.forecast {
        csv_writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            point.sales_forecast.to_string(),
            optional(point.lower_bound),
            optional(point.upper_bound),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastPoint;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_header_and_rows() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let result = ForecastResult {
            index: vec![date],
            forecast: vec![ForecastPoint {
                date,
                sales_forecast: 1500.5,
                lower_bound: None,
                upper_bound: None,
            }],
        };

        let mut buffer = Vec::new();
        write_forecast_csv(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Date,Sales Forecast,Lower Bound,Upper Bound\n2018-01-01,1500.5,,\n"
        );
    }
}
