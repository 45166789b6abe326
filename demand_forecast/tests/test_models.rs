mod common;

use approx::assert_relative_eq;
use demand_forecast::features::{build_features, build_features_with_horizon, FEATURE_NAMES};
use demand_forecast::models::{GradientBoostingModel, SarimaModel};
use demand_forecast::{ForecastModel, TrainedForecastModel};
use sales_math::BoostingParams;

#[test]
fn test_sarima_tracks_noisy_seasonal_series() {
    let series = common::noisy_seasonal_series(60, 42);
    let (train, test) = series.split_tail(12).unwrap();

    let trained = SarimaModel::default().train(&train).unwrap();
    let prediction = trained.forecast(12).unwrap();

    let mean_abs_pct: f64 = prediction
        .values()
        .iter()
        .zip(test.values())
        .map(|(p, a)| ((a - p) / a).abs())
        .sum::<f64>()
        / 12.0;
    assert!(mean_abs_pct < 0.15, "mean absolute percentage error {}", mean_abs_pct);

    let (theta, seasonal_theta) = trained.coefficients();
    assert!(theta.abs() <= 1.0);
    assert!(seasonal_theta.abs() <= 1.0);
    assert!(trained.sigma2() > 0.0);
}

#[test]
fn test_sarima_interval_contains_point() {
    let series = common::noisy_seasonal_series(36, 9);
    let trained = SarimaModel::new(0.95).unwrap().train(&series).unwrap();
    let prediction = trained.forecast(6).unwrap();

    let intervals = prediction.intervals().unwrap();
    assert_eq!(intervals.len(), 6);
    for ((lower, upper), point) in intervals.iter().zip(prediction.values()) {
        assert!(lower < point && point < upper);
        // symmetric around the point forecast
        assert_relative_eq!(point - lower, upper - point, epsilon = 1e-6);
    }
}

#[test]
fn test_sarima_wider_interval_at_higher_confidence() {
    let series = common::noisy_seasonal_series(36, 5);
    let narrow = SarimaModel::new(0.8).unwrap().train(&series).unwrap().forecast(3).unwrap();
    let wide = SarimaModel::new(0.99).unwrap().train(&series).unwrap().forecast(3).unwrap();

    let width = |iv: &[(f64, f64)]| iv[0].1 - iv[0].0;
    assert!(width(wide.intervals().unwrap()) > width(narrow.intervals().unwrap()));
}

#[test]
fn test_boosting_fits_training_history() {
    let series = common::noisy_seasonal_series(48, 3);
    let model = GradientBoostingModel::new(BoostingParams::default()).unwrap();
    let trained = model.train(&series).unwrap();

    let prediction = trained.forecast(12).unwrap();
    assert!(prediction.intervals().is_none());
    assert_eq!(prediction.horizon(), 12);

    let min = series.values().iter().cloned().fold(f64::INFINITY, f64::min);
    for v in prediction.values() {
        assert!(v.is_finite() && *v > min / 2.0, "prediction {}", v);
    }
}

#[test]
fn test_feature_layout() {
    let series = common::noisy_seasonal_series(30, 1);
    let features = build_features(&series);
    assert_eq!(FEATURE_NAMES.len(), features.rows[0].len());
    assert_eq!(features.target, series.values().to_vec());

    let extended = build_features_with_horizon(&series, 6).unwrap();
    assert_eq!(extended.len(), 36);
    assert_eq!(extended.rows[..30], features.rows[..]);
    assert_eq!(extended.dates[30], series.future_dates(1).unwrap()[0]);
}
