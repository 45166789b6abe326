use demand_forecast::logging::init_tracing;
use demand_forecast::server::{serve, AppState, ServerSettings};
use demand_forecast::{service, ForecastConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = ForecastConfig::from_env().map_err(|e| e.to_string())?;
    let settings = ServerSettings::from_env();

    let (dataset, status) = service::load_data(&config.data_path);
    match &dataset {
        Some(dataset) => info!(records = dataset.len(), path = %config.data_path.display(), "sales data ready"),
        None => error!(reason = %status, "starting without data, forecast endpoints will fail"),
    }

    let state = AppState::new(dataset, status, config);
    serve(state, settings).await.map_err(|e| e.to_string())
}
