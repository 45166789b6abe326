//! HTTP API over the forecasting pipeline

use crate::aggregate;
use crate::config::ForecastConfig;
use crate::data::SalesDataset;
use crate::error::{ForecastError, Result};
use crate::filter::{FilterCriteria, YearFilter, ALL_CATEGORIES, ALL_REGIONS, ALL_YEARS};
use crate::forecast::ForecastPoint;
use crate::kpi::{compute_kpis, KpiSummary};
use crate::metrics::BacktestReport;
use crate::series::SeriesPayload;
use crate::strategies::StrategyKind;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_STEPS: usize = 12;

/// Listener and middleware settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Socket address to listen on
    pub bind: String,
    /// Upper bound on the time spent answering one request
    pub request_timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerSettings {
    /// Defaults overridden by `FORECAST_BIND` and `FORECAST_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: env::var("FORECAST_BIND").unwrap_or(defaults.bind),
            request_timeout: env::var("FORECAST_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    dataset: Option<SalesDataset>,
    load_status: Arc<str>,
    config: Arc<ForecastConfig>,
}

impl AppState {
    /// State from the outcome of the startup load
    pub fn new(dataset: Option<SalesDataset>, load_status: impl Into<String>, config: ForecastConfig) -> Self {
        let load_status: String = load_status.into();
        Self {
            dataset,
            load_status: load_status.into(),
            config: Arc::new(config),
        }
    }

    fn dataset(&self) -> Result<SalesDataset> {
        self.dataset
            .clone()
            .ok_or_else(|| ForecastError::DataUnavailable(self.load_status.to_string()))
    }
}

/// Query parameters shared by the selection endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionQuery {
    #[serde(default = "default_model")]
    pub model_type: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_year")]
    pub year: String,
    pub steps: Option<usize>,
    pub test_months: Option<usize>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

fn default_model() -> String {
    StrategyKind::Sarima.as_str().to_string()
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

fn default_region() -> String {
    ALL_REGIONS.to_string()
}

fn default_year() -> String {
    ALL_YEARS.to_string()
}

impl SelectionQuery {
    /// Filters for this request; a year range may not be combined with a
    /// single year
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let criteria = FilterCriteria::from_params(&self.category, &self.region, &self.year)?;
        let range = YearFilter::range(self.start_year, self.end_year)?;
        match (criteria.year, range) {
            (_, YearFilter::All) => Ok(criteria),
            (YearFilter::All, range) => Ok(criteria.with_year(range)),
            _ => Err(ForecastError::InvalidParameter(
                "use either year or start_year/end_year, not both".to_string(),
            )),
        }
    }
}

type SelectionParams = std::result::Result<Query<SelectionQuery>, QueryRejection>;

/// Unwrap the query string, reporting malformed values as invalid parameters
fn selection(params: SelectionParams) -> Result<SelectionQuery> {
    params
        .map(|Query(query)| query)
        .map_err(|rejection| ForecastError::InvalidParameter(rejection.body_text()))
}

#[derive(Debug, Serialize)]
struct YearRange {
    start_year: Option<i32>,
    end_year: Option<i32>,
}

#[derive(Debug, Serialize)]
struct ForecastBody {
    status: &'static str,
    model_used: StrategyKind,
    year_range: YearRange,
    history: SeriesPayload,
    forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Serialize)]
struct EvaluationBody {
    #[serde(flatten)]
    report: BacktestReport,
    model_used: StrategyKind,
    year_range: YearRange,
}

#[derive(Debug, Serialize)]
struct KpiBody {
    status: &'static str,
    #[serde(flatten)]
    summary: KpiSummary,
}

fn error_response(err: ForecastError) -> Response {
    let status = match &err {
        e if e.is_data_unavailable() => StatusCode::INTERNAL_SERVER_ERROR,
        ForecastError::UnknownStrategy(_) | ForecastError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };
    warn!(status = status.as_u16(), error = %err, "request failed");
    (
        status,
        Json(json!({ "status": "error", "message": err.to_string() })),
    )
        .into_response()
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => error_response(e),
    }
}

/// Run a CPU-bound closure on the blocking pool
async fn blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ForecastError::ModelFit(format!("worker task failed: {}", e)))?
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Welcome message
async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the Retail Forecasting API. See /config/filters for available selections."
    }))
}

/// GET /health - Data availability check
async fn health(State(state): State<AppState>) -> Response {
    match state.dataset() {
        Ok(dataset) => Json(json!({ "status": "ok", "records": dataset.len() })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /config/filters - Selector values with sentinels first
async fn filters(State(state): State<AppState>) -> Response {
    respond(state.dataset().map(|dataset| {
        let options = aggregate::filter_options(&dataset);
        let with_sentinel = |sentinel: &str, values: Vec<String>| {
            std::iter::once(sentinel.to_string())
                .chain(values)
                .collect::<Vec<_>>()
        };
        json!({
            "categories": with_sentinel(ALL_CATEGORIES, options.categories),
            "regions": with_sentinel(ALL_REGIONS, options.regions),
            "years": with_sentinel(ALL_YEARS, options.years.iter().map(|y| y.to_string()).collect()),
            "year_min": options.years.first(),
            "year_max": options.years.last(),
        })
    }))
}

/// GET /sales/forecast - Forecast the selected series
async fn sales_forecast(State(state): State<AppState>, params: SelectionParams) -> Response {
    respond(run_forecast(state, params).await)
}

async fn run_forecast(state: AppState, params: SelectionParams) -> Result<ForecastBody> {
    let dataset = state.dataset()?;
    let query = selection(params)?;
    let kind: StrategyKind = query.model_type.parse()?;
    let criteria = query.criteria()?;
    let steps = query.steps.unwrap_or(DEFAULT_STEPS);
    let config = Arc::clone(&state.config);

    let (history, forecast) = blocking(move || {
        let series = aggregate::require_monthly_sales(&dataset, &criteria)?;
        let forecast = kind.build(&config)?.forecast(&series, steps)?;
        Ok((series.to_payload(), forecast))
    })
    .await?;

    Ok(ForecastBody {
        status: "success",
        model_used: kind,
        year_range: YearRange {
            start_year: query.start_year,
            end_year: query.end_year,
        },
        history,
        forecast: forecast.forecast,
    })
}

/// GET /sales/evaluation - Backtest the selected series
async fn sales_evaluation(State(state): State<AppState>, params: SelectionParams) -> Response {
    respond(run_evaluation(state, params).await)
}

async fn run_evaluation(state: AppState, params: SelectionParams) -> Result<EvaluationBody> {
    let dataset = state.dataset()?;
    let query = selection(params)?;
    let kind: StrategyKind = query.model_type.parse()?;
    let criteria = query.criteria()?;
    let config = Arc::clone(&state.config);
    let test_months = query.test_months.unwrap_or(config.test_months);

    let report = blocking(move || {
        let series = aggregate::require_monthly_sales(&dataset, &criteria)?;
        let forecaster = kind.build(&config)?;
        Ok(BacktestReport::from(forecaster.backtest(&series, test_months)))
    })
    .await?;

    Ok(EvaluationBody {
        report,
        model_used: kind,
        year_range: YearRange {
            start_year: query.start_year,
            end_year: query.end_year,
        },
    })
}

/// GET /sales/kpis - Totals for the selection
async fn sales_kpis(State(state): State<AppState>, params: SelectionParams) -> Response {
    let result = state.dataset().and_then(|dataset| {
        let criteria = selection(params)?.criteria()?;
        Ok(KpiBody {
            status: "success",
            summary: compute_kpis(&dataset, &criteria),
        })
    });
    respond(result)
}

/// Build the application router
pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/config/filters", get(filters))
        .route("/sales/forecast", get(sales_forecast))
        .route("/sales/evaluation", get(sales_evaluation))
        .route("/sales/kpis", get(sales_kpis))
        .with_state(state)
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, settings: ServerSettings) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    info!(bind = %settings.bind, "forecast server listening");
    axum::serve(listener, router(state, &settings)).await?;
    Ok(())
}
