use demand_forecast::export::write_forecast_csv;
use demand_forecast::filter::{ALL_CATEGORIES, ALL_REGIONS, ALL_YEARS};
use demand_forecast::logging::init_tracing;
use demand_forecast::metrics::BacktestReport;
use demand_forecast::{service, ForecastConfig};
use std::env;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

const USAGE: &str = "usage: forecast_report <sales.csv> [sarima|xgboost] [category] [region] [year] [steps]";

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };
    let arg = |i: usize, default: &str| args.get(i).cloned().unwrap_or_else(|| default.to_string());
    let model = arg(1, "sarima");
    let category = arg(2, ALL_CATEGORIES);
    let region = arg(3, ALL_REGIONS);
    let year = arg(4, ALL_YEARS);
    let steps = match arg(5, "12").parse::<usize>() {
        Ok(steps) => steps,
        Err(_) => {
            eprintln!("steps must be a positive integer\n{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match run(path, &model, &category, &region, &year, steps) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(
    path: &str,
    model: &str,
    category: &str,
    region: &str,
    year: &str,
    steps: usize,
) -> Result<(), String> {
    let config = ForecastConfig::from_env().map_err(|e| e.to_string())?;

    let (dataset, status) = service::load_data(path);
    let dataset = dataset.ok_or(status)?;

    let (series, available) = service::aggregate_sales(&dataset, category, region, year);
    if !available {
        return Err(format!("no data for {}/{}/{}", category, region, year));
    }

    let kpis = service::kpis(&dataset, category, region, year);
    eprintln!("Selection: {} / {} / {}", category, region, year);
    eprintln!("  Months of history: {}", series.len());
    eprintln!("  Total sales:       {:.2}", kpis.total_sales);

    match service::backtest(model, &series, config.test_months, &config) {
        BacktestReport::Success(metrics) => eprint!("{}", metrics),
        BacktestReport::Error { message } => eprintln!("Backtest skipped: {}", message),
    }

    let (forecast, status) = service::forecast(model, &series, steps, &config);
    let forecast = forecast.ok_or(status)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_forecast_csv(&mut writer, &forecast).map_err(|e| e.to_string())?;
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
