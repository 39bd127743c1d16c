use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use wxcast::aggregator::predict_daily_range;
use wxcast::config::{load_config, Config};
use wxcast::logging::setup_logger;
use wxcast::models::forecast::{DailyReport, HourlyReport};
use wxcast::predictor::{parse_date, Predictor};
use wxcast::registry::Variable;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file, built-in defaults are used if not given
    #[arg(long, env = "WXCAST_CONFIG")]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast one hour of a date
    Hourly {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Hour of day 0-23
        #[arg(long)]
        hour: u32,
    },
    /// Daily forecasts for an inclusive date range (max 365 days)
    Range {
        /// First date as YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Last date as YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
    /// Load all models and list which are available
    Models,
}

#[derive(Serialize)]
struct ModelStatus {
    variable: Variable,
    available: bool,
    features: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    setup_logger(&config.general)?;
    info!("wxcast version: {}", env!("CARGO_PKG_VERSION"));

    let predictor = Predictor::from_config(&config)?;
    info!("models directory: {}", predictor.registry().dir().display());

    if let Err(e) = run(&cli.command, &predictor) {
        error!("{}", e);
        return Err(e);
    }

    Ok(())
}

fn run(command: &Commands, predictor: &Predictor) -> Result<()> {
    match command {
        Commands::Hourly { date, hour } => {
            let forecast = predictor.predict_hourly_str(date, *hour)?;
            println!("{}", serde_json::to_string_pretty(&HourlyReport::from(&forecast))?);
        }
        Commands::Range { start, end } => {
            let outcomes = predict_daily_range(predictor, parse_date(start)?, parse_date(end)?)?;
            let reports = outcomes.iter().map(DailyReport::from).collect::<Vec<DailyReport>>();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Commands::Models => {
            predictor.registry().preload();
            let status = Variable::ALL.iter()
                .map(|v| {
                    let model = predictor.registry().get(*v);
                    ModelStatus {
                        variable: *v,
                        available: model.is_some(),
                        features: model.map_or(0, |m| m.feature_names().len()),
                    }
                })
                .collect::<Vec<ModelStatus>>();
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
