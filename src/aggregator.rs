use chrono::NaiveDate;
use log::{info, warn};
use crate::errors::ForecastError;
use crate::models::forecast::{DailyForecast, DailyOutcome, HourlyForecast, SampleFailure};
use crate::predictor::{parse_date, Predictor};

/// Hours sampled per day
pub const SAMPLE_HOURS: [u32; 4] = [0, 6, 12, 18];

/// Max number of days between start and end of a range
pub const MAX_SPAN_DAYS: i64 = 365;

/// Checks that a range is ordered and not longer than `MAX_SPAN_DAYS`
///
/// # Arguments
///
/// * 'start' - first date of the range
/// * 'end' - last date of the range (inclusive)
pub fn validate_span(start: NaiveDate, end: NaiveDate) -> Result<(), ForecastError> {
    let span = (end - start).num_days();
    if span < 0 {
        Err(ForecastError::RangeReversed(start, end))
    } else if span > MAX_SPAN_DAYS {
        Err(ForecastError::RangeTooLong(start, end))
    } else {
        Ok(())
    }
}

/// Reduces a day's hourly samples to daily statistics. Returns `None` if there are no samples.
///
/// # Arguments
///
/// * 'date' - the date the samples belong to
/// * 'samples' - successful hourly forecasts for the date
pub fn aggregate_day(date: NaiveDate, samples: &[HourlyForecast]) -> Option<DailyForecast> {
    if samples.is_empty() {
        return None;
    }

    let mean = |f: fn(&HourlyForecast) -> f64| samples.iter().map(f).sum::<f64>() / samples.len() as f64;
    let temps = samples.iter().map(|s| s.temperature);

    Some(DailyForecast {
        date,
        samples: samples.len(),
        avg_temperature: mean(|s| s.temperature),
        avg_feels_like: mean(|s| s.feels_like),
        min_temperature: temps.clone().fold(f64::INFINITY, f64::min),
        max_temperature: temps.fold(f64::NEG_INFINITY, f64::max),
        total_precipitation: samples.iter().map(|s| s.precipitation).sum(),
        avg_humidity: mean(|s| s.humidity),
        avg_cloud_cover: mean(|s| s.cloud_cover),
        avg_wind_speed: mean(|s| s.wind_speed),
    })
}

/// Predicts the sampled hours of one date and aggregates them. Failed samples are skipped
/// and reported; if none succeed the date is reported as unavailable.
///
/// # Arguments
///
/// * 'predictor' - the predictor to run
/// * 'date' - the date to forecast
pub fn predict_day(predictor: &Predictor, date: NaiveDate) -> DailyOutcome {
    let mut samples: Vec<HourlyForecast> = Vec::with_capacity(SAMPLE_HOURS.len());
    let mut failures: Vec<SampleFailure> = Vec::new();

    for hour in SAMPLE_HOURS {
        match predictor.predict_hourly(date, hour) {
            Ok(forecast) => samples.push(forecast),
            Err(e) => {
                warn!("error predicting {} hour {}: {}", date, hour, e);
                failures.push(SampleFailure { hour, reason: e.to_string() });
            }
        }
    }

    match aggregate_day(date, &samples) {
        Some(forecast) => DailyOutcome::Forecast { forecast, failures },
        None => DailyOutcome::Unavailable { date, failures },
    }
}

/// Predicts daily statistics for every date from start to end, inclusive.
///
/// The whole range is rejected up front if it is reversed or longer than 365 days; after
/// that every date yields exactly one outcome.
///
/// # Arguments
///
/// * 'predictor' - the predictor to run
/// * 'start' - first date
/// * 'end' - last date (inclusive)
pub fn predict_daily_range(predictor: &Predictor, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyOutcome>, ForecastError> {
    validate_span(start, end)?;

    let outcomes: Vec<DailyOutcome> = start.iter_days()
        .take_while(|d| *d <= end)
        .map(|d| predict_day(predictor, d))
        .collect();

    let unavailable = outcomes.iter().filter(|o| o.forecast().is_none()).count();
    info!("range {} - {}: {} days forecast, {} unavailable", start, end, outcomes.len() - unavailable, unavailable);

    Ok(outcomes)
}

/// Same as `predict_daily_range` with dates given as `YYYY-MM-DD`
///
/// # Arguments
///
/// * 'predictor' - the predictor to run
/// * 'start' - first date
/// * 'end' - last date (inclusive)
pub fn predict_daily_range_str(predictor: &Predictor, start: &str, end: &str) -> Result<Vec<DailyOutcome>, ForecastError> {
    predict_daily_range(predictor, parse_date(start)?, parse_date(end)?)
}
