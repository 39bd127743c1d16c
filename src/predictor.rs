use std::path::Path;
use chrono::NaiveDate;
use log::debug;
use crate::config::{Config, FallbackDefaults};
use crate::conversions::{cloud_proxy_to_cover, vapor_pressure_to_humidity, wind_proxy_to_ms};
use crate::corrections::{CorrectionWeights, TimePeriod};
use crate::errors::{ForecastError, ObservationError};
use crate::features::{FeatureRecord, CLEAR_DAY_COV};
use crate::models::forecast::{BasePredictions, HourlyForecast};
use crate::observations::ModisObservations;
use crate::registry::{ModelRegistry, Variable};

/// Clear sky coverage assumed if a record lacks it
const DEFAULT_CLEAR_COV: f64 = 0.5;

/// Parses an ISO `YYYY-MM-DD` date
///
/// # Arguments
///
/// * 'date' - the date string
pub fn parse_date(date: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| ForecastError::InvalidDate(date.to_string(), e))
}

/// Runs the five weather models for a date and hour and applies the tuned corrections
///
/// Predictions are pure given the loaded models and weights, so the same (date, hour)
/// always yields the same forecast.
pub struct Predictor {
    registry: ModelRegistry,
    weights: CorrectionWeights,
    defaults: FallbackDefaults,
    observations: Option<ModisObservations>,
}

impl Predictor {
    /// Returns a new Predictor working on synthesized features only
    ///
    /// # Arguments
    ///
    /// * 'registry' - registry holding (or lazily loading) the model artifacts
    /// * 'weights' - correction weights
    /// * 'defaults' - values used for variables whose model is unavailable
    pub fn new(registry: ModelRegistry, weights: CorrectionWeights, defaults: FallbackDefaults) -> Predictor {
        Predictor { registry, weights, defaults, observations: None }
    }

    /// Adds observed satellite rows that take precedence over synthesized values
    ///
    /// # Arguments
    ///
    /// * 'observations' - observed product rows
    pub fn with_observations(mut self, observations: ModisObservations) -> Predictor {
        self.observations = Some(observations);
        self
    }

    /// Builds a Predictor from configuration, reading observation files if configured.
    /// Model artifacts are not read until first used.
    ///
    /// # Arguments
    ///
    /// * 'config' - the loaded configuration
    pub fn from_config(config: &Config) -> Result<Predictor, ObservationError> {
        let registry = ModelRegistry::new(config.models.resolve_dir());
        let predictor = Predictor::new(registry, config.corrections.clone(), config.defaults.clone());

        match &config.observations {
            Some(obs) => {
                let observations = ModisObservations::load(Path::new(&obs.dir), obs.max_distance_days)?;
                Ok(predictor.with_observations(observations))
            }
            None => Ok(predictor),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn weights(&self) -> &CorrectionWeights {
        &self.weights
    }

    /// Returns the feature record used for a date: synthesized values, overlaid with the
    /// nearest observed row when there is one
    ///
    /// # Arguments
    ///
    /// * 'date' - the date to build features for
    pub fn features(&self, date: NaiveDate) -> FeatureRecord {
        let mut record = FeatureRecord::synthesize(date);
        if let Some((observed, values)) = self.observations.as_ref().and_then(|o| o.nearest(date)) {
            let replaced = record.overlay(values);
            debug!("{}: {} features taken from observation of {}", date, replaced, observed);
        }

        record
    }

    /// Predicts weather for a date and hour
    ///
    /// Fails if the hour is out of range or no temperature model is available; any other
    /// unavailable model is replaced by its configured default.
    ///
    /// # Arguments
    ///
    /// * 'date' - the date to predict for
    /// * 'hour' - hour of day 0-23
    pub fn predict_hourly(&self, date: NaiveDate, hour: u32) -> Result<HourlyForecast, ForecastError> {
        if hour > 23 {
            return Err(ForecastError::InvalidHour(hour));
        }

        let record = self.features(date);

        let temperature_model = self.registry.get(Variable::Temperature)
            .ok_or(ForecastError::MissingArtifact(Variable::Temperature))?;
        let base_temp = temperature_model.predict_record(&record)?;
        if !base_temp.is_finite() {
            return Err(ForecastError::NonFinite(Variable::Temperature));
        }

        let base = BasePredictions {
            temperature_c: base_temp,
            precipitation_mm: self.predict_variable(Variable::Precipitation, &record)?,
            vapor_pressure_pa: self.predict_variable(Variable::Humidity, &record)?,
            cloud_proxy_pct: self.predict_variable(Variable::Cloud, &record)?,
            wind_proxy: self.predict_variable(Variable::Wind, &record)?,
        };

        let clear_cov = record.get(CLEAR_DAY_COV).unwrap_or(DEFAULT_CLEAR_COV);
        let w = &self.weights;
        let d = &self.defaults;

        let forecast = HourlyForecast {
            date,
            hour,
            time_period: TimePeriod::from_hour(hour),
            temperature: base_temp,
            feels_like: w.feels_like(base_temp, hour, clear_cov),
            precipitation: base.precipitation_mm
                .map_or(d.precipitation_mm, |p| w.precipitation(p, hour)),
            humidity: base.vapor_pressure_pa
                .map_or(d.humidity_pct, |vp| vapor_pressure_to_humidity(vp, w.humidity_vp_to_rh_factor)),
            cloud_cover: base.cloud_proxy_pct
                .map_or(d.cloud_cover_pct, |c| cloud_proxy_to_cover(c, w.cloud_baseline_offset)),
            wind_speed: base.wind_proxy
                .map_or(d.wind_speed_ms, |p| wind_proxy_to_ms(p, w.wind_proxy_baseline, w.wind_proxy_scale)),
            base,
        };
        debug!("{}", forecast);

        Ok(forecast)
    }

    /// Same as `predict_hourly` with the date given as `YYYY-MM-DD`
    ///
    /// # Arguments
    ///
    /// * 'date' - the date string
    /// * 'hour' - hour of day 0-23
    pub fn predict_hourly_str(&self, date: &str, hour: u32) -> Result<HourlyForecast, ForecastError> {
        self.predict_hourly(parse_date(date)?, hour)
    }

    /// Runs the model for a variable, `None` if the model is unavailable
    fn predict_variable(&self, variable: Variable, record: &FeatureRecord) -> Result<Option<f64>, ForecastError> {
        let Some(model) = self.registry.get(variable) else {
            return Ok(None);
        };

        let value = model.predict_record(record)?;
        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(ForecastError::NonFinite(variable))
        }
    }
}
