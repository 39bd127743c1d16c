use std::fs;
use std::path::PathBuf;
use log::LevelFilter;
use serde::Deserialize;
use crate::corrections::CorrectionWeights;
use crate::errors::ConfigError;
use crate::observations::MAX_DISTANCE_DAYS;
use crate::registry::default_models_dir;

#[derive(Deserialize)]
#[serde(default)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

impl Default for General {
    fn default() -> Self {
        General { log_path: None, log_level: LevelFilter::Info, log_to_stdout: true }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Models {
    pub dir: Option<String>,
}

impl Models {
    /// Returns the configured models directory, or the working directory based default
    pub fn resolve_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(dir),
            None => default_models_dir(),
        }
    }
}

/// Values reported for a variable whose model is unavailable
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FallbackDefaults {
    pub precipitation_mm: f64,
    pub humidity_pct: f64,
    pub cloud_cover_pct: f64,
    pub wind_speed_ms: f64,
}

impl Default for FallbackDefaults {
    fn default() -> Self {
        FallbackDefaults {
            precipitation_mm: 0.0,
            humidity_pct: 50.0,
            cloud_cover_pct: 50.0,
            wind_speed_ms: 3.0,
        }
    }
}

#[derive(Deserialize)]
pub struct Observations {
    pub dir: String,
    #[serde(default = "default_max_distance_days")]
    pub max_distance_days: i64,
}

fn default_max_distance_days() -> i64 {
    MAX_DISTANCE_DAYS
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub models: Models,
    pub corrections: CorrectionWeights,
    pub defaults: FallbackDefaults,
    pub observations: Option<Observations>,
}

impl Config {
    /// Checks values that deserialize fine but can not be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.corrections.validate().map_err(ConfigError)?;

        let d = &self.defaults;
        if !(0.0..=100.0).contains(&d.humidity_pct) || !(0.0..=100.0).contains(&d.cloud_cover_pct) {
            return Err(ConfigError::from("default humidity and cloud cover must be within 0-100"));
        }
        if !(d.precipitation_mm >= 0.0 && d.wind_speed_ms >= 0.0) {
            return Err(ConfigError::from("default precipitation and wind speed can not be negative"));
        }
        if let Some(obs) = &self.observations {
            if obs.max_distance_days < 0 {
                return Err(ConfigError::from("observations max_distance_days can not be negative"));
            }
        }

        Ok(())
    }
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.log_level, LevelFilter::Info);
        assert!(config.general.log_to_stdout);
        assert_eq!(config.corrections, CorrectionWeights::default());
        assert_eq!(config.defaults, FallbackDefaults::default());
        assert!(config.observations.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, r#"
            [general]
            log_path = "/tmp/wxcast.log"
            log_level = "Debug"
            log_to_stdout = false

            [models]
            dir = "/srv/models"

            [corrections]
            precip_morning_mult = 1.1
            temp_night_offset = -2.0

            [defaults]
            wind_speed_ms = 2.5

            [observations]
            dir = "/srv/modis"
        "#).unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.general.log_level, LevelFilter::Debug);
        assert_eq!(config.general.log_path.as_deref(), Some("/tmp/wxcast.log"));
        assert_eq!(config.models.resolve_dir(), PathBuf::from("/srv/models"));
        assert_eq!(config.corrections.precip_morning_mult, 1.1);
        assert_eq!(config.corrections.temp_night_offset, -2.0);
        assert_eq!(config.corrections.precip_afternoon_mult, 1.25);
        assert_eq!(config.defaults.wind_speed_ms, 2.5);
        assert_eq!(config.defaults.humidity_pct, 50.0);
        assert_eq!(config.observations.unwrap().max_distance_days, 60);
    }

    #[test]
    fn rejects_unusable_values() {
        let config: Config = toml::from_str("[defaults]\nhumidity_pct = 120.0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[corrections]\nhumidity_vp_to_rh_factor = 0.0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config("/does/not/exist.toml").is_err());
    }
}
