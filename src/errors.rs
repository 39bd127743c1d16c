use chrono::NaiveDate;
use thiserror::Error;
use crate::registry::Variable;

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("ArtifactError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ArtifactError::Document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("ArtifactError::Invalid: {0}")]
    Invalid(String),
    #[error("ArtifactError::NotFound: no artifact file for {0}")]
    NotFound(Variable),
}
impl From<&str> for ArtifactError {
    fn from(e: &str) -> Self { ArtifactError::Invalid(e.to_string()) }
}
impl From<String> for ArtifactError {
    fn from(e: String) -> Self { ArtifactError::Invalid(e) }
}

#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("ObservationError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ObservationError::Csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("ObservationError::Pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("ObservationError::Document: {0}")]
    Document(String),
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("invalid date '{0}': {1}")]
    InvalidDate(String, chrono::ParseError),
    #[error("invalid hour {0}, expected 0-23")]
    InvalidHour(u32),
    #[error("date range {0} to {1} exceeds 365 days")]
    RangeTooLong(NaiveDate, NaiveDate),
    #[error("date range end {1} is before start {0}")]
    RangeReversed(NaiveDate, NaiveDate),
    #[error("unknown weather variable '{0}'")]
    UnknownVariable(String),
    #[error("no usable {0} model loaded")]
    MissingArtifact(Variable),
    #[error("feature '{0}' not available for inference")]
    UnknownFeature(String),
    #[error("model expects {0} features, got {1}")]
    FeatureCount(usize, usize),
    #[error("{0} model returned a non finite value")]
    NonFinite(Variable),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("LoggingError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("LoggingError::Config: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("LoggingError::SetLogger: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}
