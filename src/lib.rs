//! Hourly and daily weather forecasts from per-variable regression models fed with
//! synthesized (or observed) satellite features.

pub mod aggregator;
pub mod config;
pub mod conversions;
pub mod corrections;
pub mod errors;
pub mod features;
pub mod logging;
pub mod models;
pub mod observations;
pub mod predictor;
pub mod registry;
