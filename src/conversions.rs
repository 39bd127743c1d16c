//! Unit conversions between model outputs and reported values.
//!
//! All functions are pure. Inputs and outputs carry the unit in the name or doc line.

/// 0 degC in Kelvin
pub const ZERO_CELSIUS_K: f64 = 273.15;

/// Millimeters per inch
const MM_PER_INCH: f64 = 25.4;

/// Miles per hour for one meter per second
const MPH_PER_MS: f64 = 2.237;

/// degC to degF
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Millimeters to inches
pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Meters per second to miles per hour
pub fn ms_to_mph(ms: f64) -> f64 {
    ms * MPH_PER_MS
}

/// Clamps a percentage to [0, 100]
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Clamps a quantity that can not be negative
pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// Converts predicted vapor pressure (Pa) to relative humidity (%) using an empirical
/// scale factor, clamped to [0, 100]
///
/// # Arguments
///
/// * 'vapor_pressure_pa' - vapor pressure in Pa
/// * 'factor' - Pa per percent of relative humidity
pub fn vapor_pressure_to_humidity(vapor_pressure_pa: f64, factor: f64) -> f64 {
    clamp_percent(vapor_pressure_pa / factor)
}

/// Converts the cloud model output (%) to cloud cover by adding a baseline, clamped to [0, 100]
///
/// # Arguments
///
/// * 'prediction' - raw cloud model output in percent
/// * 'baseline_offset' - percent added to the raw output
pub fn cloud_proxy_to_cover(prediction: f64, baseline_offset: f64) -> f64 {
    clamp_percent(prediction + baseline_offset)
}

/// Converts the unitless wind proxy to wind speed in m/s, never negative
///
/// # Arguments
///
/// * 'proxy' - wind model output
/// * 'baseline' - proxy value that maps to calm
/// * 'scale' - m/s per proxy unit above the baseline
pub fn wind_proxy_to_ms(proxy: f64, baseline: f64, scale: f64) -> f64 {
    non_negative((proxy - baseline) * scale)
}

/// Estimates the probability of precipitation (%) from an expected amount in mm
///
/// # Arguments
///
/// * 'mm' - expected precipitation in mm
pub fn precipitation_probability(mm: f64) -> f64 {
    if mm < 0.1 {
        0.0
    } else if mm < 1.0 {
        (mm * 30.0).min(30.0)
    } else if mm < 2.5 {
        30.0 + ((mm - 1.0) * 26.67).min(40.0)
    } else {
        70.0 + ((mm - 2.5) * 6.0).min(30.0)
    }
}
