use std::fmt;
use chrono::NaiveDate;
use serde::Serialize;
use crate::conversions::{celsius_to_fahrenheit, mm_to_inches, ms_to_mph, precipitation_probability};
use crate::corrections::TimePeriod;

/// Raw model outputs before any correction. `None` where the model was unavailable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BasePredictions {
    pub temperature_c: f64,
    pub precipitation_mm: Option<f64>,
    pub vapor_pressure_pa: Option<f64>,
    pub cloud_proxy_pct: Option<f64>,
    pub wind_proxy: Option<f64>,
}

/// Forecast for one date and hour
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub date: NaiveDate,
    pub hour: u32,
    pub time_period: TimePeriod,
    /// Base temperature in degC
    pub temperature: f64,
    /// Feels like temperature in degC
    pub feels_like: f64,
    /// Precipitation in mm
    pub precipitation: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Cloud cover in %
    pub cloud_cover: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    pub base: BasePredictions,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for HourlyForecast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:>02}:00 -> Temp {:>5.1}, FeelsLike {:>5.1}, Precip {:>5.2}, Humidity {:>5.1}, Cloud {:>5.1}, Wind {:>4.1}",
               self.date, self.hour, self.temperature, self.feels_like,
               self.precipitation, self.humidity, self.cloud_cover, self.wind_speed)
    }
}

impl HourlyForecast {
    pub fn temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature)
    }

    pub fn feels_like_f(&self) -> f64 {
        celsius_to_fahrenheit(self.feels_like)
    }

    pub fn precipitation_inches(&self) -> f64 {
        mm_to_inches(self.precipitation)
    }

    pub fn wind_speed_mph(&self) -> f64 {
        ms_to_mph(self.wind_speed)
    }

    pub fn precipitation_probability(&self) -> f64 {
        precipitation_probability(self.precipitation)
    }

    /// Human readable summary, e.g. "Cool afternoon - partly cloudy"
    pub fn description(&self) -> String {
        let feel = match self.feels_like {
            t if t < 0.0 => "Freezing",
            t if t < 10.0 => "Cold",
            t if t < 20.0 => "Cool",
            t if t < 25.0 => "Comfortable",
            t if t < 30.0 => "Warm",
            _ => "Hot",
        };

        let mut conditions: Vec<&str> = Vec::new();
        if self.precipitation > 5.0 {
            conditions.push("rainy");
        } else if self.precipitation > 1.0 {
            conditions.push("light rain");
        }

        if self.cloud_cover > 75.0 {
            conditions.push("cloudy");
        } else if self.cloud_cover > 50.0 {
            conditions.push("partly cloudy");
        } else if self.cloud_cover < 25.0 {
            conditions.push("clear");
        }

        if self.wind_speed_mph() > 20.0 {
            conditions.push("windy");
        }

        if conditions.is_empty() {
            format!("{} {}", feel, self.time_period)
        } else {
            format!("{} {} - {}", feel, self.time_period, conditions.join(", "))
        }
    }
}

/// An hourly forecast together with derived presentation values, as returned to clients
#[derive(Serialize)]
pub struct HourlyReport<'a> {
    #[serde(flatten)]
    pub forecast: &'a HourlyForecast,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub precipitation_inches: f64,
    pub precipitation_probability: f64,
    pub wind_speed_mph: f64,
    pub description: String,
}

impl<'a> From<&'a HourlyForecast> for HourlyReport<'a> {
    fn from(forecast: &'a HourlyForecast) -> Self {
        HourlyReport {
            forecast,
            temperature_f: forecast.temperature_f(),
            feels_like_f: forecast.feels_like_f(),
            precipitation_inches: forecast.precipitation_inches(),
            precipitation_probability: forecast.precipitation_probability(),
            wind_speed_mph: forecast.wind_speed_mph(),
            description: forecast.description(),
        }
    }
}

/// Daily statistics over the sampled hours of one date
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Number of hourly samples that went into the statistics
    pub samples: usize,
    pub avg_temperature: f64,
    pub avg_feels_like: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Sum over the samples, a daily total rather than a rate
    pub total_precipitation: f64,
    pub avg_humidity: f64,
    pub avg_cloud_cover: f64,
    pub avg_wind_speed: f64,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for DailyForecast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> Temp {:>5.1} ({:>5.1} - {:>5.1}), FeelsLike {:>5.1}, Precip {:>5.2}, Humidity {:>5.1}, Cloud {:>5.1}, Wind {:>4.1}",
               self.date, self.avg_temperature, self.min_temperature, self.max_temperature,
               self.avg_feels_like, self.total_precipitation, self.avg_humidity,
               self.avg_cloud_cover, self.avg_wind_speed)
    }
}

impl DailyForecast {
    pub fn avg_temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.avg_temperature)
    }

    pub fn min_temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.min_temperature)
    }

    pub fn max_temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.max_temperature)
    }

    pub fn avg_feels_like_f(&self) -> f64 {
        celsius_to_fahrenheit(self.avg_feels_like)
    }

    pub fn total_precipitation_inches(&self) -> f64 {
        mm_to_inches(self.total_precipitation)
    }

    pub fn avg_wind_speed_mph(&self) -> f64 {
        ms_to_mph(self.avg_wind_speed)
    }
}

/// A failed hourly sample
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleFailure {
    pub hour: u32,
    pub reason: String,
}

/// Result for one date of a range query
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailyOutcome {
    Forecast {
        #[serde(flatten)]
        forecast: DailyForecast,
        /// Samples that were skipped, empty when all hours succeeded
        failures: Vec<SampleFailure>,
    },
    Unavailable {
        date: NaiveDate,
        failures: Vec<SampleFailure>,
    },
}

impl DailyOutcome {
    pub fn date(&self) -> NaiveDate {
        match self {
            DailyOutcome::Forecast { forecast, .. } => forecast.date,
            DailyOutcome::Unavailable { date, .. } => *date,
        }
    }

    pub fn forecast(&self) -> Option<&DailyForecast> {
        match self {
            DailyOutcome::Forecast { forecast, .. } => Some(forecast),
            DailyOutcome::Unavailable { .. } => None,
        }
    }
}

/// A daily outcome together with derived presentation values, as returned to clients
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailyReport<'a> {
    Forecast {
        #[serde(flatten)]
        forecast: &'a DailyForecast,
        avg_temperature_f: f64,
        min_temperature_f: f64,
        max_temperature_f: f64,
        avg_feels_like_f: f64,
        total_precipitation_inches: f64,
        avg_wind_speed_mph: f64,
        failures: &'a [SampleFailure],
    },
    Unavailable {
        date: NaiveDate,
        failures: &'a [SampleFailure],
    },
}

impl<'a> From<&'a DailyOutcome> for DailyReport<'a> {
    fn from(outcome: &'a DailyOutcome) -> Self {
        match outcome {
            DailyOutcome::Forecast { forecast, failures } => DailyReport::Forecast {
                forecast,
                avg_temperature_f: forecast.avg_temperature_f(),
                min_temperature_f: forecast.min_temperature_f(),
                max_temperature_f: forecast.max_temperature_f(),
                avg_feels_like_f: forecast.avg_feels_like_f(),
                total_precipitation_inches: forecast.total_precipitation_inches(),
                avg_wind_speed_mph: forecast.avg_wind_speed_mph(),
                failures,
            },
            DailyOutcome::Unavailable { date, failures } => DailyReport::Unavailable {
                date: *date,
                failures,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(feels_like: f64, precipitation: f64, cloud_cover: f64, wind_speed: f64, hour: u32) -> HourlyForecast {
        HourlyForecast {
            date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            hour,
            time_period: TimePeriod::from_hour(hour),
            temperature: feels_like,
            feels_like,
            precipitation,
            humidity: 60.0,
            cloud_cover,
            wind_speed,
            base: BasePredictions {
                temperature_c: feels_like,
                precipitation_mm: None,
                vapor_pressure_pa: None,
                cloud_proxy_pct: None,
                wind_proxy: None,
            },
        }
    }

    #[test]
    fn describes_feel_and_conditions() {
        assert_eq!(hourly(15.0, 0.0, 60.0, 1.0, 14).description(), "Cool afternoon - partly cloudy");
        assert_eq!(hourly(-3.0, 6.0, 90.0, 10.0, 2).description(), "Freezing night - rainy, cloudy, windy");
        assert_eq!(hourly(22.0, 2.0, 10.0, 1.0, 8).description(), "Comfortable morning - light rain, clear");
        assert_eq!(hourly(31.0, 0.0, 40.0, 1.0, 19).description(), "Hot evening");
    }

    #[test]
    fn imperial_values() {
        let h = hourly(0.0, 25.4, 50.0, 1.0, 12);
        assert_eq!(h.feels_like_f(), 32.0);
        assert!((h.precipitation_inches() - 1.0).abs() < 1e-12);
        assert_eq!(h.precipitation_probability(), 100.0);
    }

    #[test]
    fn report_flattens_forecast() {
        let h = hourly(15.0, 0.0, 60.0, 1.0, 14);
        let json = serde_json::to_value(HourlyReport::from(&h)).unwrap();
        assert_eq!(json["hour"], 14);
        assert_eq!(json["time_period"], "afternoon");
        assert_eq!(json["feels_like_f"], 59.0);
        assert_eq!(json["description"], "Cool afternoon - partly cloudy");
    }

    #[test]
    fn outcome_serializes_with_status() {
        let outcome = DailyOutcome::Unavailable {
            date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            failures: vec![SampleFailure { hour: 0, reason: "no usable temperature model loaded".into() }],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["date"], "2025-02-15");
        assert_eq!(json["failures"][0]["hour"], 0);
    }

    #[test]
    fn daily_report_adds_imperial_values() {
        let forecast = DailyForecast {
            date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            samples: 3,
            avg_temperature: 10.0,
            avg_feels_like: 5.0,
            min_temperature: 0.0,
            max_temperature: 20.0,
            total_precipitation: 25.4,
            avg_humidity: 60.0,
            avg_cloud_cover: 40.0,
            avg_wind_speed: 10.0,
        };
        let outcome = DailyOutcome::Forecast {
            forecast,
            failures: vec![SampleFailure { hour: 6, reason: "no usable temperature model loaded".into() }],
        };

        let json = serde_json::to_value(DailyReport::from(&outcome)).unwrap();
        assert_eq!(json["status"], "forecast");
        assert_eq!(json["date"], "2025-02-15");
        assert_eq!(json["avg_temperature"], 10.0);
        assert_eq!(json["avg_temperature_f"], 50.0);
        assert_eq!(json["min_temperature_f"], 32.0);
        assert_eq!(json["max_temperature_f"], 68.0);
        assert_eq!(json["avg_feels_like_f"], 41.0);
        assert!((json["total_precipitation_inches"].as_f64().unwrap() - 1.0).abs() < 1e-12);
        assert!((json["avg_wind_speed_mph"].as_f64().unwrap() - 22.37).abs() < 1e-12);
        assert_eq!(json["failures"][0]["hour"], 6);
    }

    #[test]
    fn unavailable_report_has_no_values() {
        let outcome = DailyOutcome::Unavailable {
            date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            failures: Vec::new(),
        };
        let json = serde_json::to_value(DailyReport::from(&outcome)).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert!(json.get("avg_temperature_f").is_none());
    }
}
