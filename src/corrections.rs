use std::fmt;
use serde::{Deserialize, Serialize};

/// Hour-of-day buckets used to pick temperature offsets. Buckets are half open and cover
/// every hour 0-23 exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimePeriod::Morning   => write!(f, "morning"),
            TimePeriod::Afternoon => write!(f, "afternoon"),
            TimePeriod::Evening   => write!(f, "evening"),
            TimePeriod::Night     => write!(f, "night"),
        }
    }
}

impl TimePeriod {
    /// Returns the bucket for an hour: morning [6,12), afternoon [12,18), evening [18,21),
    /// night [21,24) and [0,6)
    ///
    /// # Arguments
    ///
    /// * 'hour' - hour of day
    pub fn from_hour(hour: u32) -> TimePeriod {
        match hour {
            6..=11 => TimePeriod::Morning,
            12..=17 => TimePeriod::Afternoon,
            18..=20 => TimePeriod::Evening,
            _ => TimePeriod::Night,
        }
    }
}

/// Returns true for hours that use the daytime cloud factor, i.e. 6 <= hour < 18
pub fn is_daylight(hour: u32) -> bool {
    (6..18).contains(&hour)
}

/// Tuned correction weights applied on top of the raw model outputs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionWeights {
    pub temp_morning_offset: f64,
    pub temp_afternoon_offset: f64,
    pub temp_evening_offset: f64,
    pub temp_night_offset: f64,
    pub temp_cloud_day_factor: f64,
    pub temp_cloud_night_factor: f64,
    pub precip_morning_mult: f64,
    pub precip_afternoon_mult: f64,
    pub precip_night_mult: f64,
    pub humidity_vp_to_rh_factor: f64,
    pub cloud_baseline_offset: f64,
    pub wind_proxy_scale: f64,
    pub wind_proxy_baseline: f64,
}

impl Default for CorrectionWeights {
    fn default() -> Self {
        CorrectionWeights {
            temp_morning_offset: -5.8419,
            temp_afternoon_offset: -2.3419,
            temp_evening_offset: -3.8419,
            temp_night_offset: -6.3419,
            temp_cloud_day_factor: -1.0,
            temp_cloud_night_factor: 1.5,
            precip_morning_mult: 1.15,
            precip_afternoon_mult: 1.25,
            precip_night_mult: 0.85,
            humidity_vp_to_rh_factor: 16.4476,
            cloud_baseline_offset: 32.5430,
            wind_proxy_scale: 1.3176,
            wind_proxy_baseline: 330.0,
        }
    }
}

impl CorrectionWeights {
    /// Checks that divisors and multipliers are usable
    pub fn validate(&self) -> Result<(), String> {
        if !self.humidity_vp_to_rh_factor.is_finite() || self.humidity_vp_to_rh_factor <= 0.0 {
            return Err(format!("humidity_vp_to_rh_factor must be positive, got {}", self.humidity_vp_to_rh_factor));
        }
        let all = [
            self.temp_morning_offset, self.temp_afternoon_offset, self.temp_evening_offset,
            self.temp_night_offset, self.temp_cloud_day_factor, self.temp_cloud_night_factor,
            self.precip_morning_mult, self.precip_afternoon_mult, self.precip_night_mult,
            self.cloud_baseline_offset, self.wind_proxy_scale, self.wind_proxy_baseline,
        ];
        if all.iter().any(|w| !w.is_finite()) {
            return Err("correction weights must be finite".to_string());
        }

        Ok(())
    }

    /// Returns the additive temperature offset for the hour's bucket
    pub fn temperature_offset(&self, period: TimePeriod) -> f64 {
        match period {
            TimePeriod::Morning   => self.temp_morning_offset,
            TimePeriod::Afternoon => self.temp_afternoon_offset,
            TimePeriod::Evening   => self.temp_evening_offset,
            TimePeriod::Night     => self.temp_night_offset,
        }
    }

    /// Calculates the feels like temperature (degC) from the base model temperature.
    ///
    /// Less clear sky cools during daylight and warms at night, scaled by the day and
    /// night cloud factors respectively.
    ///
    /// # Arguments
    ///
    /// * 'base_temp' - temperature model output in degC
    /// * 'hour' - hour of day
    /// * 'clear_cov' - clear sky coverage fraction (1.0 = clear, 0.0 = overcast)
    pub fn feels_like(&self, base_temp: f64, hour: u32, clear_cov: f64) -> f64 {
        let offset = self.temperature_offset(TimePeriod::from_hour(hour));
        let factor = if is_daylight(hour) {
            self.temp_cloud_day_factor
        } else {
            self.temp_cloud_night_factor
        };

        base_temp + offset + (1.0 - clear_cov) * factor
    }

    /// Returns the precipitation multiplier for an hour. The ranges are inclusive and
    /// intentionally not aligned with the temperature buckets.
    pub fn precipitation_multiplier(&self, hour: u32) -> f64 {
        match hour {
            5..=8 => self.precip_morning_mult,
            15..=18 => self.precip_afternoon_mult,
            h if h >= 21 || h <= 3 => self.precip_night_mult,
            _ => 1.0,
        }
    }

    /// Applies the hour multiplier to a precipitation prediction (mm), never negative
    pub fn precipitation(&self, base_mm: f64, hour: u32) -> f64 {
        (base_mm * self.precipitation_multiplier(hour)).max(0.0)
    }
}
