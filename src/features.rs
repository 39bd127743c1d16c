use std::collections::BTreeMap;
use std::f64::consts::PI;
use chrono::{Datelike, NaiveDate};
use crate::conversions::ZERO_CELSIUS_K;
use crate::errors::ForecastError;

/// Amplitude of the day-of-year drift added to the land surface temperatures (Kelvin)
const LST_DRIFT_AMPLITUDE: f64 = 5.0;

/// Surface reflectance bands b01 to b07
const SURFACE_REFLECTANCE: [f64; 7] = [0.15, 0.20, 0.10, 0.15, 0.18, 0.12, 0.08];

/// Emissivity for bands 31 and 32
const EMISSIVITY: [f64; 2] = [0.985, 0.985];

pub const LST_DAY: &str = "MOD11A1_061_LST_Day_1km";
pub const LST_NIGHT: &str = "MOD11A1_061_LST_Night_1km";
pub const CLEAR_DAY_COV: &str = "MOD11A1_061_Clear_day_cov";
pub const CLEAR_NIGHT_COV: &str = "MOD11A1_061_Clear_night_cov";

/// Every feature name the synthesizer produces. Model artifacts may only ask for these.
pub const FEATURE_NAMES: [&str; 31] = [
    "MOD09GA_061_sur_refl_b01_1",
    "MOD09GA_061_sur_refl_b02_1",
    "MOD09GA_061_sur_refl_b03_1",
    "MOD09GA_061_sur_refl_b04_1",
    "MOD09GA_061_sur_refl_b05_1",
    "MOD09GA_061_sur_refl_b06_1",
    "MOD09GA_061_sur_refl_b07_1",
    "MOD09GA_061_SolarAzimuth_1",
    "MOD09GA_061_SolarZenith_1",
    "MOD09GA_061_SensorAzimuth_1",
    "MOD09GA_061_SensorZenith_1",
    "MOD09GA_061_Range_1",
    "MOD09GA_061_iobs_res_1",
    LST_DAY,
    LST_NIGHT,
    "MOD11A1_061_Emis_31",
    "MOD11A1_061_Emis_32",
    CLEAR_DAY_COV,
    CLEAR_NIGHT_COV,
    "MOD10A1_061_NDSI_Snow_Cover",
    "MOD10A1_061_Snow_Albedo_Daily_Tile",
    "MOD10A1_061_NDSI_Snow_Cover_Algorithm_Flags_QA",
    "MOD13A1_061__500m_16_days_NDVI",
    "MOD13A1_061__500m_16_days_EVI",
    "MOD13A1_061__500m_16_days_VI_Quality",
    "MOD16A2_061_ET_500m",
    "MOD16A2_061_LE_500m",
    "MOD16A2_061_PET_500m",
    "month",
    "day_of_year",
    "season",
];

/// Features always derived from the requested date, never taken from an observation
pub const TEMPORAL_FEATURES: [&str; 3] = ["month", "day_of_year", "season"];

/// Returns true if the synthesizer produces a feature with the given name
///
/// # Arguments
///
/// * 'name' - feature name as listed in a model artifact
pub fn is_known_feature(name: &str) -> bool {
    FEATURE_NAMES.contains(&name)
}

/// Meteorological seasons, numbered the way the models were trained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Season {
    Winter = 1,
    Spring = 2,
    Summer = 3,
    Fall = 4,
}

impl Season {
    /// Returns the season for a month (1-12) using `((month % 12) + 3) / 3`
    ///
    /// # Arguments
    ///
    /// * 'month' - month number, 1 for January
    pub fn from_month(month: u32) -> Season {
        match season_code(month) {
            1 => Season::Winter,
            2 => Season::Spring,
            3 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// Returns the numeric season code used as a model feature
    pub fn code(&self) -> u32 {
        *self as u32
    }

    fn base_values(&self) -> SeasonBase {
        match self {
            Season::Winter => SeasonBase {
                lst_day: ZERO_CELSIUS_K - 5.0, lst_night: ZERO_CELSIUS_K - 10.0, clear_cov: 0.4,
                snow_cover: 0.3, et: 50.0, le: 100.0, evi: 0.2, ndvi: 0.3, pet: 80.0,
            },
            Season::Spring => SeasonBase {
                lst_day: ZERO_CELSIUS_K + 10.0, lst_night: ZERO_CELSIUS_K + 5.0, clear_cov: 0.6,
                snow_cover: 0.05, et: 150.0, le: 300.0, evi: 0.5, ndvi: 0.6, pet: 200.0,
            },
            Season::Summer => SeasonBase {
                lst_day: ZERO_CELSIUS_K + 25.0, lst_night: ZERO_CELSIUS_K + 18.0, clear_cov: 0.7,
                snow_cover: 0.0, et: 250.0, le: 500.0, evi: 0.7, ndvi: 0.8, pet: 350.0,
            },
            Season::Fall => SeasonBase {
                lst_day: ZERO_CELSIUS_K + 12.0, lst_night: ZERO_CELSIUS_K + 7.0, clear_cov: 0.5,
                snow_cover: 0.1, et: 100.0, le: 200.0, evi: 0.4, ndvi: 0.5, pet: 150.0,
            },
        }
    }
}

/// Raw season code, Winter=1 (Dec-Feb) through Fall=4 (Sep-Nov)
///
/// # Arguments
///
/// * 'month' - month number, 1 for January
pub fn season_code(month: u32) -> u32 {
    ((month % 12) + 3) / 3
}

struct SeasonBase {
    lst_day: f64,
    lst_night: f64,
    clear_cov: f64,
    snow_cover: f64,
    et: f64,
    le: f64,
    evi: f64,
    ndvi: f64,
    pet: f64,
}

/// Feature values for one date, keyed by feature name
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    pub date: NaiveDate,
    values: BTreeMap<String, f64>,
}

impl FeatureRecord {
    /// Synthesizes seasonal proxy values standing in for a satellite observation of the date.
    ///
    /// The result is a pure function of the date. There is no range check on the year, far
    /// away dates follow the same periodic formulas.
    ///
    /// # Arguments
    ///
    /// * 'date' - the date to synthesize features for
    pub fn synthesize(date: NaiveDate) -> FeatureRecord {
        let month = date.month();
        let day_of_year = date.ordinal() as f64;
        let season = Season::from_month(month);
        let base = season.base_values();

        let phase = 2.0 * PI * day_of_year / 365.0;
        let drift = phase.sin() * LST_DRIFT_AMPLITUDE;
        let solar_zenith = 45.0 + 20.0 * phase.cos();

        let values: [(&str, f64); 31] = [
            ("MOD09GA_061_sur_refl_b01_1", SURFACE_REFLECTANCE[0]),
            ("MOD09GA_061_sur_refl_b02_1", SURFACE_REFLECTANCE[1]),
            ("MOD09GA_061_sur_refl_b03_1", SURFACE_REFLECTANCE[2]),
            ("MOD09GA_061_sur_refl_b04_1", SURFACE_REFLECTANCE[3]),
            ("MOD09GA_061_sur_refl_b05_1", SURFACE_REFLECTANCE[4]),
            ("MOD09GA_061_sur_refl_b06_1", SURFACE_REFLECTANCE[5]),
            ("MOD09GA_061_sur_refl_b07_1", SURFACE_REFLECTANCE[6]),
            ("MOD09GA_061_SolarAzimuth_1", 180.0),
            ("MOD09GA_061_SolarZenith_1", solar_zenith),
            ("MOD09GA_061_SensorAzimuth_1", 180.0),
            ("MOD09GA_061_SensorZenith_1", 45.0),
            ("MOD09GA_061_Range_1", 1000.0),
            ("MOD09GA_061_iobs_res_1", 500.0),
            (LST_DAY, base.lst_day + drift),
            (LST_NIGHT, base.lst_night + drift),
            ("MOD11A1_061_Emis_31", EMISSIVITY[0]),
            ("MOD11A1_061_Emis_32", EMISSIVITY[1]),
            (CLEAR_DAY_COV, base.clear_cov),
            (CLEAR_NIGHT_COV, base.clear_cov),
            ("MOD10A1_061_NDSI_Snow_Cover", base.snow_cover),
            ("MOD10A1_061_Snow_Albedo_Daily_Tile", base.snow_cover * 0.8),
            ("MOD10A1_061_NDSI_Snow_Cover_Algorithm_Flags_QA", 0.0),
            ("MOD13A1_061__500m_16_days_NDVI", base.ndvi),
            ("MOD13A1_061__500m_16_days_EVI", base.evi),
            ("MOD13A1_061__500m_16_days_VI_Quality", 0.0),
            ("MOD16A2_061_ET_500m", base.et),
            ("MOD16A2_061_LE_500m", base.le),
            ("MOD16A2_061_PET_500m", base.pet),
            ("month", month as f64),
            ("day_of_year", day_of_year),
            ("season", season.code() as f64),
        ];

        FeatureRecord {
            date,
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// Returns the value of a single feature
    ///
    /// # Arguments
    ///
    /// * 'name' - feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Replaces known product features with observed values. Names the synthesizer does not
    /// know about, the temporal features and non finite values are ignored.
    ///
    /// # Arguments
    ///
    /// * 'observed' - observed feature values, e.g. from a satellite product row
    pub fn overlay<'a, I>(&mut self, observed: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let mut replaced = 0;
        for (name, value) in observed {
            if value.is_finite() && !TEMPORAL_FEATURES.contains(&name.as_str()) {
                if let Some(v) = self.values.get_mut(name.as_str()) {
                    *v = *value;
                    replaced += 1;
                }
            }
        }

        replaced
    }

    /// Builds the ordered input vector for a model
    ///
    /// # Arguments
    ///
    /// * 'names' - the model's feature names in training order
    pub fn vector(&self, names: &[String]) -> Result<Vec<f64>, ForecastError> {
        names.iter()
            .map(|n| self.get(n).ok_or_else(|| ForecastError::UnknownFeature(n.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn season_partition_is_total() {
        let expected = [1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 1];
        for month in 1..=12 {
            let code = season_code(month);
            assert!((1..=4).contains(&code));
            assert_eq!(code, expected[month as usize - 1], "month {}", month);
        }
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(11), Season::Fall);
        assert_eq!(Season::from_month(12), Season::Winter);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let a = FeatureRecord::synthesize(date(2025, 2, 15));
        let b = FeatureRecord::synthesize(date(2025, 2, 15));
        assert_eq!(a, b);
        for name in FEATURE_NAMES {
            assert_eq!(a.get(name).unwrap().to_bits(), b.get(name).unwrap().to_bits());
        }
    }

    #[test]
    fn produces_every_known_feature() {
        let record = FeatureRecord::synthesize(date(2024, 7, 1));
        assert_eq!(record.len(), FEATURE_NAMES.len());
        for name in FEATURE_NAMES {
            assert!(record.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn winter_values_follow_formula() {
        let record = FeatureRecord::synthesize(date(2025, 2, 15));
        let doy = 46.0;
        let drift = (2.0 * PI * doy / 365.0).sin() * 5.0;

        assert_eq!(record.get("season"), Some(1.0));
        assert_eq!(record.get("month"), Some(2.0));
        assert_eq!(record.get("day_of_year"), Some(doy));
        assert!((record.get(LST_DAY).unwrap() - (268.15 + drift)).abs() < 1e-9);
        assert!((record.get(LST_NIGHT).unwrap() - (263.15 + drift)).abs() < 1e-9);
        assert_eq!(record.get(CLEAR_DAY_COV), Some(0.4));
        assert_eq!(record.get(CLEAR_NIGHT_COV), Some(0.4));
        assert!((record.get("MOD10A1_061_Snow_Albedo_Daily_Tile").unwrap() - 0.24).abs() < 1e-12);
    }

    #[test]
    fn far_dates_still_synthesize() {
        let record = FeatureRecord::synthesize(date(9999, 8, 1));
        assert_eq!(record.get("season"), Some(3.0));
        assert!(record.get(LST_DAY).unwrap().is_finite());
    }

    #[test]
    fn vector_keeps_requested_order() {
        let record = FeatureRecord::synthesize(date(2025, 6, 1));
        let names = vec!["season".to_string(), "month".to_string()];
        assert_eq!(record.vector(&names).unwrap(), vec![3.0, 6.0]);

        let bad = vec!["not_a_feature".to_string()];
        assert!(matches!(record.vector(&bad), Err(ForecastError::UnknownFeature(_))));
    }

    #[test]
    fn overlay_replaces_only_known_finite_values() {
        let mut record = FeatureRecord::synthesize(date(2025, 6, 1));
        let observed: BTreeMap<String, f64> = [
            (LST_DAY.to_string(), 300.0),
            ("Unrelated".to_string(), 1.0),
            (CLEAR_DAY_COV.to_string(), f64::NAN),
        ].into_iter().collect();

        assert_eq!(record.overlay(&observed), 1);
        assert_eq!(record.get(LST_DAY), Some(300.0));
        assert_eq!(record.get(CLEAR_DAY_COV), Some(0.7));
        assert_eq!(record.get("Unrelated"), None);
    }

    #[test]
    fn overlay_keeps_temporal_features_of_the_record_date() {
        let mut record = FeatureRecord::synthesize(date(2025, 3, 20));
        let observed: BTreeMap<String, f64> = [
            ("month".to_string(), 2.0),
            ("day_of_year".to_string(), 51.0),
            ("season".to_string(), 1.0),
            (LST_NIGHT.to_string(), 270.0),
        ].into_iter().collect();

        assert_eq!(record.overlay(&observed), 1);
        assert_eq!(record.get("month"), Some(3.0));
        assert_eq!(record.get("day_of_year"), Some(79.0));
        assert_eq!(record.get("season"), Some(2.0));
        assert_eq!(record.get(LST_NIGHT), Some(270.0));
    }
}
