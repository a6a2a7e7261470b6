use crate::error::{PaddysimError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical (year, day-of-year) key for all date-indexed lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey {
    pub year: i32,
    pub doy: u16,
}

impl DayKey {
    pub fn new(year: i32, doy: u16) -> Self {
        Self { year, doy }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            doy: date.ordinal() as u16,
        }
    }

    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, self.doy as u32).ok_or_else(|| {
            PaddysimError::InvalidData(format!("invalid day-of-year key {self}"))
        })
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:03}", self.year, self.doy)
    }
}

/// Whether a record was measured on site or modeled/forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherSource {
    Measured,
    Predicted,
}

/// Reference crop for the ASCE standardized ET equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefCrop {
    /// 0.12-m clipped grass
    Short,
    /// 0.50-m alfalfa
    Tall,
}

/// One day of weather inputs. Optional fields follow the documented
/// fallback chain when absent (see the simulation driver).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Incoming solar radiation (MJ m^-2 d^-1)
    pub srad: Option<f64>,
    /// Daily maximum air temperature (deg C)
    pub tmax: f64,
    /// Daily minimum air temperature (deg C)
    pub tmin: f64,
    /// Actual vapor pressure (kPa)
    pub vapr: Option<f64>,
    /// Dew point temperature (deg C)
    pub tdew: Option<f64>,
    /// Daily maximum relative humidity (%)
    pub rhmax: Option<f64>,
    /// Daily minimum relative humidity (%)
    pub rhmin: Option<f64>,
    /// Wind speed at measurement height (m s^-1)
    pub wndsp: Option<f64>,
    /// Rainfall depth (mm)
    pub rain: f64,
    /// Precomputed reference ET (mm), computed on demand when absent
    pub etref: Option<f64>,
    pub source: WeatherSource,
}

/// Station metadata needed to compute reference ET.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Elevation above sea level (m)
    pub elevation_m: f64,
    /// Latitude (decimal degrees, north positive)
    pub latitude_deg: f64,
    /// Wind measurement height (m)
    pub wind_height_m: f64,
    pub ref_crop: RefCrop,
}

impl Default for Station {
    fn default() -> Self {
        Self {
            elevation_m: 0.0,
            latitude_deg: 0.0,
            wind_height_m: 2.0,
            ref_crop: RefCrop::Short,
        }
    }
}

/// Date-keyed series of daily weather records for one station.
///
/// Lookups are exact-date; a missing key is an explicit error, never a
/// silent substitution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherSeries {
    pub station: Station,
    records: BTreeMap<DayKey, WeatherRecord>,
}

impl WeatherSeries {
    pub fn new(station: Station) -> Self {
        Self {
            station,
            records: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: DayKey, record: WeatherRecord) {
        self.records.insert(key, record);
    }

    pub fn get(&self, key: DayKey) -> Result<&WeatherRecord> {
        self.records.get(&key).ok_or(PaddysimError::MissingWeather {
            year: key.year,
            doy: key.doy,
        })
    }

    /// Rainfall for a date, `None` when the date has no record. Used for
    /// forecast-window sums where absent days count as dry.
    pub fn rain_on(&self, key: DayKey) -> Option<f64> {
        self.records.get(&key).map(|r| r.rain)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DayKey> {
        self.records.keys()
    }
}

/// Saturation vapor pressure at temperature t (kPa), ASCE (2005) Eq. 7.
pub fn sat_vapor_pressure(t: f64) -> f64 {
    0.6108 * ((17.27 * t) / (t + 237.3)).exp()
}

impl WeatherRecord {
    /// Wind speed with the documented default of 2 m/s when absent.
    pub fn wind_speed(&self) -> f64 {
        self.wndsp.unwrap_or(2.0)
    }

    /// Minimum relative humidity (%), derived from dew point when absent
    /// (dew point falling back to tmin), final default 45%.
    pub fn rh_min(&self) -> f64 {
        if let Some(rhmin) = self.rhmin {
            if rhmin.is_finite() {
                return rhmin;
            }
        }
        // ASCE (2005) Eqs. 7 and 8
        let tdew = self.tdew.unwrap_or(self.tmin);
        let emax = sat_vapor_pressure(self.tmax);
        let ea = sat_vapor_pressure(tdew);
        let derived = ea / emax * 100.0;
        if derived.is_finite() {
            derived
        } else {
            45.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rain: f64) -> WeatherRecord {
        WeatherRecord {
            srad: Some(20.0),
            tmax: 34.0,
            tmin: 24.0,
            vapr: None,
            tdew: None,
            rhmax: Some(90.0),
            rhmin: None,
            wndsp: None,
            rain,
            etref: Some(5.0),
            source: WeatherSource::Measured,
        }
    }

    #[test]
    fn day_key_from_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2018, 6, 1).unwrap();
        let key = DayKey::from_date(date);
        assert_eq!(key, DayKey::new(2018, 152));
        assert_eq!(key.date().unwrap(), date);
    }

    #[test]
    fn day_key_ordering_is_chronological() {
        assert!(DayKey::new(2017, 365) < DayKey::new(2018, 1));
        assert!(DayKey::new(2018, 151) < DayKey::new(2018, 152));
    }

    #[test]
    fn missing_date_is_an_error() {
        let series = WeatherSeries::default();
        let err = series.get(DayKey::new(2018, 152)).unwrap_err();
        assert!(matches!(
            err,
            PaddysimError::MissingWeather { year: 2018, doy: 152 }
        ));
    }

    #[test]
    fn wind_speed_defaults_to_two() {
        let rec = record(0.0);
        assert_eq!(rec.wind_speed(), 2.0);
    }

    #[test]
    fn rhmin_derived_from_tmin_when_dewpoint_absent() {
        let rec = record(0.0);
        // tdew = tmin = 24, tmax = 34: ea/emax * 100
        let expected = sat_vapor_pressure(24.0) / sat_vapor_pressure(34.0) * 100.0;
        assert!((rec.rh_min() - expected).abs() < 1e-10);
        assert!(rec.rh_min() > 0.0 && rec.rh_min() < 100.0);
    }

    #[test]
    fn rhmin_prefers_stored_value() {
        let mut rec = record(0.0);
        rec.rhmin = Some(37.5);
        assert_eq!(rec.rh_min(), 37.5);
    }

    #[test]
    fn rain_on_missing_day_is_none() {
        let mut series = WeatherSeries::default();
        series.insert(DayKey::new(2018, 152), record(12.0));
        assert_eq!(series.rain_on(DayKey::new(2018, 152)), Some(12.0));
        assert_eq!(series.rain_on(DayKey::new(2018, 153)), None);
    }
}
