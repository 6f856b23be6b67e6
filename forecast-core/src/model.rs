use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates from user input, rejecting values outside the globe.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow!(
                "Invalid coordinates ({latitude}, {longitude}): latitude must be -90..90, \
                 longitude must be -180..180"
            ));
        }

        Ok(Self { latitude, longitude })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What a single lookup asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates(Coordinates),
}

/// One complete current-conditions reading for a location, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: Option<f64>,
    pub visibility_m: Option<u32>,
    pub cloud_cover_pct: Option<u8>,
    /// Provider classification such as "Clear" or "Rain".
    pub condition: String,
    pub description: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub observed_at: Option<DateTime<Utc>>,
    pub coordinates: Option<Coordinates>,
}

impl WeatherSnapshot {
    /// "London, GB"
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.location_name, self.country_code)
    }

    pub fn rounded_temperature(&self) -> i64 {
        self.temperature_c.round() as i64
    }

    pub fn rounded_feels_like(&self) -> i64 {
        self.feels_like_c.round() as i64
    }

    pub fn wind_speed_kmh(&self) -> i64 {
        (self.wind_speed_mps * 3.6).round() as i64
    }

    pub fn visibility_km(&self) -> Option<u32> {
        self.visibility_m.map(|m| (f64::from(m) / 1000.0).round() as u32)
    }

    /// Sunrise and sunset, only when the provider reported both.
    pub fn sun_times(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.sunrise.zip(self.sunset)
    }
}

#[cfg(test)]
pub(crate) fn sample_snapshot() -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: "London".to_string(),
        country_code: "GB".to_string(),
        temperature_c: 16.4,
        feels_like_c: 15.0,
        temp_min_c: None,
        temp_max_c: None,
        humidity_pct: 70,
        wind_speed_mps: 3.0,
        pressure_hpa: None,
        visibility_m: Some(9_600),
        cloud_cover_pct: None,
        condition: "Clouds".to_string(),
        description: "overcast clouds".to_string(),
        sunrise: None,
        sunset: None,
        observed_at: None,
        coordinates: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(51.5, -0.12).is_ok());
    }

    #[test]
    fn display_helpers() {
        let snap = sample_snapshot();

        assert_eq!(snap.location_label(), "London, GB");
        assert_eq!(snap.rounded_temperature(), 16);
        assert_eq!(snap.wind_speed_kmh(), 11);
        assert_eq!(snap.visibility_km(), Some(10));
        assert!(snap.sun_times().is_none());
    }

    #[test]
    fn sun_times_need_both_ends() {
        let mut snap = sample_snapshot();
        snap.sunrise = DateTime::from_timestamp(1_700_000_000, 0);
        assert!(snap.sun_times().is_none());

        snap.sunset = DateTime::from_timestamp(1_700_030_000, 0);
        assert!(snap.sun_times().is_some());
    }
}
