use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::model::{Coordinates, Query, WeatherSnapshot};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server in tests.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    fn query_params(&self, query: &Query) -> Vec<(&'static str, String)> {
        let mut params = match query {
            Query::City(name) => vec![("q", name.trim().to_string())],
            Query::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    coord: Option<OwCoord>,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
    clouds: Option<OwClouds>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot> {
        let primary = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather conditions"))?;

        Ok(WeatherSnapshot {
            location_name: self.name,
            country_code: self.sys.country,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            temp_min_c: self.main.temp_min,
            temp_max_c: self.main.temp_max,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            pressure_hpa: self.main.pressure,
            visibility_m: self.visibility,
            cloud_cover_pct: self.clouds.and_then(|c| c.all),
            condition: primary.main,
            description: primary.description,
            sunrise: self.sys.sunrise.and_then(unix_to_utc),
            sunset: self.sys.sunset.and_then(unix_to_utc),
            observed_at: self.dt.and_then(unix_to_utc),
            coordinates: self.coord.map(|c| Coordinates {
                latitude: c.lat,
                longitude: c.lon,
            }),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn current(&self, query: &Query) -> Result<WeatherSnapshot> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        debug!("requesting current conditions");
        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let snapshot = parsed.into_snapshot()?;
        debug!(location = %snapshot.location_label(), condition = %snapshot.condition, "parsed snapshot");
        Ok(snapshot)
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<WeatherSnapshot> {
        let parsed: OwCurrentResponse = serde_json::from_str(json)?;
        parsed.into_snapshot()
    }

    #[test]
    fn maps_minimal_body() {
        let snap = parse(
            r#"{"name":"London","sys":{"country":"GB"},
                "main":{"temp":16,"feels_like":15,"humidity":70},
                "weather":[{"main":"Clouds","description":"overcast clouds"}],
                "wind":{"speed":3}}"#,
        )
        .expect("minimal body should map");

        assert_eq!(snap.location_label(), "London, GB");
        assert_eq!(snap.condition, "Clouds");
        assert_eq!(snap.pressure_hpa, None);
        assert_eq!(snap.visibility_m, None);
    }

    #[test]
    fn maps_optional_fields() {
        let snap = parse(
            r#"{"name":"Oslo","dt":1700000000,"coord":{"lat":59.91,"lon":10.75},
                "sys":{"country":"NO","sunrise":1699990000,"sunset":1700020000},
                "main":{"temp":-2.5,"feels_like":-6,"humidity":80,"temp_min":-4,"temp_max":-1,"pressure":1009},
                "weather":[{"main":"Snow","description":"light snow"},{"main":"Mist","description":"mist"}],
                "wind":{"speed":4.2},"visibility":4000,"clouds":{"all":90}}"#,
        )
        .expect("full body should map");

        assert_eq!(snap.condition, "Snow");
        assert_eq!(snap.temp_min_c, Some(-4.0));
        assert_eq!(snap.temp_max_c, Some(-1.0));
        assert_eq!(snap.pressure_hpa, Some(1009.0));
        assert_eq!(snap.cloud_cover_pct, Some(90));
        assert!(snap.sun_times().is_some());
        assert_eq!(snap.observed_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn rejects_empty_weather_array() {
        let err = parse(
            r#"{"name":"X","sys":{"country":"GB"},
                "main":{"temp":1,"feels_like":1,"humidity":1},
                "weather":[],"wind":{"speed":1}}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("no weather conditions"));
    }

    #[test]
    fn rejects_missing_weather_array() {
        assert!(
            parse(
                r#"{"name":"X","sys":{"country":"GB"},
                    "main":{"temp":1,"feels_like":1,"humidity":1},"wind":{"speed":1}}"#
            )
            .is_err()
        );
    }

    #[test]
    fn city_query_requests_metric_units() {
        let provider = OpenWeatherProvider::new("KEY".into());
        let params = provider.query_params(&Query::City("  Paris ".into()));

        assert!(params.contains(&("q", "Paris".to_string())));
        assert!(params.contains(&("appid", "KEY".to_string())));
        assert!(params.contains(&("units", "metric".to_string())));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
