//! Geolocation capabilities used by "lookup by my location".

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument};

use crate::model::Coordinates;

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Produces the current position, or fails when access is denied or no fix
/// is available.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates>;
}

/// Always reports the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates> {
        Ok(self.coordinates)
    }
}

/// Approximate position of the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl Geolocator for IpGeolocator {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn locate(&self) -> Result<Coordinates> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Failed to send IP geolocation request")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("IP geolocation request failed with status {status}"));
        }

        let parsed: IpLookupResponse = res
            .json()
            .await
            .context("Failed to parse IP geolocation JSON")?;

        if parsed.status.as_deref() == Some("fail") {
            return Err(anyhow!(
                "IP geolocation refused: {}",
                parsed.message.unwrap_or_else(|| "no reason given".to_string())
            ));
        }

        let (lat, lon) = parsed
            .lat
            .zip(parsed.lon)
            .ok_or_else(|| anyhow!("IP geolocation response had no coordinates"))?;

        let coords = Coordinates::new(lat, lon)?;
        debug!(%coords, "resolved position from IP");
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_location_returns_configured_coordinates() {
        let coords = Coordinates::new(48.85, 2.35).expect("valid");
        let located = FixedLocation::new(coords).locate().await.expect("fixed never fails");
        assert_eq!(located, coords);
    }
}
