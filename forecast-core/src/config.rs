use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    geolocation::{DEFAULT_IP_LOOKUP_URL, FixedLocation, Geolocator, IpGeolocator},
    model::Coordinates,
    provider::openweather::DEFAULT_BASE_URL,
};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Where "use my location" gets its coordinates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationSource {
    /// Approximate position from the public IP address.
    #[default]
    Ip,
    /// The `location` coordinates from the config file.
    Fixed,
    /// No location capability at all.
    Disabled,
}

impl GeolocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeolocationSource::Ip => "ip",
            GeolocationSource::Fixed => "fixed",
            GeolocationSource::Disabled => "disabled",
        }
    }

    pub const fn all() -> &'static [GeolocationSource] {
        &[
            GeolocationSource::Ip,
            GeolocationSource::Fixed,
            GeolocationSource::Disabled,
        ]
    }
}

impl std::fmt::Display for GeolocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// reveal_delay_ms = 800
/// geolocation = "fixed"
///
/// [location]
/// latitude = 51.5072
/// longitude = -0.1276
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Minimum time before a successful lookup leaves `Loading`; 0 disables it.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,

    #[serde(default)]
    pub geolocation: GeolocationSource,

    pub location: Option<Coordinates>,

    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,

    #[serde(default = "default_geolocation_timeout_secs")]
    pub geolocation_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_reveal_delay_ms() -> u64 {
    800
}

fn default_geolocation_url() -> String {
    DEFAULT_IP_LOOKUP_URL.to_string()
}

const fn default_geolocation_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            reveal_delay_ms: default_reveal_delay_ms(),
            geolocation: GeolocationSource::default(),
            location: None,
            geolocation_url: default_geolocation_url(),
            geolocation_timeout_secs: default_geolocation_timeout_secs(),
        }
    }
}

impl Config {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    /// Build the configured geolocation capability; `None` means unsupported.
    pub fn geolocator(&self) -> Result<Option<Arc<dyn Geolocator>>> {
        let geolocator: Arc<dyn Geolocator> = match self.geolocation {
            GeolocationSource::Disabled => return Ok(None),
            GeolocationSource::Fixed => {
                let coords = self.location.ok_or_else(|| {
                    anyhow!(
                        "Geolocation source is 'fixed' but no [location] is configured.\n\
                         Hint: run `forecast configure` and enter coordinates."
                    )
                })?;
                Arc::new(FixedLocation::new(coords))
            }
            GeolocationSource::Ip => Arc::new(IpGeolocator::new(self.geolocation_url.clone())),
        };

        Ok(Some(geolocator))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if let Some(loc) = cfg.location {
            Coordinates::new(loc.latitude, loc.longitude)?;
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
