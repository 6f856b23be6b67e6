use crate::{Config, Query, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current-conditions snapshots.
///
/// Implementations return an error for any response that cannot be turned
/// into a complete [`WeatherSnapshot`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &Query) -> anyhow::Result<WeatherSnapshot>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `forecast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::with_base_url(
        api_key,
        config.base_url.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_works_when_key_set() {
        let cfg = Config {
            api_key: Some("KEY".to_string()),
            ..Config::default()
        };

        assert!(provider_from_config(&cfg).is_ok());
    }
}
