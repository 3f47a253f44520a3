use anyhow::anyhow;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::Config,
    error::ClientError,
    http::get_json,
    model::{Coordinate, Units, WeatherResponse},
};

const FORECAST_ENDPOINT: &str = "weather";

/// Current-weather lookups against an OpenWeatherMap-compatible endpoint.
///
/// Unlike the flood client there is no fallback: every failure is returned
/// to the caller.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key,
            http: Client::new(),
        }
    }

    /// Build a client from config; fails when no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.weather_api_key().ok_or_else(|| {
            anyhow!(
                "No weather API key configured.\n\
                 Hint: run `floodmap configure` or set FLOODMAP_WEATHER_API_KEY."
            )
        })?;

        Ok(Self::new(&config.weather.base_url, api_key.to_owned()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_forecast(
        &self,
        at: Coordinate,
        units: Units,
    ) -> Result<WeatherResponse, ClientError> {
        let request = self.http.get(&self.base_url).query(&[
            ("lat", at.latitude.to_string()),
            ("lon", at.longitude.to_string()),
            ("units", units.as_str().to_string()),
            ("appid", self.api_key.clone()),
        ]);

        debug!(lat = at.latitude, lon = at.longitude, %units, "requesting current weather");
        get_json(request, FORECAST_ENDPOINT).await
    }
}
