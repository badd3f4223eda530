//! Provides a client for the free Open-Meteo APIs.
//!
//! Open-Meteo splits its services across hosts (geocoding, air quality,
//! forecast), so the client keeps one base URL per service; tests point them
//! all at a mock server.

use crate::error::{AppError, Result};
use crate::models::{OmAirCurrent, OmAirQualityResponse, OmForecastResponse, OmGeocodingResponse, OmPlace};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com";
const FORECAST_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An asynchronous client for the Open-Meteo APIs. No API key required.
pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    air_quality_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_base_urls(GEOCODING_URL, AIR_QUALITY_URL, FORECAST_URL)
    }

    /// Creates a client with custom base URLs, for tests pointing at a mock
    /// server.
    pub fn with_base_urls(geocoding_url: &str, air_quality_url: &str, forecast_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            geocoding_url: geocoding_url.to_string(),
            air_quality_url: air_quality_url.to_string(),
            forecast_url: forecast_url.to_string(),
        }
    }

    /// Nearby named places for a coordinate, ordered with the queried point
    /// first. An empty list is a valid response for remote locations.
    pub async fn reverse_geocode(&self, lat: f64, lon: f64, count: u32) -> Result<Vec<OmPlace>> {
        info!("Reverse geocoding {}, {} via Open-Meteo", lat, lon);

        let url = format!("{}/v1/reverse", self.geocoding_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("count", count.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: OmGeocodingResponse = response.json().await?;
        debug!("Open-Meteo reverse geocoding returned {} places", body.results.len());

        Ok(body.results)
    }

    /// Current air quality sample for a coordinate, including the provider's
    /// own US-scale AQI when available.
    pub async fn current_air_quality(&self, lat: f64, lon: f64) -> Result<OmAirCurrent> {
        info!("Fetching Open-Meteo air quality for {}, {}", lat, lon);

        let url = format!("{}/v1/air-quality", self.air_quality_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current", "us_aqi,pm10,pm2_5".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: OmAirQualityResponse = response.json().await?;

        body.current.ok_or_else(|| {
            AppError::UpstreamData("Open-Meteo air quality response had no current block".to_string())
        })
    }

    /// Daily min/max temperature series plus current conditions.
    pub async fn daily_forecast(&self, lat: f64, lon: f64) -> Result<OmForecastResponse> {
        info!("Fetching Open-Meteo forecast for {}, {}", lat, lon);

        let url = format!("{}/v1/forecast", self.forecast_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min".to_string(),
                ),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,wind_speed_10m".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<OmForecastResponse>().await?)
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}
