//! Provides a client for the OpenWeather API.
//!
//! Covers the two endpoints the service proxies: current air pollution
//! (`/data/2.5/air_pollution`) and direct geocoding (`/geo/1.0/direct`).
//! Both require an API key.

use crate::error::{AppError, Result};
use crate::models::{GeocodedPlace, OwPollutionResponse, PollutantReading};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

const BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const GEOCODE_LIMIT: u32 = 5;

/// An asynchronous client for the OpenWeather API.
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    /// Creates a new `OpenWeatherClient` with the provided API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Creates a new `OpenWeatherClient` with a custom base URL, for tests
    /// pointing at a mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.to_string(),
        }
    }

    /// Fetches the current pollutant concentrations for a coordinate.
    ///
    /// The returned reading has absent pollutant fields already replaced with
    /// the conservative defaults.
    pub async fn current_pollution(&self, lat: f64, lon: f64) -> Result<PollutantReading> {
        info!("Fetching OpenWeather air pollution for {}, {}", lat, lon);

        let url = format!("{}/data/2.5/air_pollution", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("OpenWeather air pollution request failed: {}", e);
                AppError::from(e)
            })?;

        // Non-2xx means a bad key or malformed query; surface it so the
        // caller can fall back to the next provider.
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                let status = e.status();
                error!(
                    "OpenWeather air pollution returned status {}: {}",
                    status.unwrap_or_default(),
                    e
                );
                if status == Some(reqwest::StatusCode::UNAUTHORIZED) {
                    error!("Received 401. Check OPENWEATHER_API_KEY validity.");
                }
                return Err(AppError::from(e));
            },
        };

        let body: OwPollutionResponse = response.json().await?;
        let entry = body.list.into_iter().next().ok_or_else(|| {
            AppError::UpstreamData("OpenWeather returned an empty pollution list".to_string())
        })?;

        debug!(
            "OpenWeather reported coarse index {} with pm2_5={:?}, pm10={:?}",
            entry.main.aqi, entry.components.pm2_5, entry.components.pm10
        );

        Ok(PollutantReading::from(entry.components))
    }

    /// Resolves a free-text location name to coordinate candidates.
    pub async fn geocode(&self, location: &str) -> Result<Vec<GeocodedPlace>> {
        info!("Geocoding '{}' via OpenWeather", location);

        let url = format!("{}/geo/1.0/direct", self.base_url);
        let limit = GEOCODE_LIMIT.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("limit", limit.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let places: Vec<GeocodedPlace> = response.json().await?;

        if places.is_empty() {
            return Err(AppError::UpstreamData(format!(
                "no geocoding match for '{}'",
                location
            )));
        }

        debug!("OpenWeather geocoding returned {} matches", places.len());
        Ok(places)
    }
}
