//! Data structures for the weather and air quality endpoints.
//!
//! Includes structs for:
//! - Deserializing OpenWeather and Open-Meteo API responses.
//! - The normalized `PollutantReading` shared by the provider chain.
//! - Structuring API response payloads (`AirQualityData`, `ForecastData`, `NearbyPlace`).

use crate::aqi::{AqiReport, DEFAULT_PM10, DEFAULT_PM25};
use serde::{Deserialize, Serialize};

// --- OpenWeather response structs ---

/// Response envelope for OpenWeather `/data/2.5/air_pollution`.
#[derive(Debug, Deserialize, Clone)]
pub struct OwPollutionResponse {
    pub list: Vec<OwPollutionEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OwPollutionEntry {
    pub main: OwPollutionIndex,
    pub components: OwComponents,
}

/// OpenWeather's own 1-5 coarse index. Not on the US 0-500 scale; logged but
/// never served, the US AQI is always derived from PM2.5 instead.
#[derive(Debug, Deserialize, Clone)]
pub struct OwPollutionIndex {
    pub aqi: u8,
}

/// Pollutant concentrations in µg/m³. Individual fields are routinely absent
/// from the payload.
#[derive(Debug, Deserialize, Clone)]
pub struct OwComponents {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
}

/// A match from OpenWeather's direct geocoding endpoint (`/geo/1.0/direct`).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocodedPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

// --- Open-Meteo response structs ---

/// Response envelope for Open-Meteo reverse geocoding. The `results` field is
/// omitted entirely when there is no match.
#[derive(Debug, Deserialize, Clone)]
pub struct OmGeocodingResponse {
    #[serde(default)]
    pub results: Vec<OmPlace>,
}

/// A named place from the Open-Meteo geocoder.
#[derive(Debug, Deserialize, Clone)]
pub struct OmPlace {
    pub name: String,
    /// First-level administrative region (state/province), when known.
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response envelope for the Open-Meteo air quality API.
#[derive(Debug, Deserialize, Clone)]
pub struct OmAirQualityResponse {
    pub current: Option<OmAirCurrent>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OmAirCurrent {
    /// AQI already on the US 0-500 scale, when the provider supplies one.
    pub us_aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
}

/// Response envelope for the Open-Meteo forecast API.
#[derive(Debug, Deserialize, Clone)]
pub struct OmForecastResponse {
    pub daily: OmDaily,
    pub current: OmCurrentWeather,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OmDaily {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OmCurrentWeather {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub wind_speed_10m: f64,
}

// --- Normalized domain structs ---

/// A current-pollution sample normalized across providers, with absent fields
/// replaced by the conservative defaults from the `aqi` module.
#[derive(Debug, Clone, Serialize)]
pub struct PollutantReading {
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    /// AQI on the US scale when the provider reports one directly.
    pub provider_aqi: Option<u32>,
}

impl From<OwComponents> for PollutantReading {
    fn from(c: OwComponents) -> Self {
        Self {
            pm2_5: c.pm2_5.unwrap_or(DEFAULT_PM25),
            pm10: c.pm10.unwrap_or(DEFAULT_PM10),
            co: c.co,
            no2: c.no2,
            so2: c.so2,
            // OpenWeather's 1-5 index is not usable as a US AQI.
            provider_aqi: None,
        }
    }
}

impl From<OmAirCurrent> for PollutantReading {
    fn from(c: OmAirCurrent) -> Self {
        Self {
            pm2_5: c.pm2_5.unwrap_or(DEFAULT_PM25),
            pm10: c.pm10.unwrap_or(DEFAULT_PM10),
            co: None,
            no2: None,
            so2: None,
            provider_aqi: c.us_aqi.map(|v| v.round() as u32),
        }
    }
}

// --- API payload structs ---

/// Body of `GET /api/weather/air`.
#[derive(Debug, Clone, Serialize)]
pub struct AirQualityData {
    #[serde(flatten)]
    pub report: AqiReport,
    pub pm25: u32,
    pub pm10: u32,
}

/// One enriched nearby city in the `GET /api/weather/nearby` payload.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyPlace {
    pub name: String,
    pub admin_region: String,
    pub distance_km: u32,
    pub aqi: AqiReport,
    /// Up to three days; empty when the forecast provider was unavailable.
    pub forecast: Vec<DailyTemp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTemp {
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
}

/// Body of `GET /api/weather/forecast`.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastData {
    pub days: Vec<String>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    pub today: TodayConditions,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayConditions {
    pub temp: i32,
    pub humidity: i32,
    pub wind: i32,
    /// Visibility in km. No provider in the chain reports it; see
    /// `services::weather::placeholder_visibility_km`.
    pub visibility: u32,
}
