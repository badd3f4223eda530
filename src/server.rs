//! HTTP server exposing the weather, air quality, and geocoding endpoints.

use crate::api::{OpenMeteoClient, OpenWeatherClient};
use crate::config::Config;
use crate::geo::Coordinate;
use crate::models::GeocodedPlace;
use crate::services::{nearby, weather};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared state handed to every handler.
pub struct ServerState {
    /// Absent when no API key is configured; handlers then rely on the
    /// Open-Meteo fallback.
    pub openweather: Option<OpenWeatherClient>,
    pub openmeteo: OpenMeteoClient,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(config: &Config) -> Self {
        Self {
            openweather: config
                .openweather_api_key
                .clone()
                .map(OpenWeatherClient::new),
            openmeteo: OpenMeteoClient::new(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Success envelope shared by the API routes.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Serialize)]
struct GeocodeResponse {
    success: bool,
    count: usize,
    data: Vec<GeocodedPlace>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

/// Coordinate query parameters, kept as strings so a malformed value gets the
/// same 400 body as a missing one.
#[derive(Deserialize)]
struct CoordsQuery {
    lat: Option<String>,
    lon: Option<String>,
}

impl CoordsQuery {
    fn parse(&self) -> Result<Coordinate, Response> {
        let lat = parse_finite(self.lat.as_deref());
        let lon = parse_finite(self.lon.as_deref());
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(bad_request("lat & lon required")),
        }
    }
}

fn parse_finite(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn upstream_failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Create the HTTP router.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/weather/air", get(air))
        .route("/api/weather/forecast", get(forecast))
        .route("/api/weather/nearby", get(nearby_places))
        .route("/api/geocode", get(geocode))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
    })
}

async fn air(State(state): State<SharedState>, Query(params): Query<CoordsQuery>) -> Response {
    let coord = match params.parse() {
        Ok(coord) => coord,
        Err(response) => return response,
    };

    match weather::air_quality(
        state.openweather.as_ref(),
        &state.openmeteo,
        coord.latitude,
        coord.longitude,
    )
    .await
    {
        Ok(data) => ApiResponse::ok(data).into_response(),
        Err(e) => {
            error!(error = %e, "Air quality lookup failed");
            upstream_failure("air fetch failed")
        },
    }
}

async fn forecast(State(state): State<SharedState>, Query(params): Query<CoordsQuery>) -> Response {
    let coord = match params.parse() {
        Ok(coord) => coord,
        Err(response) => return response,
    };

    match weather::forecast(&state.openmeteo, coord.latitude, coord.longitude).await {
        Ok(data) => ApiResponse::ok(data).into_response(),
        Err(e) => {
            error!(error = %e, "Forecast lookup failed");
            upstream_failure("weather fetch failed")
        },
    }
}

async fn nearby_places(
    State(state): State<SharedState>,
    Query(params): Query<CoordsQuery>,
) -> Response {
    let coord = match params.parse() {
        Ok(coord) => coord,
        Err(response) => return response,
    };

    // Degradation is handled inside the aggregator; this endpoint only
    // fails on invalid input.
    let places = nearby::find_nearby(state.openweather.as_ref(), &state.openmeteo, coord).await;
    ApiResponse::ok(places).into_response()
}

#[derive(Deserialize)]
struct GeocodeQuery {
    location: Option<String>,
}

async fn geocode(State(state): State<SharedState>, Query(params): Query<GeocodeQuery>) -> Response {
    let Some(location) = params.location.as_deref().filter(|l| !l.is_empty()) else {
        return bad_request("Location parameter is required");
    };

    let Some(client) = state.openweather.as_ref() else {
        error!("Geocoding requested but no OpenWeather API key is configured");
        return geocode_failure();
    };

    match client.geocode(location).await {
        Ok(places) => Json(GeocodeResponse {
            success: true,
            count: places.len(),
            data: places,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Geocoding failed");
            geocode_failure()
        },
    }
}

fn geocode_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "success": false,
            "error": "Failed to fetch geocode details"
        })),
    )
        .into_response()
}
