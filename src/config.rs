//! Runtime configuration, read once from the environment at startup.

use std::env;
use tracing::info;

const DEFAULT_PORT: u16 = 5000;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server listens on (`PORT`, default 5000).
    pub port: u16,
    /// OpenWeather API key (`OPENWEATHER_API_KEY`). When absent, the
    /// OpenWeather provider is skipped and air quality data comes from the
    /// Open-Meteo fallback only.
    pub openweather_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let openweather_api_key = env::var("OPENWEATHER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        if openweather_api_key.is_none() {
            info!("OPENWEATHER_API_KEY not set; air quality will use Open-Meteo only");
        }

        Self {
            port,
            openweather_api_key,
        }
    }
}
