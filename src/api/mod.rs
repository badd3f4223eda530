//! Provides clients for the external weather and geocoding providers.
//!
//! Includes:
//! - `openweather`: OpenWeather air pollution and direct geocoding (keyed).
//! - `openmeteo`: Open-Meteo geocoding, air quality, and forecast (keyless).

mod openmeteo;
mod openweather;

pub use openmeteo::*;
pub use openweather::*;
