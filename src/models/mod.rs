//! Defines the data structures and models used throughout the application.
//!
//! This includes structures representing data fetched from the upstream
//! weather providers and the payloads served by the HTTP API.

mod weather;

pub use weather::*;
