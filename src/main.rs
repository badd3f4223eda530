mod api;
mod aqi;
mod config;
mod error;
mod geo;
mod models;
mod server;
mod services;

use crate::config::Config;
use crate::server::{start_server, ServerState};
use error::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting environmental data service...");

    let config = Config::from_env();
    let state = Arc::new(ServerState::new(&config));

    start_server(state, config.port).await?;

    Ok(())
}
