//! Gwad'Alerte: weather and alert dashboard backend for Guadeloupe.
//!
//! Single-binary Tokio application that:
//! 1. Serves air quality from Gwad'Air
//! 2. Serves current weather and forecasts from Open-Meteo and OpenWeatherMap
//! 3. Serves the Météo-France vigilance level
//! 4. Serves the static water-cut schedule
//!
//! Every upstream response goes through the shared cache, which keeps stale
//! copies to answer when a provider is down.

mod api;
mod config;
mod errors;
mod state;
mod water_cuts;

use anyhow::Context;
use clap::Parser;
use common::AppConfig;
use meteofrance_client::describe;
use tracing::{error, info, warn};

use crate::state::AppState;

/// Gwad'Alerte API server
#[derive(Parser)]
#[command(name = "gwadalerte", about = "Guadeloupe weather and alert dashboard API")]
struct Cli {
    /// Load and validate configuration, print a summary, then exit.
    #[arg(long)]
    check_config: bool,

    /// Fetch every upstream once through the cache, log what came back, then exit.
    #[arg(long)]
    dry_run: bool,
}

fn log_summary(config: &AppConfig, state: &AppState) {
    info!("Listening address: {}:{}", config.server.host, config.server.port);
    info!("Cache backend: {}", state.cache.backend_name());
    info!(
        "OpenWeatherMap: {}",
        if state.openweather.has_api_key() { "configured" } else { "no API key" }
    );
    info!(
        "Météo-France vigilance: {}",
        if state.meteofrance.has_credentials() { "configured" } else { "default level only" }
    );
    match state.water_cuts.as_ref() {
        Ok(map) => info!("Water cuts: {} communes", map.len()),
        Err(e) => warn!("Water cuts unavailable: {}", e),
    }
}

/// Fetch every upstream once through the cache, using the same loaders and
/// keys as the routes.
async fn run_dry_run(state: &AppState) {
    info!("Running single fetch of every upstream...");

    match api::air_quality::load(state).await {
        Ok(map) => info!("Air quality: {} communes", map.len()),
        Err(e) => error!("Air quality failed: {}", e),
    }

    match api::meteo::load_current(state).await {
        Ok(map) => {
            let available = map.values().filter(|w| w.temperature.is_some()).count();
            info!("Open-Meteo current: {}/{} communes", available, map.len());
        }
        Err(e) => error!("Open-Meteo current failed: {}", e),
    }

    match api::meteo::load_all_forecasts(state).await {
        Ok(map) => {
            let with_days = map.values().filter(|f| !f.daily.is_empty()).count();
            info!("Open-Meteo forecasts: {}/{} communes", with_days, map.len());
        }
        Err(e) => error!("Open-Meteo forecasts failed: {}", e),
    }

    if state.openweather.has_api_key() {
        match api::weather::load_current(state).await {
            Ok(map) => {
                let available = map.values().filter(|w| w.temperature.is_some()).count();
                info!("OpenWeatherMap current: {}/{} communes", available, map.len());
            }
            Err(e) => error!("OpenWeatherMap current failed: {}", e),
        }
    } else {
        warn!("OpenWeatherMap skipped: no API key");
    }

    if state.meteofrance.has_credentials() {
        match api::vigilance::load(state).await {
            Ok(v) => info!("Vigilance: {}", describe(&v)),
            Err(e) => error!("Vigilance failed: {}", e),
        }
    } else {
        warn!("Vigilance skipped: no Météo-France credentials");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gwadalerte=info,cache=info,gwadair_client=info,open_meteo_client=info,\
                 openweather_client=info,meteofrance_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Gwad'Alerte starting up...");

    let config = config::load_config().context("loading configuration")?;
    let state = AppState::from_config(&config).context("building clients")?;
    log_summary(&config, &state);

    if cli.check_config {
        info!("Configuration OK");
        return Ok(());
    }

    if cli.dry_run {
        run_dry_run(&state).await;
        return Ok(());
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Serving on http://{}", addr);

    axum::serve(listener, api::router(state))
        .await
        .context("server error")?;
    Ok(())
}
