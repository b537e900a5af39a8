//! Shared handler state.

use std::path::Path;
use std::sync::Arc;

use cache::CacheManager;
use common::{AppConfig, Error};
use gwadair_client::GwadAirClient;
use meteofrance_client::MeteoFranceClient;
use open_meteo_client::OpenMeteoClient;
use openweather_client::OpenWeatherClient;

use crate::water_cuts::{load_water_cuts, WaterCuts};

#[derive(Debug, Clone)]
pub struct AppState {
    pub cache: CacheManager,
    pub gwadair: GwadAirClient,
    pub open_meteo: OpenMeteoClient,
    pub openweather: OpenWeatherClient,
    pub meteofrance: Arc<MeteoFranceClient>,
    pub water_cuts: Arc<WaterCuts>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::with_cache(config, CacheManager::from_config(&config.cache)?)
    }

    /// Build clients from `config` around an existing cache.
    pub fn with_cache(config: &AppConfig, cache: CacheManager) -> Result<Self, Error> {
        Ok(Self {
            cache,
            gwadair: GwadAirClient::new(config.gwadair.clone())?,
            open_meteo: OpenMeteoClient::new(config.open_meteo.clone())?,
            openweather: OpenWeatherClient::new(config.openweather.clone())?,
            meteofrance: Arc::new(MeteoFranceClient::new(config.meteofrance.clone())?),
            water_cuts: Arc::new(load_water_cuts(Path::new(&config.water_cuts_path))),
        })
    }
}
