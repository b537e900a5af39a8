//! Static water-cut schedule ("tours d'eau"), loaded once at startup.

use std::path::Path;

use common::{Error, WaterCutsDataMap};
use tracing::{info, warn};

/// Outcome of loading the schedule. A failed load is kept so the route can
/// report it instead of the process refusing to start.
pub type WaterCuts = Result<WaterCutsDataMap, String>;

pub fn parse_water_cuts(raw: &str) -> Result<WaterCutsDataMap, Error> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_water_cuts(path: &Path) -> WaterCuts {
    let loaded = std::fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|raw| parse_water_cuts(&raw));

    match loaded {
        Ok(map) => {
            info!("[Water] Loaded {} communes from {}", map.len(), path.display());
            Ok(map)
        }
        Err(e) => {
            warn!("[Water] Failed to load {}: {}", path.display(), e);
            Err(e.to_string())
        }
    }
}
