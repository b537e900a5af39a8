//! Vigilance archive and bulletin parsing.

use std::io::{Cursor, Read};

use common::{phenomenon_name, Error, VigilanceData, VigilanceRisk};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Bulletin {
    #[serde(default)]
    timelaps: Timelaps,
}

#[derive(Debug, Default, Deserialize)]
struct Timelaps {
    #[serde(default)]
    domain_ids: Vec<Domain>,
}

#[derive(Debug, Deserialize)]
struct Domain {
    domain_id: String,
    max_color_id: Option<i32>,
    #[serde(default)]
    phenomenon_items: Vec<Phenomenon>,
}

#[derive(Debug, Deserialize)]
struct Phenomenon {
    phenomenon_id: i64,
    phenomenon_max_color_id: i32,
}

/// Read `file_name` out of the vigilance ZIP archive as text.
pub fn extract_bulletin(archive: &[u8], file_name: &str) -> Result<String, Error> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| Error::MeteoFrance(format!("invalid vigilance archive: {}", e)))?;

    let mut file = zip.by_name(file_name).map_err(|_| {
        Error::MeteoFrance(format!("{} not found in vigilance archive", file_name))
    })?;

    let mut raw = String::new();
    file.read_to_string(&mut raw)?;
    Ok(raw)
}

/// Build the bulletin for `domain_id` from the archive's JSON. A domain that
/// is absent reads as green with no risks.
pub fn parse_vigilance(raw: &str, domain_id: &str, now_ms: i64) -> Result<VigilanceData, Error> {
    let bulletin: Bulletin = serde_json::from_str(raw)?;

    let Some(domain) = bulletin
        .timelaps
        .domain_ids
        .into_iter()
        .find(|d| d.domain_id == domain_id)
    else {
        return Ok(VigilanceData::guadeloupe(1, Vec::new(), now_ms));
    };

    let risks = domain
        .phenomenon_items
        .iter()
        .filter(|p| p.phenomenon_max_color_id >= 1)
        .map(|p| VigilanceRisk {
            kind: phenomenon_name(p.phenomenon_id),
            level: p.phenomenon_max_color_id,
        })
        .collect();

    Ok(VigilanceData::guadeloupe(
        domain.max_color_id.unwrap_or(1),
        risks,
        now_ms,
    ))
}
