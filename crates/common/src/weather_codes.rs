//! WMO weather interpretation codes (as used by Open-Meteo), in French.

/// Qualitative intensity of a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Calm,
    Light,
    Moderate,
    Heavy,
    Extreme,
}

/// Display metadata for one WMO code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherCodeInfo {
    pub code: i32,
    pub label: &'static str,
    pub description: &'static str,
    /// Lucide icon name.
    pub icon: &'static str,
    pub icon_night: &'static str,
    pub color: &'static str,
    pub intensity: Intensity,
}

const fn info(
    code: i32,
    label: &'static str,
    description: &'static str,
    icon: &'static str,
    icon_night: &'static str,
    color: &'static str,
    intensity: Intensity,
) -> WeatherCodeInfo {
    WeatherCodeInfo {
        code,
        label,
        description,
        icon,
        icon_night,
        color,
        intensity,
    }
}

use Intensity::*;

const WMO_CODES: &[WeatherCodeInfo] = &[
    info(0, "Ciel dégagé", "Ciel parfaitement clair, sans nuages", "Sun", "Moon", "#FFD700", Calm),
    info(1, "Principalement dégagé", "Ciel majoritairement clair avec quelques nuages épars", "Sun", "Moon", "#FFD700", Calm),
    info(2, "Partiellement nuageux", "Alternance de soleil et de nuages", "CloudSun", "CloudMoon", "#87CEEB", Calm),
    info(3, "Couvert", "Ciel complètement couvert de nuages", "Cloud", "Cloud", "#A9A9A9", Calm),
    info(45, "Brouillard", "Brouillard réduisant la visibilité", "CloudFog", "CloudFog", "#B0C4DE", Light),
    info(48, "Brouillard givrant", "Brouillard avec dépôt de givre", "CloudFog", "CloudFog", "#E0FFFF", Moderate),
    info(51, "Bruine légère", "Fines gouttelettes de pluie légère", "CloudDrizzle", "CloudDrizzle", "#87CEFA", Light),
    info(53, "Bruine modérée", "Bruine continue modérée", "CloudDrizzle", "CloudDrizzle", "#6495ED", Moderate),
    info(55, "Bruine dense", "Bruine intense et persistante", "CloudDrizzle", "CloudDrizzle", "#4169E1", Heavy),
    info(56, "Bruine verglaçante légère", "Bruine légère qui gèle au contact du sol", "CloudDrizzle", "CloudDrizzle", "#ADD8E6", Light),
    info(57, "Bruine verglaçante dense", "Bruine dense qui gèle au contact du sol", "CloudDrizzle", "CloudDrizzle", "#87CEEB", Moderate),
    info(61, "Pluie légère", "Pluie fine et intermittente", "CloudRain", "CloudRain", "#6495ED", Light),
    info(63, "Pluie modérée", "Pluie continue d'intensité moyenne", "CloudRain", "CloudRain", "#4169E1", Moderate),
    info(65, "Pluie forte", "Pluie intense et abondante", "CloudRain", "CloudRain", "#0000CD", Heavy),
    info(66, "Pluie verglaçante légère", "Pluie légère qui gèle au contact du sol", "CloudRain", "CloudRain", "#B0E0E6", Light),
    info(67, "Pluie verglaçante forte", "Pluie forte qui gèle au contact du sol", "CloudRain", "CloudRain", "#87CEEB", Heavy),
    info(71, "Neige légère", "Chutes de neige légères", "CloudSnow", "CloudSnow", "#F0F8FF", Light),
    info(73, "Neige modérée", "Chutes de neige modérées", "CloudSnow", "CloudSnow", "#E6E6FA", Moderate),
    info(75, "Neige forte", "Fortes chutes de neige", "CloudSnow", "CloudSnow", "#D8BFD8", Heavy),
    info(77, "Grains de neige", "Petits grains de glace blancs et opaques", "CloudSnow", "CloudSnow", "#FFFAFA", Light),
    info(80, "Averses légères", "Averses de pluie légères et brèves", "CloudRain", "CloudRain", "#87CEFA", Light),
    info(81, "Averses modérées", "Averses de pluie d'intensité modérée", "CloudRain", "CloudRain", "#4682B4", Moderate),
    info(82, "Averses violentes", "Averses de pluie intenses et soudaines", "CloudRain", "CloudRain", "#0000FF", Heavy),
    info(85, "Averses de neige légères", "Brèves averses de neige légères", "CloudSnow", "CloudSnow", "#F0FFFF", Light),
    info(86, "Averses de neige fortes", "Averses de neige intenses", "CloudSnow", "CloudSnow", "#E0FFFF", Heavy),
    info(95, "Orage", "Orage avec éclairs et tonnerre", "CloudLightning", "CloudLightning", "#FFD700", Moderate),
    info(96, "Orage avec grêle légère", "Orage accompagné de petits grêlons", "CloudLightning", "CloudLightning", "#FFA500", Heavy),
    info(99, "Orage avec grêle forte", "Orage violent avec gros grêlons", "CloudLightning", "CloudLightning", "#FF4500", Extreme),
];

const UNAVAILABLE: WeatherCodeInfo = info(
    -1,
    "Données indisponibles",
    "Les conditions météorologiques ne sont pas disponibles",
    "HelpCircle",
    "HelpCircle",
    "#CCCCCC",
    Calm,
);

/// Metadata for a code. Missing codes get the "unavailable" entry, unknown
/// ones a generic cloudy entry labelled `Code {n}`.
pub fn weather_info(code: Option<i32>) -> WeatherCodeInfo {
    let Some(code) = code else {
        return UNAVAILABLE;
    };
    WMO_CODES
        .iter()
        .find(|i| i.code == code)
        .copied()
        .unwrap_or(WeatherCodeInfo {
            code,
            label: "",
            description: "Conditions météorologiques non reconnues",
            icon: "Cloud",
            icon_night: "Cloud",
            color: "#A9A9A9",
            intensity: Calm,
        })
}

/// Night in Guadeloupe is roughly 18h–6h local time.
pub fn is_night_hour(hour: u32) -> bool {
    !(6..18).contains(&hour)
}

/// Icon for a code at a given local hour.
pub fn weather_icon(code: Option<i32>, hour: u32) -> &'static str {
    let info = weather_info(code);
    if is_night_hour(hour) {
        info.icon_night
    } else {
        info.icon
    }
}

/// Compact label for badges.
pub fn short_label(code: Option<i32>) -> String {
    let short = match code {
        Some(0) => "Soleil",
        Some(1) => "Dégagé",
        Some(2) => "Nuageux",
        Some(3) => "Couvert",
        Some(45 | 48) => "Brouillard",
        Some(51 | 53 | 55) => "Bruine",
        Some(61 | 63 | 65) => "Pluie",
        Some(80..=82) => "Averses",
        Some(95 | 96 | 99) => "Orage",
        _ => "",
    };
    if !short.is_empty() {
        return short.to_string();
    }
    let info = weather_info(code);
    if info.label.is_empty() {
        format!("Code {}", info.code)
    } else {
        info.label.to_string()
    }
}

/// Long description. At night (either the API says so or the local hour
/// does) references to the sun become the moon.
pub fn weather_description(code: Option<i32>, is_day: Option<bool>, hour: Option<u32>) -> String {
    let description = weather_info(code).description;

    let mut night = matches!(is_day, Some(false));
    if hour.is_some_and(is_night_hour) {
        night = true;
    }

    if night {
        description
            .replace("du soleil", "de la lune")
            .replace("Du soleil", "De la lune")
            .replace("le soleil", "la lune")
            .replace("Le soleil", "La lune")
            .replace("soleil", "lune")
            .replace("Soleil", "Lune")
    } else {
        description.to_string()
    }
}

/// Clear to partly cloudy skies.
pub fn is_favorable(code: Option<i32>) -> bool {
    code.map_or(true, |c| c <= 3)
}

/// Heavy rain and worse.
pub fn is_alert(code: Option<i32>) -> bool {
    code.is_some_and(|c| c >= 65)
}
