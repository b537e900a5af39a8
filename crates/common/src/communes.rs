//! Communes covered by the dashboard, keyed by INSEE code.

/// A commune and the point used to query weather providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Commune {
    pub code: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn commune(code: &'static str, name: &'static str, lat: f64, lon: f64) -> Commune {
    Commune {
        code,
        name,
        lat,
        lon,
    }
}

/// Guadeloupe communes plus Saint-Martin, sorted by code.
pub const COMMUNES: [Commune; 33] = [
    commune("97101", "Les Abymes", 16.269098, -61.491712),
    commune("97102", "Anse-Bertrand", 16.471009, -61.506),
    commune("97103", "Baie-Mahault", 16.250984, -61.593918),
    commune("97104", "Baillif", 16.04277, -61.7313),
    commune("97105", "Basse-Terre", 15.998443, -61.72447),
    commune("97106", "Bouillante", 16.101058, -61.764318),
    commune("97107", "Capesterre-Belle-Eau", 16.060373, -61.574103),
    commune("97108", "Capesterre-de-Marie-Galante", 15.893608, -61.222379),
    commune("97109", "Gourbeyre", 15.991118, -61.684582),
    commune("97110", "La Désirade", 16.30279, -61.077034),
    commune("97111", "Deshaies", 16.30812, -61.793379),
    commune("97112", "Grand-Bourg", 15.902875, -61.307448),
    commune("97113", "Le Gosier", 16.225134, -61.467175),
    commune("97114", "Goyave", 16.130428, -61.585075),
    commune("97115", "Lamentin", 16.246752, -61.650672),
    commune("97116", "Morne-à-l'Eau", 16.321248, -61.457015),
    commune("97117", "Le Moule", 16.32455, -61.352319),
    commune("97118", "Petit-Bourg", 16.193519, -61.600424),
    commune("97119", "Petit-Canal", 16.379163, -61.442341),
    commune("97120", "Pointe-à-Pitre", 16.241587, -61.537708),
    commune("97121", "Pointe-Noire", 16.210064, -61.780597),
    commune("97122", "Port-Louis", 16.418389, -61.52852),
    commune("97124", "Saint-Claude", 16.0167, -61.709911),
    commune("97125", "Saint-François", 16.260504, -61.289773),
    commune("97126", "Saint-Louis", 15.956251, -61.315493),
    commune("97128", "Sainte-Anne", 16.257101, -61.352828),
    commune("97129", "Sainte-Rose", 16.318948, -61.695059),
    commune("97130", "Terre-de-Bas", 15.848911, -61.643872),
    commune("97131", "Terre-de-Haut", 15.86704, -61.58231),
    commune("97132", "Trois-Rivières", 15.979825, -61.641339),
    commune("97133", "Vieux-Fort", 15.952554, -61.702531),
    commune("97134", "Vieux-Habitants", 16.045746, -61.750473),
    commune("97801", "Saint-Martin", 18.067043, -63.084698),
];

/// Look up a commune by INSEE code.
pub fn find_commune(code: &str) -> Option<&'static Commune> {
    COMMUNES.iter().find(|c| c.code == code)
}

/// Commune codes are exactly five ASCII digits.
pub fn is_valid_code_zone(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_commune() {
        let c = find_commune("97105").expect("Basse-Terre exists");
        assert_eq!(c.name, "Basse-Terre");
        assert!(find_commune("97123").is_none());
    }

    #[test]
    fn test_code_zone_format() {
        assert!(is_valid_code_zone("97101"));
        assert!(!is_valid_code_zone("9710"));
        assert!(!is_valid_code_zone("97a01"));
        assert!(!is_valid_code_zone("971010"));
    }

    #[test]
    fn test_codes_unique_and_sorted() {
        for pair in COMMUNES.windows(2) {
            assert!(pair[0].code < pair[1].code, "{} !< {}", pair[0].code, pair[1].code);
        }
    }
}
