//! Date helpers for Guadeloupe local time and French display strings.
//!
//! Guadeloupe is UTC-4 all year (no daylight saving), so a fixed offset is
//! exact.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// IANA name passed to upstream APIs.
pub const GUADELOUPE_TZ: &str = "America/Guadeloupe";

const UTC_OFFSET_SECS: i32 = -4 * 3600;

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

const WEEKDAYS_FR: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

pub fn guadeloupe_offset() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in Guadeloupe.
pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&guadeloupe_offset())
}

/// Current epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse an Open-Meteo local timestamp (`2026-10-16T06:12`, seconds optional).
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Epoch seconds of a Guadeloupe local timestamp.
pub fn local_to_epoch_secs(local: NaiveDateTime) -> i64 {
    local.and_utc().timestamp() - i64::from(UTC_OFFSET_SECS)
}

/// `HH:MM`, or `--:--` when the input is not a timestamp.
pub fn format_hhmm(raw: &str) -> String {
    parse_local_datetime(raw)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".into())
}

/// `06h`, or `--h` when the input is not a timestamp.
pub fn format_hour(raw: &str) -> String {
    parse_local_datetime(raw)
        .map(|dt| dt.format("%Hh").to_string())
        .unwrap_or_else(|| "--h".into())
}

/// `16 octobre` from `2026-10-16`; the input is returned untouched when it
/// does not parse.
pub fn format_date_fr(iso_date: &str) -> String {
    match NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") {
        Ok(date) => format!("{} {}", date.day(), MONTHS_FR[date.month0() as usize]),
        Err(_) => iso_date.to_string(),
    }
}

/// "Aujourd'hui", "Demain" or the French weekday, relative to `today`.
/// Unparseable dates fall back to the position in the forecast list.
pub fn day_name_fr(iso_date: &str, index: usize, today: NaiveDate) -> String {
    let Ok(date) = NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") else {
        return match index {
            0 => "Aujourd'hui".into(),
            1 => "Demain".into(),
            n => format!("J+{}", n),
        };
    };

    if date == today {
        "Aujourd'hui".into()
    } else if date == today + Duration::days(1) {
        "Demain".into()
    } else {
        WEEKDAYS_FR[date.weekday().num_days_from_monday() as usize].into()
    }
}

/// RFC 1123 GMT string (`Wed, 16 Oct 2026 00:00:00 GMT`) from epoch ms.
pub fn http_date_from_ms(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_times() {
        assert_eq!(format_hhmm("2026-10-16T06:12"), "06:12");
        assert_eq!(format_hhmm("garbage"), "--:--");
        assert_eq!(format_hour("2026-10-16T18:00"), "18h");
        assert_eq!(format_hour(""), "--h");
    }

    #[test]
    fn test_format_date_fr() {
        assert_eq!(format_date_fr("2026-10-16"), "16 octobre");
        assert_eq!(format_date_fr("2026-02-01"), "1 février");
        assert_eq!(format_date_fr("nope"), "nope");
    }

    #[test]
    fn test_day_names() {
        let today = date(2026, 10, 16); // a Friday
        assert_eq!(day_name_fr("2026-10-16", 0, today), "Aujourd'hui");
        assert_eq!(day_name_fr("2026-10-17", 1, today), "Demain");
        assert_eq!(day_name_fr("2026-10-18", 2, today), "dimanche");
        assert_eq!(day_name_fr("bad", 2, today), "J+2");
        assert_eq!(day_name_fr("bad", 1, today), "Demain");
    }

    #[test]
    fn test_local_epoch_is_utc_minus_four() {
        let local = parse_local_datetime("2026-10-16T00:00").unwrap();
        let utc = date(2026, 10, 16).and_hms_opt(4, 0, 0).unwrap().and_utc();
        assert_eq!(local_to_epoch_secs(local), utc.timestamp());
    }

    #[test]
    fn test_http_date() {
        // 2026-10-16T00:00:00Z
        let ms = date(2026, 10, 16).and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis();
        assert_eq!(http_date_from_ms(ms).unwrap(), "Fri, 16 Oct 2026 00:00:00 GMT");
    }
}
