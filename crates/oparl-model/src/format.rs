//! Display helpers shared by rendered pages

use chrono::{DateTime, Datelike, NaiveDate};

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Point OParl API links at the public RIS mirror
///
/// URLs that already contain `/ris/` are returned unchanged.
#[must_use]
pub fn correct_url(url: &str) -> String {
    if url.contains("/ris/") {
        return url.to_string();
    }
    url.replacen("/oparl/", "/ris/oparl/", 1)
}

/// `dd.MM.yyyy`, or an empty string for missing/unparseable input
#[must_use]
pub fn format_date_short(date: &str) -> String {
    parse_date(date)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}

/// `d. <Monat> yyyy`, or an empty string for missing/unparseable input
#[must_use]
pub fn format_date_long(date: &str) -> String {
    parse_date(date)
        .map(|d| {
            let month = GERMAN_MONTHS[d.month0() as usize];
            format!("{}. {} {}", d.day(), month, d.year())
        })
        .unwrap_or_default()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_url_rewrites_api_paths() {
        assert_eq!(
            correct_url("https://example.org/oparl/paper/1"),
            "https://example.org/ris/oparl/paper/1"
        );
        assert_eq!(
            correct_url("https://example.org/ris/oparl/paper/1"),
            "https://example.org/ris/oparl/paper/1"
        );
    }

    #[test]
    fn short_dates() {
        assert_eq!(format_date_short("2024-03-07"), "07.03.2024");
        assert_eq!(format_date_short("2024-03-07T18:30:00+01:00"), "07.03.2024");
        assert_eq!(format_date_short(""), "");
        assert_eq!(format_date_short("bald"), "");
    }

    #[test]
    fn long_dates() {
        assert_eq!(format_date_long("2024-03-07"), "7. März 2024");
        assert_eq!(format_date_long("2023-12-24T10:00:00Z"), "24. Dezember 2023");
        assert_eq!(format_date_long(""), "");
    }
}
