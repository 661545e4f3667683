//! Text-to-value transforms for rendered result-row text.
//!
//! Every function here is total: malformed or empty input maps to the
//! documented default instead of an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{SeatAvailability, StopDescriptor, PRICE_UNAVAILABLE};

static FLIGHT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2}|[A-Z][0-9]|[0-9][A-Z])\s?([0-9]{1,4})\b").expect("flight number regex")
});
static AIRCRAFT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(A3[0-9]{2}|B7[0-9]{2}|E1[0-9]{2})$").expect("aircraft type regex")
});
static STOP_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([0-9]+)\s*stops?\b").expect("stop count regex"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number regex"));

/// Flight-number tokens in page order, e.g. `"AA123 AA456"` -> `["AA123", "AA456"]`.
/// A space between carrier code and number is dropped (`"UA 12"` -> `"UA12"`).
///
/// Unspaced aircraft designators (`A321`, `B737`, `E175`) look like a
/// letter-digit carrier code plus number and are skipped.
pub fn parse_flight_numbers(raw: &str) -> Vec<String> {
    let upper = raw.to_ascii_uppercase();
    FLIGHT_NUMBER
        .captures_iter(&upper)
        .filter_map(|caps| {
            let token = format!("{}{}", &caps[1], &caps[2]);
            let spaced = caps[0].len() > token.len();
            if !spaced && AIRCRAFT_TYPE.is_match(&token) {
                None
            } else {
                Some(token)
            }
        })
        .collect()
}

/// `"1 stop"` -> `Stops(1)`. Anything without a positive stop count is nonstop.
pub fn parse_stops(raw: &str) -> StopDescriptor {
    STOP_COUNT
        .captures(raw)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|count| *count > 0)
        .map(StopDescriptor::Stops)
        .unwrap_or(StopDescriptor::Nonstop)
}

pub fn parse_seats_left(raw: &str) -> Option<SeatAvailability> {
    let text = clean_text(raw).to_ascii_lowercase();
    if text.is_empty() {
        return None;
    }
    if let Some(found) = FIRST_NUMBER.find(&text) {
        return found
            .as_str()
            .parse::<u32>()
            .ok()
            .filter(|count| *count > 0)
            .map(SeatAvailability::Remaining);
    }
    if text.contains("last seat") {
        return Some(SeatAvailability::Remaining(1));
    }
    if text.contains("few") || text.contains("limited") {
        return Some(SeatAvailability::Limited);
    }
    None
}

/// `Some(true)` when the note announces a change of aircraft, `Some(false)`
/// when it explicitly rules one out, `None` otherwise.
pub fn parse_plane_change(raw: &str) -> Option<bool> {
    const NEGATIVE: &[&str] = &["no plane change", "no change of plane", "same plane"];
    const POSITIVE: &[&str] = &[
        "plane change",
        "change of plane",
        "change planes",
        "aircraft change",
        "change of aircraft",
    ];

    let text = clean_text(raw).to_ascii_lowercase();
    if text.is_empty() {
        return None;
    }
    if NEGATIVE.iter().any(|needle| text.contains(needle)) {
        return Some(false);
    }
    if POSITIVE.iter().any(|needle| text.contains(needle)) {
        return Some(true);
    }
    None
}

/// Price text as displayed; text carrying no amount becomes `"Unavailable"`.
pub fn normalize_price(raw: &str) -> String {
    let text = clean_text(raw);
    if text.chars().any(|c| c.is_ascii_digit()) {
        text
    } else {
        PRICE_UNAVAILABLE.to_string()
    }
}

/// Joins a clock reading with its meridiem: (`"7:05"`, `"am"`) -> `"7:05 AM"`.
pub fn join_clock(time: &str, meridiem: &str) -> String {
    let time = clean_text(time);
    if time.is_empty() {
        return String::new();
    }
    let meridiem = clean_text(meridiem).to_ascii_uppercase();
    if meridiem.is_empty() || time.to_ascii_uppercase().ends_with(&meridiem) {
        time
    } else {
        format!("{time} {meridiem}")
    }
}

/// Collapses runs of whitespace and trims.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_numbers_keep_page_order() {
        assert_eq!(parse_flight_numbers("UA 1234 / B6 88"), vec!["UA1234", "B688"]);
    }

    #[test]
    fn aircraft_types_are_not_flight_numbers() {
        assert_eq!(parse_flight_numbers("UA 1234 Airbus A321"), vec!["UA1234"]);
        assert_eq!(parse_flight_numbers("B6 788 operated on B737-800"), vec!["B6788"]);
        assert!(parse_flight_numbers("E175").is_empty());
    }

    #[test]
    fn spaced_mixed_carrier_code_is_kept() {
        assert_eq!(parse_flight_numbers("A3 321"), vec!["A3321"]);
    }

    #[test]
    fn flight_numbers_ignore_words() {
        assert!(parse_flight_numbers("Flight operated by partner").is_empty());
    }

    #[test]
    fn clock_does_not_repeat_meridiem() {
        assert_eq!(join_clock("7:05 PM", "pm"), "7:05 PM");
        assert_eq!(join_clock("  ", "AM"), "");
    }
}
