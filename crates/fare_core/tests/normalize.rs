use fare_core::normalize::{
    join_clock, normalize_price, parse_flight_numbers, parse_plane_change, parse_seats_left,
    parse_stops,
};
use fare_core::{SeatAvailability, StopDescriptor};
use pretty_assertions::assert_eq;

#[test]
fn flight_numbers_split_on_whitespace() {
    assert_eq!(parse_flight_numbers("AA123 AA456"), vec!["AA123", "AA456"]);
    assert_eq!(parse_flight_numbers(""), Vec::<String>::new());
}

#[test]
fn flight_numbers_join_spaced_carrier_codes() {
    assert_eq!(parse_flight_numbers("ua 1234"), vec!["UA1234"]);
    assert_eq!(parse_flight_numbers("UA 512, UA 2021"), vec!["UA512", "UA2021"]);
}

#[test]
fn stops_parse_count_or_default_to_nonstop() {
    assert_eq!(parse_stops("1 stop"), StopDescriptor::Stops(1));
    assert_eq!(parse_stops("2 STOPS in DEN"), StopDescriptor::Stops(2));
    assert_eq!(parse_stops("Nonstop"), StopDescriptor::Nonstop);
    assert_eq!(parse_stops("0 stops"), StopDescriptor::Nonstop);
    assert_eq!(parse_stops(""), StopDescriptor::Nonstop);
    assert_eq!(parse_stops("see details"), StopDescriptor::Nonstop);
}

#[test]
fn seats_left_reads_first_number() {
    assert_eq!(
        parse_seats_left("3 seats left at this price"),
        Some(SeatAvailability::Remaining(3))
    );
    assert_eq!(
        parse_seats_left("Only 1 left"),
        Some(SeatAvailability::Remaining(1))
    );
    assert_eq!(
        parse_seats_left("Last seat!"),
        Some(SeatAvailability::Remaining(1))
    );
    assert_eq!(
        parse_seats_left("Few seats left"),
        Some(SeatAvailability::Limited)
    );
}

#[test]
fn seats_left_without_signal_is_none() {
    assert_eq!(parse_seats_left(""), None);
    assert_eq!(parse_seats_left("   "), None);
    assert_eq!(parse_seats_left("Economy"), None);
    assert_eq!(parse_seats_left("0 seats"), None);
}

#[test]
fn plane_change_is_tristate() {
    assert_eq!(parse_plane_change("Plane change in ORD"), Some(true));
    assert_eq!(parse_plane_change("Change of aircraft"), Some(true));
    assert_eq!(parse_plane_change("No plane change"), Some(false));
    assert_eq!(parse_plane_change("Same plane"), Some(false));
    assert_eq!(parse_plane_change(""), None);
    assert_eq!(parse_plane_change("Operated by partner"), None);
}

#[test]
fn price_without_amount_is_unavailable() {
    assert_eq!(normalize_price("  $249 "), "$249");
    assert_eq!(normalize_price("$1,049"), "$1,049");
    assert_eq!(normalize_price("Not available"), "Unavailable");
    assert_eq!(normalize_price(""), "Unavailable");
}

#[test]
fn clock_joins_meridiem() {
    assert_eq!(join_clock(" 7:05 ", "am"), "7:05 AM");
    assert_eq!(join_clock("11:59", ""), "11:59");
}
