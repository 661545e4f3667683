use std::sync::{Arc, Once};

use chrono::NaiveDate;
use fare_core::{FlightQuery, SeatAvailability, StopDescriptor, PRICE_UNAVAILABLE};
use fare_engine::{FieldExtractor, FixturePage, GridLayout, RowEnumerator, RowOutcome};
use pretty_assertions::assert_eq;

const RESULTS: &str = include_str!("fixtures/results.html");
const NO_RESULTS: &str = include_str!("fixtures/no_results.html");

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

fn query() -> FlightQuery {
    FlightQuery::new("SFO", "JFK", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
}

fn extracted(outcome: RowOutcome) -> fare_core::FlightRecord {
    match outcome {
        RowOutcome::Extracted(record) => record,
        RowOutcome::Skipped { index, error } => panic!("row {index} skipped: {error}"),
    }
}

#[tokio::test]
async fn counts_rendered_rows() {
    init_logging();
    let enumerator = RowEnumerator::new(Arc::new(GridLayout::default()));
    assert_eq!(enumerator.count(&FixturePage::new(RESULTS)).await, Ok(2));
    assert_eq!(enumerator.count(&FixturePage::new(NO_RESULTS)).await, Ok(0));
}

#[tokio::test]
async fn full_row_is_normalized() {
    init_logging();
    let extractor = FieldExtractor::new(Arc::new(GridLayout::default()));
    let page = FixturePage::new(RESULTS);

    let record = extracted(extractor.extract_row(&page, &query(), 1).await);
    assert_eq!(record.departure_port, "SFO");
    assert_eq!(record.arrival_port, "JFK");
    assert_eq!(record.date, "2024-05-01");

    let meta = record.metadata;
    assert_eq!(meta.flight_numbers, vec!["UA123", "UA456"]);
    assert_eq!(meta.num_stops, StopDescriptor::Stops(1));
    assert_eq!(meta.plane_change, Some(true));
    assert_eq!(meta.departure_time, "7:05 AM");
    assert_eq!(meta.arrival_time, "3:40 PM");
    assert_eq!(meta.duration, "5h 35m");
    assert_eq!(meta.prices, ["$189", "$249", "$612"].map(String::from));
    assert_eq!(
        meta.seats_left,
        [
            Some(SeatAvailability::Remaining(2)),
            None,
            Some(SeatAvailability::Remaining(1)),
        ]
    );
}

#[tokio::test]
async fn row_without_fare_tiers_is_padded() {
    init_logging();
    let extractor = FieldExtractor::new(Arc::new(GridLayout::default()));
    let page = FixturePage::new(RESULTS);

    let meta = extracted(extractor.extract_row(&page, &query(), 2).await).metadata;
    assert_eq!(meta.flight_numbers, vec!["UA789"]);
    assert_eq!(meta.num_stops, StopDescriptor::Nonstop);
    assert_eq!(meta.plane_change, None);
    assert_eq!(meta.arrival_time, "11:55 PM");
    assert_eq!(meta.prices, [PRICE_UNAVAILABLE; 3].map(String::from));
    assert_eq!(meta.seats_left, [None, None, None]);
}

#[tokio::test]
async fn missing_row_yields_defaults_not_error() {
    init_logging();
    let extractor = FieldExtractor::new(Arc::new(GridLayout::default()));
    let page = FixturePage::new(NO_RESULTS);

    let meta = extracted(extractor.extract_row(&page, &query(), 1).await).metadata;
    assert!(meta.flight_numbers.is_empty());
    assert_eq!(meta.num_stops, StopDescriptor::Nonstop);
    assert_eq!(meta.departure_time, "");
    assert_eq!(meta.duration, "");
    assert_eq!(meta.prices, [PRICE_UNAVAILABLE; 3].map(String::from));
}
