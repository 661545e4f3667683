use chrono::NaiveDate;
use fare_core::{
    FareMetadata, FlightQuery, FlightRecord, ScheduleFields, SeatAvailability, StopDescriptor,
    TIER_SLOTS,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn query() -> FlightQuery {
    FlightQuery::new(" sfo", "jfk ", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
}

#[test]
fn missing_tiers_are_padded_with_sentinels() {
    let metadata = FareMetadata::from_tiers(
        ScheduleFields::default(),
        vec!["$120".to_string()],
        vec![Some(SeatAvailability::Remaining(2))],
    );
    assert_eq!(metadata.prices.len(), TIER_SLOTS);
    assert_eq!(
        metadata.prices,
        [
            "$120".to_string(),
            "Unavailable".to_string(),
            "Unavailable".to_string()
        ]
    );
    assert_eq!(
        metadata.seats_left,
        [Some(SeatAvailability::Remaining(2)), None, None]
    );
}

#[test]
fn extra_tiers_are_dropped() {
    let prices = (1..=5).map(|n| format!("${n}00")).collect();
    let metadata = FareMetadata::from_tiers(ScheduleFields::default(), prices, Vec::new());
    assert_eq!(metadata.prices[2], "$300");
    assert_eq!(metadata.seats_left, [None, None, None]);
}

#[test]
fn query_labels_are_normalized() {
    let query = query();
    assert_eq!(query.origin, "SFO");
    assert_eq!(query.destination, "JFK");
    assert_eq!(query.label(), "SFO-JFK 2024-05-01");
}

#[test]
fn record_serializes_with_camel_case_fields() {
    let schedule = ScheduleFields {
        flight_numbers: vec!["UA12".to_string()],
        num_stops: StopDescriptor::Stops(1),
        plane_change: Some(true),
        departure_time: "7:05 AM".to_string(),
        arrival_time: "3:40 PM".to_string(),
        duration: "5h 35m".to_string(),
    };
    let record = FlightRecord::new(
        &query(),
        FareMetadata::from_tiers(
            schedule,
            vec!["$249".to_string(), "$399".to_string()],
            vec![Some(SeatAvailability::Limited), Some(SeatAvailability::Remaining(4))],
        ),
    );

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({
            "departurePort": "SFO",
            "arrivalPort": "JFK",
            "date": "2024-05-01",
            "metadata": {
                "flightNumbers": ["UA12"],
                "numStops": 1,
                "planeChange": true,
                "departureTime": "7:05 AM",
                "arrivalTime": "3:40 PM",
                "duration": "5h 35m",
                "prices": ["$249", "$399", "Unavailable"],
                "seatsLeft": ["Limited", 4, null]
            }
        })
    );
}

#[test]
fn nonstop_serializes_as_label() {
    let metadata = FareMetadata::from_tiers(ScheduleFields::default(), Vec::new(), Vec::new());
    let value = serde_json::to_value(&metadata).unwrap();
    assert_eq!(value["numStops"], json!("Nonstop"));
    assert_eq!(value["planeChange"], json!(null));
    assert_eq!(value["flightNumbers"], json!([]));
}
