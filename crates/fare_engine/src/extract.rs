use std::sync::Arc;

use fare_core::normalize::{
    clean_text, join_clock, normalize_price, parse_flight_numbers, parse_plane_change,
    parse_seats_left, parse_stops,
};
use fare_core::{
    FareMetadata, FlightQuery, FlightRecord, ScheduleFields, SeatAvailability, StopDescriptor,
    PRICE_UNAVAILABLE, TIER_SLOTS,
};
use scrape_logging::{scrape_debug, scrape_warn};

use crate::{BrowserError, PageSession, ResultsLayout, RowField, RowOutcome, TierField};

/// Reads one result row field by field.
///
/// A field whose selector matches nothing takes its default; any other
/// failure skips the whole row.
pub struct FieldExtractor {
    layout: Arc<dyn ResultsLayout>,
}

impl FieldExtractor {
    pub fn new(layout: Arc<dyn ResultsLayout>) -> Self {
        Self { layout }
    }

    pub async fn extract_row<S: PageSession>(
        &self,
        session: &S,
        query: &FlightQuery,
        index: usize,
    ) -> RowOutcome {
        match self.read_row(session, index).await {
            Ok(metadata) => {
                scrape_debug!(
                    "row {} extracted: {:?} {}",
                    index,
                    metadata.flight_numbers,
                    metadata.departure_time
                );
                RowOutcome::Extracted(FlightRecord::new(query, metadata))
            }
            Err(error) => {
                scrape_warn!("skipping row {}: {}", index, error);
                RowOutcome::Skipped { index, error }
            }
        }
    }

    async fn read_row<S: PageSession>(
        &self,
        session: &S,
        row: usize,
    ) -> Result<FareMetadata, BrowserError> {
        let schedule = ScheduleFields {
            flight_numbers: self
                .field(session, row, RowField::FlightNumbers)
                .await?
                .map(|raw| parse_flight_numbers(&raw))
                .unwrap_or_default(),
            num_stops: self
                .field(session, row, RowField::Stops)
                .await?
                .map(|raw| parse_stops(&raw))
                .unwrap_or(StopDescriptor::Nonstop),
            plane_change: self
                .field(session, row, RowField::PlaneChange)
                .await?
                .and_then(|raw| parse_plane_change(&raw)),
            departure_time: self
                .clock(session, row, RowField::DepartureTime, RowField::DepartureMeridiem)
                .await?,
            arrival_time: self
                .clock(session, row, RowField::ArrivalTime, RowField::ArrivalMeridiem)
                .await?,
            duration: self
                .field(session, row, RowField::Duration)
                .await?
                .map(|raw| clean_text(&raw))
                .unwrap_or_default(),
        };

        let mut prices = Vec::with_capacity(TIER_SLOTS);
        let mut seats_left: Vec<Option<SeatAvailability>> = Vec::with_capacity(TIER_SLOTS);
        for slot in 1..=TIER_SLOTS {
            if let Some(raw) = self.tier(session, row, slot, TierField::Price).await? {
                prices.push(normalize_price(&raw));
            } else {
                prices.push(PRICE_UNAVAILABLE.to_string());
            }
            seats_left.push(
                self.tier(session, row, slot, TierField::SeatsLeft)
                    .await?
                    .and_then(|raw| parse_seats_left(&raw)),
            );
        }

        Ok(FareMetadata::from_tiers(schedule, prices, seats_left))
    }

    async fn clock<S: PageSession>(
        &self,
        session: &S,
        row: usize,
        time: RowField,
        meridiem: RowField,
    ) -> Result<String, BrowserError> {
        let Some(time) = self.field(session, row, time).await? else {
            return Ok(String::new());
        };
        let meridiem = self.field(session, row, meridiem).await?.unwrap_or_default();
        Ok(join_clock(&time, &meridiem))
    }

    async fn field<S: PageSession>(
        &self,
        session: &S,
        row: usize,
        field: RowField,
    ) -> Result<Option<String>, BrowserError> {
        first_text(session, &self.layout.field(row, field)).await
    }

    async fn tier<S: PageSession>(
        &self,
        session: &S,
        row: usize,
        slot: usize,
        field: TierField,
    ) -> Result<Option<String>, BrowserError> {
        first_text(session, &self.layout.tier(row, slot, field)).await
    }
}

/// Text of the first match, `None` when nothing matches.
async fn first_text<S: PageSession>(
    session: &S,
    selector: &str,
) -> Result<Option<String>, BrowserError> {
    let elements = session.query(selector).await?;
    match elements.first() {
        Some(element) => Ok(Some(session.text(element).await?)),
        None => Ok(None),
    }
}
