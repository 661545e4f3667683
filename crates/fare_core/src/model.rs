use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Number of fare tier slots every record carries.
pub const TIER_SLOTS: usize = 3;
/// Price placeholder for a tier slot the page did not render.
pub const PRICE_UNAVAILABLE: &str = "Unavailable";
pub const NONSTOP_LABEL: &str = "Nonstop";

/// One requested origin/destination/date triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

impl FlightQuery {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            origin: origin.into().trim().to_ascii_uppercase(),
            destination: destination.into().trim().to_ascii_uppercase(),
            date,
        }
    }

    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Short label used in log lines, e.g. `SFO-JFK 2024-05-01`.
    pub fn label(&self) -> String {
        format!("{}-{} {}", self.origin, self.destination, self.date_label())
    }
}

/// One scraped result row for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub departure_port: String,
    pub arrival_port: String,
    pub date: String,
    pub metadata: FareMetadata,
}

impl FlightRecord {
    pub fn new(query: &FlightQuery, metadata: FareMetadata) -> Self {
        Self {
            departure_port: query.origin.clone(),
            arrival_port: query.destination.clone(),
            date: query.date_label(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareMetadata {
    pub flight_numbers: Vec<String>,
    pub num_stops: StopDescriptor,
    pub plane_change: Option<bool>,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub prices: [String; TIER_SLOTS],
    pub seats_left: [Option<SeatAvailability>; TIER_SLOTS],
}

/// Fields of a row other than its fare tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleFields {
    pub flight_numbers: Vec<String>,
    pub num_stops: StopDescriptor,
    pub plane_change: Option<bool>,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
}

impl Default for ScheduleFields {
    fn default() -> Self {
        Self {
            flight_numbers: Vec::new(),
            num_stops: StopDescriptor::Nonstop,
            plane_change: None,
            departure_time: String::new(),
            arrival_time: String::new(),
            duration: String::new(),
        }
    }
}

impl FareMetadata {
    /// Builds metadata from whatever tiers were read, padding missing slots
    /// with the sentinels and dropping anything past `TIER_SLOTS`.
    pub fn from_tiers(
        schedule: ScheduleFields,
        prices: Vec<String>,
        seats_left: Vec<Option<SeatAvailability>>,
    ) -> Self {
        let mut prices = prices.into_iter();
        let mut seats_left = seats_left.into_iter();
        Self {
            flight_numbers: schedule.flight_numbers,
            num_stops: schedule.num_stops,
            plane_change: schedule.plane_change,
            departure_time: schedule.departure_time,
            arrival_time: schedule.arrival_time,
            duration: schedule.duration,
            prices: std::array::from_fn(|_| {
                prices
                    .next()
                    .unwrap_or_else(|| PRICE_UNAVAILABLE.to_string())
            }),
            seats_left: std::array::from_fn(|_| seats_left.next().flatten()),
        }
    }
}

/// Stop count of a row; `Stops(0)` is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopDescriptor {
    #[default]
    Nonstop,
    Stops(u32),
}

impl Serialize for StopDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StopDescriptor::Nonstop => serializer.serialize_str(NONSTOP_LABEL),
            StopDescriptor::Stops(count) => serializer.serialize_u32(*count),
        }
    }
}

/// Normalized seats-left indicator for one fare tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAvailability {
    Remaining(u32),
    /// The page signals scarcity without a number.
    Limited,
}

impl Serialize for SeatAvailability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SeatAvailability::Remaining(count) => serializer.serialize_u32(*count),
            SeatAvailability::Limited => serializer.serialize_str("Limited"),
        }
    }
}
