//! Fare core: record model, text normalization and the pure scrape state machine.
mod effect;
mod model;
mod msg;
pub mod normalize;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use model::{
    FareMetadata, FlightQuery, FlightRecord, ScheduleFields, SeatAvailability, StopDescriptor,
    NONSTOP_LABEL, PRICE_UNAVAILABLE, TIER_SLOTS,
};
pub use msg::Msg;
pub use state::{is_search_redirect, Phase, ScrapeState};
pub use update::update;
pub use view_model::ScrapeSummary;
