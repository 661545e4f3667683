//! Fare engine: browser sessions, row extraction and record persistence.
mod browser;
mod chromium;
mod engine;
mod extract;
mod fixture;
mod layout;
mod navigate;
mod persist;
mod rows;
mod types;

pub use browser::{ClickOptions, PageSession, SessionLauncher};
pub use chromium::{ChromiumLauncher, ChromiumSession, ChromiumSettings};
pub use engine::ScrapeOrchestrator;
pub use extract::FieldExtractor;
pub use fixture::{FixtureElement, FixtureLauncher, FixturePage, FixtureProbe};
pub use layout::{GridLayout, ResultsLayout, RowField, TierField};
pub use navigate::{CollectingSink, NavigationEvent, NavigationSettings, NavigationSink, Navigator};
pub use persist::{NullStore, Persister, RecordStore, RestStore, StoreSettings};
pub use rows::RowEnumerator;
pub use types::{
    BrowserError, ExtractionReport, PersistReport, RowOutcome, ScrapeError, ScrapeOutcome,
    ScrapeReport, StoreError, StoreFailure,
};
