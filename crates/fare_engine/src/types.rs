use std::time::Duration;

use fare_core::{FlightRecord, ScrapeSummary};
use thiserror::Error;

/// Failures raised at the browser-automation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("browser failed to start: {0}")]
    Launch(String),
    #[error("timed out after {after:?} while {action}")]
    Timeout { action: &'static str, after: Duration },
    #[error("no element matches {0}")]
    ElementNotFound(String),
    #[error("invalid selector {0}")]
    InvalidSelector(String),
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(err.to_string())
    }
}

/// Failures raised at the remote datastore boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("datastore rejected insert with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("datastore request timed out")]
    Timeout,
    #[error("datastore unreachable: {0}")]
    Network(String),
    #[error("record could not be encoded: {0}")]
    Encode(String),
    #[error("datastore misconfigured: {0}")]
    Config(String),
}

/// Fatal outcomes of one scrape invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("setup failed: {0}")]
    Setup(BrowserError),
    #[error("results page never loaded: {0}")]
    Navigation(BrowserError),
    #[error("could not count result rows: {0}")]
    Enumeration(BrowserError),
    #[error("invocation stopped early: {0}")]
    Incomplete(String),
}

/// Result of processing a single row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Extracted(FlightRecord),
    Skipped { index: usize, error: BrowserError },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionReport {
    pub records: Vec<FlightRecord>,
    pub skipped: Vec<(usize, BrowserError)>,
}

impl ExtractionReport {
    pub fn push(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Extracted(record) => self.records.push(record),
            RowOutcome::Skipped { index, error } => self.skipped.push((index, error)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    /// Position of the record in the invocation's record sequence.
    pub position: usize,
    pub error: StoreError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersistReport {
    pub attempted: usize,
    pub stored: usize,
    pub failures: Vec<StoreFailure>,
}

/// Non-fatal end states of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Records(Vec<FlightRecord>),
    /// The results page rendered zero rows for the query.
    NoFlights,
}

impl ScrapeOutcome {
    pub fn records(&self) -> &[FlightRecord] {
        match self {
            ScrapeOutcome::Records(records) => records,
            ScrapeOutcome::NoFlights => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub outcome: ScrapeOutcome,
    pub skipped_rows: Vec<(usize, BrowserError)>,
    pub persist: PersistReport,
    pub summary: ScrapeSummary,
}
