use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use fare_core::FlightQuery;

use crate::config::ConfigError;
use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "fare_scraper",
    about = "Scrape fares from a flight results page and store one record per flight"
)]
pub struct Cli {
    /// Departure airport code, e.g. SFO
    #[arg(long = "from")]
    pub origin: String,
    /// Arrival airport code, e.g. JFK
    #[arg(long = "to")]
    pub destination: String,
    /// Travel date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    /// Last travel date to scrape, inclusive; one page per day
    #[arg(long)]
    pub until: Option<NaiveDate>,
    /// RON file overriding timings, base URL and table name
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Read a saved results page instead of launching a browser
    #[arg(long)]
    pub replay: Option<PathBuf>,
    /// Print records as JSON instead of storing them
    #[arg(long)]
    pub dry_run: bool,
    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
    /// Log to the terminal, ./scrape.log, or both
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,
    /// Include per-row debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// One query per day from `--date` through `--until`.
    pub fn queries(&self) -> Result<Vec<FlightQuery>, ConfigError> {
        let until = self.until.unwrap_or(self.date);
        if until < self.date {
            return Err(ConfigError::EmptyRange {
                date: self.date,
                until,
            });
        }
        Ok(self
            .date
            .iter_days()
            .take_while(|day| *day <= until)
            .map(|day| FlightQuery::new(&self.origin, &self.destination, day))
            .collect())
    }
}
