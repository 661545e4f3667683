mod cli;
mod config;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fare_core::FlightQuery;
use fare_engine::{
    ChromiumLauncher, ChromiumSettings, FixtureLauncher, NullStore, Persister,
    RecordStore, RestStore, ScrapeOrchestrator, ScrapeOutcome, SessionLauncher,
};
use log::LevelFilter;
use scrape_logging::{scrape_error, scrape_info, scrape_warn};

use crate::cli::Cli;
use crate::config::SettingsFile;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let settings = match &cli.config {
        Some(path) => SettingsFile::load(path)?,
        None => SettingsFile::default(),
    };
    let queries = cli.queries()?;

    let store: Arc<dyn RecordStore> = if cli.dry_run {
        Arc::new(NullStore)
    } else {
        Arc::new(RestStore::new(settings.store(config::env_lookup)?)?)
    };
    let persister = Persister::new(store, settings.table.clone());

    let fatal = match &cli.replay {
        Some(path) => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("reading saved page {}", path.display()))?;
            let launcher = FixtureLauncher::replay(html);
            run_all(launcher, &settings, persister, &queries, cli.dry_run).await
        }
        None => {
            let launcher = ChromiumLauncher::new(ChromiumSettings {
                executable: config::chrome_path(config::env_lookup),
                headed: cli.headed,
            });
            run_all(launcher, &settings, persister, &queries, cli.dry_run).await
        }
    };

    if fatal > 0 {
        scrape_error!("{} of {} invocation(s) failed", fatal, queries.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs each query in turn and returns how many ended fatally.
async fn run_all<L: SessionLauncher>(
    launcher: L,
    settings: &SettingsFile,
    persister: Persister,
    queries: &[FlightQuery],
    print_records: bool,
) -> usize {
    let orchestrator = ScrapeOrchestrator::new(
        launcher,
        Arc::new(settings.layout()),
        settings.navigation(),
        persister,
    );

    let mut fatal = 0;
    for query in queries {
        match orchestrator.run(query).await {
            Ok(report) => {
                match &report.outcome {
                    ScrapeOutcome::NoFlights => scrape_info!("{}: no flights", query.label()),
                    ScrapeOutcome::Records(records) => scrape_info!(
                        "{}: {} record(s), {} stored, {} row(s) skipped",
                        query.label(),
                        records.len(),
                        report.persist.stored,
                        report.skipped_rows.len()
                    ),
                }
                if !report.persist.failures.is_empty() {
                    scrape_warn!(
                        "{}: {} record(s) were not stored",
                        query.label(),
                        report.persist.failures.len()
                    );
                }
                if print_records {
                    match serde_json::to_string_pretty(report.outcome.records()) {
                        Ok(json) => println!("{json}"),
                        Err(err) => scrape_warn!("could not render records: {}", err),
                    }
                }
            }
            Err(err) => {
                scrape_error!("{}: {}", query.label(), err);
                fatal += 1;
            }
        }
    }
    fatal
}
