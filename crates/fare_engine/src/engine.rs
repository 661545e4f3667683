use std::collections::VecDeque;
use std::sync::Arc;

use fare_core::{update, Effect, FlightQuery, Msg, Phase, ScrapeState};
use scrape_logging::{scrape_error, scrape_info, scrape_warn, InvocationScope};

use crate::navigate::{CollectingSink, Navigator};
use crate::{
    ExtractionReport, FieldExtractor, NavigationSettings, PersistReport, Persister,
    ResultsLayout, RowEnumerator, RowOutcome, ScrapeError, ScrapeOutcome, ScrapeReport,
    SessionLauncher,
};

/// Runs one query end to end: navigate, count, extract each row, release
/// the browser, persist.
///
/// Sequencing is decided by `fare_core::update`; this type only performs the
/// effects it asks for and feeds the results back.
pub struct ScrapeOrchestrator<L: SessionLauncher> {
    layout: Arc<dyn ResultsLayout>,
    navigator: Navigator<L>,
    enumerator: RowEnumerator,
    extractor: FieldExtractor,
    persister: Persister,
}

struct Invocation<S> {
    session: Option<S>,
    extraction: ExtractionReport,
    persist: PersistReport,
    fatal: Option<ScrapeError>,
}

impl<L: SessionLauncher> ScrapeOrchestrator<L> {
    pub fn new(
        launcher: L,
        layout: Arc<dyn ResultsLayout>,
        navigation: NavigationSettings,
        persister: Persister,
    ) -> Self {
        let navigator = Navigator::new(launcher, navigation, layout.search_submit());
        Self {
            enumerator: RowEnumerator::new(layout.clone()),
            extractor: FieldExtractor::new(layout.clone()),
            layout,
            navigator,
            persister,
        }
    }

    pub async fn run(&self, query: &FlightQuery) -> Result<ScrapeReport, ScrapeError> {
        let _scope = InvocationScope::enter(query.label());
        let url = self.layout.results_url(query);

        let mut run = Invocation {
            session: None,
            extraction: ExtractionReport::default(),
            persist: PersistReport::default(),
            fatal: None,
        };
        let (mut state, effects) = update(ScrapeState::new(), Msg::Start { url });
        let mut pending: VecDeque<Effect> = effects.into();

        while let Some(effect) = pending.pop_front() {
            let msgs = self.perform(effect, query, &mut run).await;
            for msg in msgs {
                let (next, effects) = update(state, msg);
                state = next;
                pending.extend(effects);
            }
        }

        if let Some(session) = run.session.take() {
            scrape_warn!("session still open after {:?}; closing", state.phase());
            self.navigator.close(session).await;
        }

        let summary = state.view();
        if let Some(err) = run.fatal {
            scrape_error!("[{}] {}", query.label(), err);
            return Err(err);
        }
        if summary.phase != Phase::Done {
            return Err(ScrapeError::Incomplete(format!(
                "ended in {:?}",
                summary.phase
            )));
        }

        let outcome = if summary.no_flights() {
            scrape_info!("[{}] no flights found", query.label());
            ScrapeOutcome::NoFlights
        } else {
            scrape_info!(
                "[{}] {} row(s) extracted, {} skipped",
                query.label(),
                summary.rows_extracted,
                summary.rows_skipped
            );
            ScrapeOutcome::Records(run.extraction.records)
        };

        Ok(ScrapeReport {
            outcome,
            skipped_rows: run.extraction.skipped,
            persist: run.persist,
            summary,
        })
    }

    async fn perform(
        &self,
        effect: Effect,
        query: &FlightQuery,
        run: &mut Invocation<L::Session>,
    ) -> Vec<Msg> {
        match effect {
            Effect::OpenSession { url } => {
                let sink = CollectingSink::default();
                let opened = self.navigator.open(&url, &sink).await;
                let mut msgs: Vec<Msg> = sink.into_events().into_iter().map(Msg::from).collect();
                match opened {
                    Ok(session) => run.session = Some(session),
                    Err(err) => msgs.push(fail(run, err)),
                }
                msgs
            }
            Effect::CountRows => {
                let Some(session) = run.session.as_ref() else {
                    return vec![missing_session()];
                };
                match self.enumerator.count(session).await {
                    Ok(total) => {
                        scrape_info!("[{}] {} result row(s)", query.label(), total);
                        vec![Msg::RowsCounted(total)]
                    }
                    Err(err) => vec![fail(run, ScrapeError::Enumeration(err))],
                }
            }
            Effect::ExtractRow { index } => {
                let Some(session) = run.session.as_ref() else {
                    return vec![missing_session()];
                };
                let outcome = self.extractor.extract_row(session, query, index).await;
                let extracted = matches!(outcome, RowOutcome::Extracted(_));
                run.extraction.push(outcome);
                vec![Msg::RowFinished { index, extracted }]
            }
            Effect::ReleaseSession => {
                if let Some(session) = run.session.take() {
                    self.navigator.close(session).await;
                }
                Vec::new()
            }
            Effect::PersistRecords => {
                run.persist = self.persister.store_all(&run.extraction.records).await;
                vec![Msg::PersistFinished {
                    stored: run.persist.stored,
                    failed: run.persist.failures.len(),
                }]
            }
        }
    }
}

fn fail<S>(run: &mut Invocation<S>, err: ScrapeError) -> Msg {
    let reason = err.to_string();
    run.fatal = Some(err);
    Msg::Failed { reason }
}

fn missing_session() -> Msg {
    Msg::Failed {
        reason: "no browser session".to_string(),
    }
}
