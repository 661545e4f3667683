use url::Url;

use crate::view_model::ScrapeSummary;
use crate::Effect;

/// Phases of one scrape invocation, in the order a clean run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Init,
    Navigating,
    RedirectCheck,
    SearchClick,
    Settling,
    Enumerating,
    Empty,
    Extracting,
    Persisting,
    Done,
    DoneError,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::DoneError)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapeState {
    phase: Phase,
    trail: Vec<Phase>,
    requested_url: Option<String>,
    search_clicked: Option<bool>,
    rows_total: usize,
    next_row: usize,
    rows_extracted: usize,
    rows_skipped: usize,
    stored: usize,
    store_failures: usize,
    session_held: bool,
    session_released: bool,
    failure: Option<String>,
}

impl ScrapeState {
    pub fn new() -> Self {
        Self {
            trail: vec![Phase::Init],
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> ScrapeSummary {
        ScrapeSummary {
            phase: self.phase,
            trail: self.trail.clone(),
            rows_total: self.rows_total,
            rows_extracted: self.rows_extracted,
            rows_skipped: self.rows_skipped,
            stored: self.stored,
            store_failures: self.store_failures,
            search_clicked: self.search_clicked,
            failure: self.failure.clone(),
        }
    }

    pub(crate) fn requested_url(&self) -> Option<&str> {
        self.requested_url.as_deref()
    }

    pub(crate) fn rows_total(&self) -> usize {
        self.rows_total
    }

    pub(crate) fn next_row(&self) -> usize {
        self.next_row
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.trail.push(phase);
    }

    pub(crate) fn begin(&mut self, url: String) {
        self.requested_url = Some(url);
        self.enter(Phase::Navigating);
    }

    pub(crate) fn record_search(&mut self, clicked: bool) {
        self.search_clicked = Some(clicked);
    }

    pub(crate) fn take_session(&mut self) {
        self.session_held = true;
    }

    pub(crate) fn start_rows(&mut self, total: usize) {
        self.rows_total = total;
        self.next_row = 1;
    }

    pub(crate) fn finish_row(&mut self, extracted: bool) {
        if extracted {
            self.rows_extracted += 1;
        } else {
            self.rows_skipped += 1;
        }
        self.next_row += 1;
    }

    pub(crate) fn record_store(&mut self, stored: usize, failed: usize) {
        self.stored = stored;
        self.store_failures = failed;
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.failure = Some(reason);
        self.enter(Phase::DoneError);
    }

    /// The release effect, the first time it is asked for while a session is held.
    pub(crate) fn release_session(&mut self) -> Option<Effect> {
        if self.session_held && !self.session_released {
            self.session_released = true;
            Some(Effect::ReleaseSession)
        } else {
            None
        }
    }
}

/// True when the browser landed somewhere other than the requested results
/// page. Scheme/host case and a trailing slash on the path are not differences.
pub fn is_search_redirect(requested: &str, current: &str) -> bool {
    normalize_url(requested) != normalize_url(current)
}

fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            let path = url.path().trim_end_matches('/').to_string();
            url.set_path(&path);
            url.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed.trim_end_matches('/').to_string(),
    }
}
