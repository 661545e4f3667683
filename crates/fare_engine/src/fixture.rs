//! Static-HTML page session, for replaying a saved results page offline.
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use scraper::{Html, Selector};

use crate::{BrowserError, ClickOptions, PageSession, SessionLauncher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureElement {
    text: String,
}

#[derive(Debug, Default)]
struct FixtureState {
    html: String,
    after_submit: Option<String>,
    landing_url: Option<String>,
    fail_load: bool,
    visited: Vec<String>,
    clicks: Vec<String>,
    scripts: Vec<String>,
    closed: usize,
}

/// A page session backed by a fixed HTML document.
///
/// Clones share state, so a [`FixtureProbe`] taken before launch observes
/// everything done through any clone.
#[derive(Debug, Clone)]
pub struct FixturePage {
    inner: Arc<Mutex<FixtureState>>,
}

impl FixturePage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FixtureState {
                html: html.into(),
                ..FixtureState::default()
            })),
        }
    }

    /// Report `url` as the address after load instead of the requested one.
    pub fn landing_at(self, url: impl Into<String>) -> Self {
        self.lock().landing_url = Some(url.into());
        self
    }

    /// Swap in `html` once something is clicked, as a submitted search form would.
    pub fn after_search_submit(self, html: impl Into<String>) -> Self {
        self.lock().after_submit = Some(html.into());
        self
    }

    /// Make every `goto` time out.
    pub fn failing_load(self) -> Self {
        self.lock().fail_load = true;
        self
    }

    pub fn probe(&self) -> FixtureProbe {
        FixtureProbe {
            inner: self.inner.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn select_texts(html: &str, selector: &str) -> Result<Vec<String>, BrowserError> {
    let parsed = Selector::parse(selector)
        .map_err(|err| BrowserError::InvalidSelector(format!("{selector}: {err}")))?;
    let doc = Html::parse_document(html);
    Ok(doc
        .select(&parsed)
        .map(|node| node.text().collect::<String>())
        .collect())
}

#[async_trait::async_trait]
impl PageSession for FixturePage {
    type Element = FixtureElement;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let mut state = self.lock();
        state.visited.push(url.to_string());
        if state.fail_load {
            return Err(BrowserError::Timeout {
                action: "waiting for network idle",
                after: timeout,
            });
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let state = self.lock();
        Ok(state
            .landing_url
            .clone()
            .or_else(|| state.visited.last().cloned())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn evaluate(&self, script: &str) -> Result<(), BrowserError> {
        self.lock().scripts.push(script.to_string());
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Vec<FixtureElement>, BrowserError> {
        let html = self.lock().html.clone();
        Ok(select_texts(&html, selector)?
            .into_iter()
            .map(|text| FixtureElement { text })
            .collect())
    }

    async fn text(&self, element: &FixtureElement) -> Result<String, BrowserError> {
        Ok(element.text.clone())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool, BrowserError> {
        let html = self.lock().html.clone();
        Ok(!select_texts(&html, selector)?.is_empty())
    }

    async fn human_click(
        &self,
        selector: &str,
        _options: ClickOptions,
    ) -> Result<(), BrowserError> {
        let mut state = self.lock();
        if select_texts(&state.html, selector)?.is_empty() {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        }
        state.clicks.push(selector.to_string());
        if let Some(next) = state.after_submit.take() {
            state.html = next;
            state.landing_url = None;
        }
        Ok(())
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.lock().closed += 1;
        Ok(())
    }
}

/// Read-only view of what was done to a [`FixturePage`].
#[derive(Debug, Clone)]
pub struct FixtureProbe {
    inner: Arc<Mutex<FixtureState>>,
}

impl FixtureProbe {
    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.lock().scripts.clone()
    }

    pub fn close_count(&self) -> usize {
        self.lock().closed
    }
}

#[derive(Debug, Clone)]
enum PageSource {
    Shared(FixturePage),
    Replay(Arc<str>),
    Unavailable,
}

/// Hands out [`FixturePage`] sessions.
#[derive(Debug, Clone)]
pub struct FixtureLauncher {
    source: PageSource,
}

impl FixtureLauncher {
    /// Every launch returns a clone of `page`, so a probe taken from it sees
    /// all sessions.
    pub fn new(page: FixturePage) -> Self {
        Self {
            source: PageSource::Shared(page),
        }
    }

    /// Every launch returns a fresh page over `html`; sessions share nothing.
    pub fn replay(html: impl Into<String>) -> Self {
        Self {
            source: PageSource::Replay(Arc::from(html.into())),
        }
    }

    /// A launcher whose browser never starts.
    pub fn unavailable() -> Self {
        Self {
            source: PageSource::Unavailable,
        }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for FixtureLauncher {
    type Session = FixturePage;

    async fn launch(&self) -> Result<FixturePage, BrowserError> {
        match &self.source {
            PageSource::Shared(page) => Ok(page.clone()),
            PageSource::Replay(html) => Ok(FixturePage::new(html.as_ref())),
            PageSource::Unavailable => {
                Err(BrowserError::Launch("no browser available".to_string()))
            }
        }
    }
}
