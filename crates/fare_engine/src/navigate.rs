use std::sync::Mutex;
use std::time::Duration;

use fare_core::{is_search_redirect, Msg};
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::{ClickOptions, PageSession, ScrapeError, SessionLauncher};

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSettings {
    pub load_timeout: Duration,
    /// How long to look for the search form's submit control.
    pub submit_wait: Duration,
    pub click: ClickOptions,
    pub after_click_delay: Duration,
    pub scroll_offset: u32,
    pub settle_delay: Duration,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(90),
            submit_wait: Duration::from_secs(5),
            click: ClickOptions::default(),
            after_click_delay: Duration::from_secs(5),
            scroll_offset: 1000,
            settle_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Loaded { current_url: String },
    SearchSubmitted { clicked: bool },
    Settled,
}

impl From<NavigationEvent> for Msg {
    fn from(event: NavigationEvent) -> Self {
        match event {
            NavigationEvent::Loaded { current_url } => Msg::PageLoaded { current_url },
            NavigationEvent::SearchSubmitted { clicked } => Msg::SearchSubmitted { clicked },
            NavigationEvent::Settled => Msg::Settled,
        }
    }
}

pub trait NavigationSink: Send + Sync {
    fn emit(&self, event: NavigationEvent);
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<NavigationEvent>>,
}

impl CollectingSink {
    pub fn into_events(self) -> Vec<NavigationEvent> {
        self.events
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NavigationSink for CollectingSink {
    fn emit(&self, event: NavigationEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Opens the results page and owns the browser session's lifetime.
pub struct Navigator<L> {
    launcher: L,
    settings: NavigationSettings,
    search_submit: String,
}

impl<L: SessionLauncher> Navigator<L> {
    pub fn new(launcher: L, settings: NavigationSettings, search_submit: impl Into<String>) -> Self {
        Self {
            launcher,
            settings,
            search_submit: search_submit.into(),
        }
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    /// Launches a session and brings `url` into a scrollable, settled state.
    ///
    /// On error the session has already been closed.
    pub async fn open(
        &self,
        url: &str,
        sink: &dyn NavigationSink,
    ) -> Result<L::Session, ScrapeError> {
        let session = self.launcher.launch().await.map_err(ScrapeError::Setup)?;
        match self.prepare(&session, url, sink).await {
            Ok(()) => Ok(session),
            Err(err) => {
                self.close(session).await;
                Err(err)
            }
        }
    }

    pub async fn close(&self, session: L::Session) {
        match session.close().await {
            Ok(()) => scrape_debug!("browser session closed"),
            Err(err) => scrape_warn!("browser session did not close cleanly: {}", err),
        }
    }

    async fn prepare(
        &self,
        session: &L::Session,
        url: &str,
        sink: &dyn NavigationSink,
    ) -> Result<(), ScrapeError> {
        scrape_info!("loading {}", url);
        session
            .goto(url, self.settings.load_timeout)
            .await
            .map_err(ScrapeError::Navigation)?;

        let current_url = session
            .current_url()
            .await
            .map_err(ScrapeError::Navigation)?;
        let redirected = is_search_redirect(url, &current_url);
        sink.emit(NavigationEvent::Loaded {
            current_url: current_url.clone(),
        });

        if redirected {
            scrape_info!("landed on {} instead of results; submitting search", current_url);
            let clicked = self.submit_search(session).await;
            sink.emit(NavigationEvent::SearchSubmitted { clicked });
        }

        self.settle(session).await;
        sink.emit(NavigationEvent::Settled);
        Ok(())
    }

    async fn submit_search(&self, session: &L::Session) -> bool {
        let found = match session
            .wait_for(&self.search_submit, self.settings.submit_wait)
            .await
        {
            Ok(found) => found,
            Err(err) => {
                scrape_warn!("search submit lookup failed: {}", err);
                false
            }
        };
        if !found {
            scrape_warn!(
                "no search submit control within {:?}; continuing with current page",
                self.settings.submit_wait
            );
            return false;
        }

        match session
            .human_click(&self.search_submit, self.settings.click)
            .await
        {
            Ok(()) => {
                tokio::time::sleep(self.settings.after_click_delay).await;
                true
            }
            Err(err) => {
                scrape_warn!("search submit click failed: {}; continuing", err);
                false
            }
        }
    }

    async fn settle(&self, session: &L::Session) {
        let script = scroll_script(self.settings.scroll_offset);
        if let Err(err) = session.evaluate(&script).await {
            scrape_warn!("scroll to load rows failed: {}", err);
        }
        tokio::time::sleep(self.settings.settle_delay).await;
    }
}

fn scroll_script(offset: u32) -> String {
    format!("window.scrollBy(0, {offset});")
}
