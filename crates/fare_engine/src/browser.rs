use std::time::Duration;

use crate::BrowserError;

/// Pointer-click tuning for [`PageSession::human_click`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOptions {
    /// Budget for the whole move-and-click gesture.
    pub wait: Duration,
    /// Percent of the element box kept clear on each edge when picking the hit point.
    pub padding: f64,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(10),
            padding: 10.0,
        }
    }
}

/// The page-query capability a live browser tab (or a stand-in) provides.
#[async_trait::async_trait]
pub trait PageSession: Send + Sync + Sized {
    type Element: Send + Sync;

    /// Navigate and wait for the network to go quiet, failing after `timeout`.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Run `script` in page context, discarding its value.
    async fn evaluate(&self, script: &str) -> Result<(), BrowserError>;

    /// Zero or more elements matching `selector`; no match is not an error.
    async fn query(&self, selector: &str) -> Result<Vec<Self::Element>, BrowserError>;

    async fn text(&self, element: &Self::Element) -> Result<String, BrowserError>;

    /// Whether `selector` matched something before `timeout` ran out.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, BrowserError>;

    async fn human_click(&self, selector: &str, options: ClickOptions)
        -> Result<(), BrowserError>;

    async fn close(self) -> Result<(), BrowserError>;
}

#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: PageSession;

    async fn launch(&self) -> Result<Self::Session, BrowserError>;
}
