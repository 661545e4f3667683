use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use futures_util::StreamExt;
use rand::Rng;
use scrape_logging::{scrape_debug, scrape_warn};
use tokio::task::JoinHandle;

use crate::{BrowserError, ClickOptions, PageSession, SessionLauncher};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const IDLE_POLL: Duration = Duration::from_millis(250);
/// How long the resource count must hold still on a complete document.
const NETWORK_IDLE: Duration = Duration::from_secs(1);
const ACTIVITY_PROBE: &str = "({ ready: document.readyState === 'complete', \
     resources: performance.getEntriesByType('resource').length })";

#[derive(Debug, Clone, Default)]
pub struct ChromiumSettings {
    /// Browser binary to run instead of the auto-detected one.
    pub executable: Option<PathBuf>,
    /// Show the browser window.
    pub headed: bool,
}

#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: ChromiumSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: ChromiumSettings) -> Self {
        Self { settings }
    }

    fn build_config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1366, 900)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }
        if self.settings.headed {
            builder = builder.with_head();
        }
        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait::async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession, BrowserError> {
        let config = self.build_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| BrowserError::Launch(err.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    scrape_debug!("browser handler event error: {}", err);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| BrowserError::Launch(err.to_string()))?;

        Ok(ChromiumSession {
            browser: Some(browser),
            page,
            handler_task,
            pointer: Mutex::new(Point { x: 0.0, y: 0.0 }),
        })
    }
}

/// One browser process with a single tab.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    pointer: Mutex<Point>,
}

impl ChromiumSession {
    async fn first_element(&self, selector: &str) -> Result<Element, BrowserError> {
        self.page
            .find_elements(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Polls until the document is complete and no new resources have been
    /// requested for [`NETWORK_IDLE`]. Unbounded; callers wrap it in a timeout.
    async fn wait_for_network_idle(&self) -> Result<(), BrowserError> {
        let mut tracker = IdleTracker::new(NETWORK_IDLE);
        loop {
            let value: serde_json::Value = self
                .page
                .evaluate(ACTIVITY_PROBE)
                .await?
                .into_value()
                .map_err(|err| BrowserError::Protocol(err.to_string()))?;
            let activity = PageActivity::from_value(&value);
            if tracker.observe(activity, IDLE_POLL) {
                scrape_debug!("network idle with {} resource(s)", activity.resources);
                return Ok(());
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    }

    fn pointer(&self) -> Point {
        let guard = self.pointer.lock().unwrap_or_else(|p| p.into_inner());
        Point {
            x: guard.x,
            y: guard.y,
        }
    }

    fn set_pointer(&self, point: &Point) {
        let mut guard = self.pointer.lock().unwrap_or_else(|p| p.into_inner());
        guard.x = point.x;
        guard.y = point.y;
    }

    async fn click_element(&self, selector: &str, padding: f64) -> Result<(), BrowserError> {
        let element = self.first_element(selector).await?;
        element.scroll_into_view().await?;
        let bounds = element.bounding_box().await?;
        let (target, path) = plan_pointer_path(
            self.pointer(),
            (bounds.x, bounds.y, bounds.width, bounds.height),
            padding,
        );

        for (step, delay) in path {
            self.page.move_mouse(step).await?;
            tokio::time::sleep(delay).await;
        }
        self.page.click(clone_point(&target)).await?;
        self.set_pointer(&target);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageActivity {
    ready: bool,
    resources: u64,
}

impl PageActivity {
    fn from_value(value: &serde_json::Value) -> Self {
        Self {
            ready: value
                .get("ready")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            resources: value
                .get("resources")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        }
    }
}

/// Network-quiescence heuristic: idle once the document is complete and the
/// resource-timing count has not moved for `needed`.
#[derive(Debug)]
struct IdleTracker {
    needed: Duration,
    quiet_for: Duration,
    last_resources: Option<u64>,
}

impl IdleTracker {
    fn new(needed: Duration) -> Self {
        Self {
            needed,
            quiet_for: Duration::ZERO,
            last_resources: None,
        }
    }

    /// Records one sample taken `step` after the previous one.
    fn observe(&mut self, activity: PageActivity, step: Duration) -> bool {
        let steady = activity.ready && self.last_resources == Some(activity.resources);
        self.last_resources = Some(activity.resources);
        if steady {
            self.quiet_for += step;
        } else {
            self.quiet_for = Duration::ZERO;
        }
        self.quiet_for >= self.needed
    }
}

fn clone_point(point: &Point) -> Point {
    Point {
        x: point.x,
        y: point.y,
    }
}

/// Picks a hit point inside the box shrunk by `padding` percent per edge and a
/// jittered path towards it, with a pause after each step.
fn plan_pointer_path(
    from: Point,
    (x, y, width, height): (f64, f64, f64, f64),
    padding: f64,
) -> (Point, Vec<(Point, Duration)>) {
    let mut rng = rand::rng();
    let inset = (padding.clamp(0.0, 49.0)) / 100.0;
    let pick = |rng: &mut rand::rngs::ThreadRng, origin: f64, extent: f64| {
        let low = origin + extent * inset;
        let high = origin + extent * (1.0 - inset);
        if high > low {
            rng.random_range(low..high)
        } else {
            origin + extent / 2.0
        }
    };
    let target = Point {
        x: pick(&mut rng, x, width),
        y: pick(&mut rng, y, height),
    };

    let steps: u32 = rng.random_range(8..16);
    let path = (1..=steps)
        .map(|i| {
            let t = f64::from(i) / f64::from(steps);
            let ease = t * t * (3.0 - 2.0 * t);
            let jitter = if i == steps { 0.0 } else { 3.0 * (1.0 - t) };
            let point = Point {
                x: from.x + (target.x - from.x) * ease + rng.random_range(-jitter..=jitter),
                y: from.y + (target.y - from.y) * ease + rng.random_range(-jitter..=jitter),
            };
            (point, Duration::from_millis(rng.random_range(8..25)))
        })
        .collect();
    (target, path)
}

#[async_trait::async_trait]
impl PageSession for ChromiumSession {
    type Element = Element;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            self.wait_for_network_idle().await
        };
        tokio::time::timeout(timeout, load)
            .await
            .map_err(|_| BrowserError::Timeout {
                action: "waiting for network idle",
                after: timeout,
            })?
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn evaluate(&self, script: &str) -> Result<(), BrowserError> {
        self.page.evaluate(script).await?;
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn text(&self, element: &Element) -> Result<String, BrowserError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !self.page.find_elements(selector).await?.is_empty() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn human_click(
        &self,
        selector: &str,
        options: ClickOptions,
    ) -> Result<(), BrowserError> {
        tokio::time::timeout(options.wait, self.click_element(selector, options.padding))
            .await
            .map_err(|_| BrowserError::Timeout {
                action: "clicking",
                after: options.wait,
            })?
    }

    async fn close(mut self) -> Result<(), BrowserError> {
        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser.close().await.map(|_| ());
                if let Err(err) = browser.wait().await {
                    scrape_warn!("browser process did not exit cleanly: {}", err);
                }
                closed.map_err(BrowserError::from)
            }
            None => Ok(()),
        };
        self.handler_task.abort();
        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ready: bool, resources: u64) -> PageActivity {
        PageActivity { ready, resources }
    }

    #[test]
    fn steady_complete_page_goes_idle() {
        let mut tracker = IdleTracker::new(Duration::from_millis(1000));
        let results: Vec<bool> = (0..5)
            .map(|_| tracker.observe(sample(true, 12), Duration::from_millis(250)))
            .collect();
        assert_eq!(results, vec![false, false, false, false, true]);
    }

    #[test]
    fn new_requests_restart_the_quiet_period() {
        let mut tracker = IdleTracker::new(Duration::from_millis(500));
        let step = Duration::from_millis(250);
        assert!(!tracker.observe(sample(true, 10), step));
        assert!(!tracker.observe(sample(true, 10), step));
        assert!(!tracker.observe(sample(true, 14), step));
        assert!(!tracker.observe(sample(true, 14), step));
        assert!(tracker.observe(sample(true, 14), step));
    }

    #[test]
    fn loading_document_is_never_idle() {
        let mut tracker = IdleTracker::new(Duration::from_millis(250));
        for _ in 0..10 {
            assert!(!tracker.observe(sample(false, 3), Duration::from_millis(250)));
        }
    }

    #[test]
    fn activity_sample_tolerates_missing_fields() {
        let value = serde_json::json!({ "ready": true, "resources": 7 });
        assert_eq!(PageActivity::from_value(&value), sample(true, 7));
        assert_eq!(
            PageActivity::from_value(&serde_json::Value::Null),
            sample(false, 0)
        );
    }

    #[test]
    fn pointer_path_ends_inside_padded_box() {
        for _ in 0..50 {
            let (target, path) =
                plan_pointer_path(Point { x: 0.0, y: 0.0 }, (100.0, 200.0, 80.0, 40.0), 10.0);
            assert!(target.x >= 108.0 && target.x <= 172.0);
            assert!(target.y >= 204.0 && target.y <= 236.0);
            let last = &path.last().unwrap().0;
            assert!((last.x - target.x).abs() < 1e-9);
            assert!((last.y - target.y).abs() < 1e-9);
        }
    }
}
