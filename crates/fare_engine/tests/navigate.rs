use std::sync::Once;
use std::time::Duration;

use fare_engine::{
    BrowserError, CollectingSink, FixtureLauncher, FixturePage, NavigationEvent,
    NavigationSettings, Navigator, PageSession, ScrapeError,
};
use pretty_assertions::assert_eq;

const RESULTS: &str = include_str!("fixtures/results.html");
const SEARCH_FORM: &str = include_str!("fixtures/search_form.html");
const RESULTS_URL: &str = "https://fly.example.com/fsr/choose-flights?f=SFO&t=JFK&d=2024-05-01";
const FORM_URL: &str = "https://fly.example.com/en/us/book-flight";
const SUBMIT: &str = r#"form[class*="bookFlightForm"] button[type="submit"]"#;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

fn quick() -> NavigationSettings {
    NavigationSettings {
        load_timeout: Duration::from_secs(5),
        submit_wait: Duration::ZERO,
        after_click_delay: Duration::ZERO,
        settle_delay: Duration::ZERO,
        ..NavigationSettings::default()
    }
}

fn navigator(page: &FixturePage) -> Navigator<FixtureLauncher> {
    Navigator::new(FixtureLauncher::new(page.clone()), quick(), SUBMIT)
}

#[tokio::test]
async fn direct_load_settles_without_clicking() {
    init_logging();
    let page = FixturePage::new(RESULTS);
    let probe = page.probe();
    let sink = CollectingSink::default();

    let session = navigator(&page)
        .open(RESULTS_URL, &sink)
        .await
        .expect("results page opens");

    assert_eq!(
        sink.into_events(),
        vec![
            NavigationEvent::Loaded {
                current_url: RESULTS_URL.to_string()
            },
            NavigationEvent::Settled,
        ]
    );
    assert_eq!(probe.visited(), vec![RESULTS_URL.to_string()]);
    assert!(probe.clicks().is_empty());
    assert_eq!(probe.scripts(), vec!["window.scrollBy(0, 1000);".to_string()]);
    assert_eq!(probe.close_count(), 0);
    session.close().await.unwrap();
}

#[tokio::test]
async fn redirect_to_search_form_submits_it() {
    init_logging();
    let page = FixturePage::new(SEARCH_FORM)
        .landing_at(FORM_URL)
        .after_search_submit(RESULTS);
    let probe = page.probe();
    let sink = CollectingSink::default();

    let session = navigator(&page)
        .open(RESULTS_URL, &sink)
        .await
        .expect("results page opens");

    assert_eq!(
        sink.into_events(),
        vec![
            NavigationEvent::Loaded {
                current_url: FORM_URL.to_string()
            },
            NavigationEvent::SearchSubmitted { clicked: true },
            NavigationEvent::Settled,
        ]
    );
    assert_eq!(probe.clicks(), vec![SUBMIT.to_string()]);
    let rows = session.query(r#"div[class*="flightRow"]"#).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn redirect_without_submit_control_still_settles() {
    init_logging();
    let page = FixturePage::new("<html><body><p>Maintenance</p></body></html>")
        .landing_at(FORM_URL);
    let probe = page.probe();
    let sink = CollectingSink::default();

    navigator(&page)
        .open(RESULTS_URL, &sink)
        .await
        .expect("a missing control is not fatal");

    let events = sink.into_events();
    assert!(events.contains(&NavigationEvent::SearchSubmitted { clicked: false }));
    assert_eq!(events.last(), Some(&NavigationEvent::Settled));
    assert!(probe.clicks().is_empty());
}

#[tokio::test]
async fn load_timeout_is_fatal_and_closes_session() {
    init_logging();
    let page = FixturePage::new(RESULTS).failing_load();
    let probe = page.probe();
    let sink = CollectingSink::default();

    let err = navigator(&page)
        .open(RESULTS_URL, &sink)
        .await
        .err()
        .expect("load fails");

    assert!(matches!(
        err,
        ScrapeError::Navigation(BrowserError::Timeout { .. })
    ));
    assert!(sink.into_events().is_empty());
    assert_eq!(probe.close_count(), 1);
}

#[tokio::test]
async fn launch_failure_is_setup_error() {
    init_logging();
    let navigator = Navigator::new(FixtureLauncher::unavailable(), quick(), SUBMIT);
    let sink = CollectingSink::default();

    let err = navigator.open(RESULTS_URL, &sink).await.err();
    assert!(matches!(
        err,
        Some(ScrapeError::Setup(BrowserError::Launch(_)))
    ));
}
