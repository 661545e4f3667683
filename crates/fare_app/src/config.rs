//! Environment and settings-file configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fare_engine::{ClickOptions, GridLayout, NavigationSettings, StoreSettings};
use serde::Deserialize;
use thiserror::Error;

pub const STORE_URL_VAR: &str = "SUPABASE_URL";
pub const STORE_KEY_VAR: &str = "SUPABASE_KEY";
pub const CHROME_PATH_VAR: &str = "CHROME_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("end date {until} is before start date {date}")]
    EmptyRange {
        date: chrono::NaiveDate,
        until: chrono::NaiveDate,
    },
}

/// Optional overrides read from a RON file; every field may be omitted.
///
/// ```ron
/// (
///     base_url: "https://www.united.com/en/us/fsr/choose-flights",
///     table: "flights",
///     load_timeout_ms: 60000,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub base_url: String,
    pub table: String,
    pub load_timeout_ms: u64,
    pub submit_wait_ms: u64,
    pub click_timeout_ms: u64,
    pub click_padding: f64,
    pub after_click_delay_ms: u64,
    pub scroll_offset: u32,
    pub settle_delay_ms: u64,
    pub store_timeout_ms: u64,
}

impl Default for SettingsFile {
    fn default() -> Self {
        let nav = NavigationSettings::default();
        Self {
            base_url: GridLayout::default().base_url().to_string(),
            table: "flights".to_string(),
            load_timeout_ms: millis(nav.load_timeout),
            submit_wait_ms: millis(nav.submit_wait),
            click_timeout_ms: millis(nav.click.wait),
            click_padding: nav.click.padding,
            after_click_delay_ms: millis(nav.after_click_delay),
            scroll_offset: nav.scroll_offset,
            settle_delay_ms: millis(nav.settle_delay),
            store_timeout_ms: 30_000,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn navigation(&self) -> NavigationSettings {
        NavigationSettings {
            load_timeout: Duration::from_millis(self.load_timeout_ms),
            submit_wait: Duration::from_millis(self.submit_wait_ms),
            click: ClickOptions {
                wait: Duration::from_millis(self.click_timeout_ms),
                padding: self.click_padding,
            },
            after_click_delay: Duration::from_millis(self.after_click_delay_ms),
            scroll_offset: self.scroll_offset,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.base_url.clone())
    }

    /// Datastore settings from `SUPABASE_URL` and `SUPABASE_KEY`.
    pub fn store<F>(&self, lookup: F) -> Result<StoreSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = required(&lookup, STORE_URL_VAR)?;
        let key = required(&lookup, STORE_KEY_VAR)?;
        let mut settings = StoreSettings::new(endpoint, key);
        settings.request_timeout = Duration::from_millis(self.store_timeout_ms);
        Ok(settings)
    }
}

pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub fn chrome_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CHROME_PATH_VAR)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_navigation_defaults() {
        let settings = SettingsFile::default();
        assert_eq!(settings.navigation(), NavigationSettings::default());
        assert_eq!(settings.table, "flights");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrape.ron");
        std::fs::write(
            &path,
            r#"(base_url: "https://fly.example.com/fsr", settle_delay_ms: 500)"#,
        )
        .unwrap();

        let settings = SettingsFile::load(&path).unwrap();
        assert_eq!(settings.base_url, "https://fly.example.com/fsr");
        assert_eq!(settings.navigation().settle_delay, Duration::from_millis(500));
        assert_eq!(
            settings.navigation().load_timeout,
            NavigationSettings::default().load_timeout
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "(table: )").unwrap();
        assert!(matches!(
            SettingsFile::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn store_requires_both_variables() {
        let settings = SettingsFile::default();
        let err = settings
            .store(env(&[(STORE_URL_VAR, "https://abc.supabase.co")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(STORE_KEY_VAR)));

        let err = settings
            .store(env(&[(STORE_URL_VAR, " "), (STORE_KEY_VAR, "k")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(STORE_URL_VAR)));

        let store = settings
            .store(env(&[
                (STORE_URL_VAR, "https://abc.supabase.co"),
                (STORE_KEY_VAR, "service-key"),
            ]))
            .unwrap();
        assert_eq!(store.endpoint, "https://abc.supabase.co");
        assert_eq!(store.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_chrome_path_is_ignored() {
        assert_eq!(chrome_path(env(&[(CHROME_PATH_VAR, "")])), None);
        assert_eq!(
            chrome_path(env(&[(CHROME_PATH_VAR, "/opt/chrome")])),
            Some(PathBuf::from("/opt/chrome"))
        );
    }
}
