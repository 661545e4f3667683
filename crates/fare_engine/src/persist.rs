use std::sync::Arc;
use std::time::Duration;

use fare_core::FlightRecord;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::{PersistReport, StoreError, StoreFailure};

/// The remote datastore: one insert call into a named target.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, table: &str, records: &[FlightRecord]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Project endpoint, e.g. `https://abc.supabase.co`.
    pub endpoint: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl StoreSettings {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// PostgREST-style store: `POST {endpoint}/rest/v1/{table}` with a JSON array body.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestStore {
    pub fn new(settings: StoreSettings) -> Result<Self, StoreError> {
        if settings.endpoint.trim().is_empty() || settings.api_key.trim().is_empty() {
            return Err(StoreError::Config(
                "datastore endpoint and access key are both required".to_string(),
            ));
        }
        reqwest::Url::parse(&settings.endpoint)
            .map_err(|err| StoreError::Config(format!("{}: {err}", settings.endpoint)))?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StoreError::Config(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint, table)
    }
}

#[async_trait::async_trait]
impl RecordStore for RestStore {
    async fn insert(&self, table: &str, records: &[FlightRecord]) -> Result<(), StoreError> {
        let body =
            serde_json::to_vec(records).map_err(|err| StoreError::Encode(err.to_string()))?;
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        return StoreError::Timeout;
    }
    StoreError::Network(err.to_string())
}

/// Accepts and discards everything; used for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait::async_trait]
impl RecordStore for NullStore {
    async fn insert(&self, table: &str, records: &[FlightRecord]) -> Result<(), StoreError> {
        scrape_debug!("dry run: not writing {} record(s) to {}", records.len(), table);
        Ok(())
    }
}

/// Best-effort sweep: every record gets its own insert, and a failed insert
/// never stops the ones after it.
pub struct Persister {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl Persister {
    pub fn new(store: Arc<dyn RecordStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub async fn store(&self, record: &FlightRecord) -> Result<(), StoreError> {
        self.store
            .insert(&self.table, std::slice::from_ref(record))
            .await
    }

    pub async fn store_all(&self, records: &[FlightRecord]) -> PersistReport {
        let mut report = PersistReport::default();
        for (position, record) in records.iter().enumerate() {
            report.attempted += 1;
            match self.store(record).await {
                Ok(()) => report.stored += 1,
                Err(error) => {
                    scrape_warn!(
                        "failed to store {:?} on {}: {}",
                        record.metadata.flight_numbers,
                        record.date,
                        error
                    );
                    report.failures.push(StoreFailure { position, error });
                }
            }
        }
        if !records.is_empty() {
            scrape_info!(
                "stored {}/{} record(s) in {}",
                report.stored,
                report.attempted,
                self.table
            );
        }
        report
    }
}
