//! Source document fetching.
//!
//! The fetch itself is a collaborator, not part of the core pipeline:
//! timeouts, retries, and browser automation live behind `SourceFetcher`.
//! The pipeline treats any fetch failure as immediately fatal to that
//! provider's run.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use lavina_store::ProviderId;
use tracing::info;

use crate::domain::RawDocument;
use crate::error::RunError;
use crate::provider::ProviderConfig;

/// Delivers the raw bulletin document for a provider and date.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, config: &ProviderConfig, date: NaiveDate)
        -> Result<RawDocument, RunError>;
}

// ---------------------------------------------------------------------------
// HttpSourceFetcher
// ---------------------------------------------------------------------------

/// Per-request timeout. Bulletin pages are small; a slow authority site
/// should fail the run, not hang it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches over HTTP using the provider's URL template.
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        HttpSourceFetcher { client }
    }
}

impl Default for HttpSourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(
        &self,
        config: &ProviderConfig,
        date: NaiveDate,
    ) -> Result<RawDocument, RunError> {
        let url = config
            .url_for(date)
            .ok_or_else(|| RunError::SourceUnavailable {
                provider: config.id.clone(),
                reason: "provider has no URL template".to_string(),
            })?;

        info!(provider = %config.id, %url, "downloading bulletin");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RunError::SourceUnavailable {
                provider: config.id.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RunError::SourceUnavailable {
                provider: config.id.clone(),
                reason: format!("bulletin not available yet ({})", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RunError::SourceUnavailable {
                provider: config.id.clone(),
                reason: e.to_string(),
            })?;
        Ok(RawDocument::new(bytes.to_vec(), config.format))
    }
}

// ---------------------------------------------------------------------------
// StaticSourceFetcher
// ---------------------------------------------------------------------------

/// Serves pre-loaded documents by provider id. For tests and for ingesting
/// an already-downloaded file.
#[derive(Default)]
pub struct StaticSourceFetcher {
    documents: HashMap<ProviderId, RawDocument>,
}

impl StaticSourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, provider: ProviderId, doc: RawDocument) -> Self {
        self.documents.insert(provider, doc);
        self
    }
}

#[async_trait]
impl SourceFetcher for StaticSourceFetcher {
    async fn fetch(
        &self,
        config: &ProviderConfig,
        _date: NaiveDate,
    ) -> Result<RawDocument, RunError> {
        self.documents
            .get(&config.id)
            .cloned()
            .ok_or_else(|| RunError::SourceUnavailable {
                provider: config.id.clone(),
                reason: "no document loaded for provider".to_string(),
            })
    }
}
