//! Provider run orchestration.
//!
//! One run is a self-contained sequence: fetch → parse → resolve date →
//! normalize → gate. Runs for different providers are independent and may
//! execute concurrently; the store's atomic upsert is the only shared
//! resource. A restarted run safely skips already-recorded zones.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use lavina_store::{BulletinStore, ProviderId};
use tracing::{info, warn};

use crate::error::RunError;
use crate::fetch::SourceFetcher;
use crate::gate::{GateOutcome, IngestionGate};
use crate::normalize::BulletinNormalizer;
use crate::parse::DocumentParser;
use crate::provider::ProviderConfig;
use crate::registry::ZoneRegistry;
use crate::vocab::LevelVocabulary;
use crate::PublicationDateResolver;

/// What one provider run did. Nothing is silently dropped: every skipped
/// or unresolved zone is accounted for here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub provider: ProviderId,
    pub bulletin_date: NaiveDate,
    pub written: usize,
    pub already_existing: usize,
    pub unresolved_zones: usize,
    pub unresolved_levels: usize,
    pub duration_ms: u64,
}

impl IngestReport {
    /// Total extractions that did not become a stored reading.
    pub fn skipped(&self) -> usize {
        self.already_existing + self.unresolved_zones + self.unresolved_levels
    }
}

/// The extraction-and-normalization pipeline for one provider catalog.
pub struct IngestPipeline {
    fetcher: Arc<dyn SourceFetcher>,
    store: Arc<dyn BulletinStore>,
    registry: ZoneRegistry,
}

impl IngestPipeline {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        store: Arc<dyn BulletinStore>,
        registry: ZoneRegistry,
    ) -> Self {
        IngestPipeline {
            fetcher,
            store,
            registry,
        }
    }

    /// Run the full pipeline for one provider.
    ///
    /// `requested_date` drives the fetch (URL templates are date-stamped);
    /// the readings are attributed to the date the document itself declares,
    /// unless `date_override` pins it explicitly.
    pub async fn run(
        &self,
        config: &ProviderConfig,
        requested_date: NaiveDate,
        date_override: Option<NaiveDate>,
    ) -> Result<IngestReport, RunError> {
        let start = Instant::now();
        info!(provider = %config.id, date = %requested_date, "starting provider run");

        let doc = self.fetcher.fetch(config, requested_date).await?;

        let bulletin_date = match date_override {
            Some(date) => date,
            None => PublicationDateResolver::resolve(&doc, config)?,
        };
        info!(provider = %config.id, %bulletin_date, "bulletin date resolved");

        let vocab = LevelVocabulary::from_config(config)?;
        let parser = DocumentParser::for_format(doc.format);
        let extractions = parser.extract(&doc, config, &vocab)?;
        if extractions.is_empty() {
            warn!(provider = %config.id, "document yielded no extractions");
        }

        let normalizer = BulletinNormalizer::new(&self.registry, &vocab, config);
        let outcome = normalizer.normalize(extractions, bulletin_date);

        let gate = IngestionGate::new(self.store.clone());
        let mut written = 0;
        let mut already_existing = 0;
        for reading in &outcome.readings {
            match gate.accept(reading).await? {
                GateOutcome::Written => written += 1,
                GateOutcome::SkippedExisting => already_existing += 1,
            }
        }

        let report = IngestReport {
            provider: config.id.clone(),
            bulletin_date,
            written,
            already_existing,
            unresolved_zones: outcome.skipped_unknown_zone,
            unresolved_levels: outcome.skipped_unknown_level,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(provider = %report.provider, written = report.written,
              already_existing = report.already_existing,
              unresolved_zones = report.unresolved_zones,
              unresolved_levels = report.unresolved_levels,
              "provider run complete");
        Ok(report)
    }
}
