//! Lavina-Core: avalanche bulletin extraction and normalization
//!
//! Turns a provider's raw bulletin document (icon-table HTML, PDF text
//! layout, or CAAML-style XML) into canonical `(zone, date, danger_level)`
//! readings and hands them to the store with at-most-once semantics.
//!
//! ## Pipeline
//!
//! `SourceFetcher` → `DocumentParser` → `PublicationDateResolver` →
//! `BulletinNormalizer` (uses `ZoneRegistry` + `LevelVocabulary`) →
//! `IngestionGate` → `BulletinStore`
//!
//! Per-extraction failures (unknown zone, unknown level token) are skipped
//! with a warning and counted in the run report; date resolution and source
//! failures abort the provider run.

pub mod dates;
pub mod domain;
mod error;
pub mod fetch;
pub mod gate;
mod markup;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod provider;
pub mod registry;
pub mod vocab;

pub use dates::PublicationDateResolver;
pub use domain::{DocumentFormat, RawDocument, RawExtraction};
pub use error::{ExtractError, RunError};
pub use fetch::{HttpSourceFetcher, SourceFetcher, StaticSourceFetcher};
pub use gate::{GateOutcome, IngestionGate};
pub use normalize::{BulletinNormalizer, NormalizeOutcome};
pub use parse::DocumentParser;
pub use pipeline::{IngestPipeline, IngestReport};
pub use provider::{DateRule, LabelRewrite, Locale, ProviderCatalog, ProviderConfig};
pub use registry::{Zone, ZoneRegistry};
pub use vocab::LevelVocabulary;
