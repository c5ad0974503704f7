//! Error types for the extraction pipeline.
//!
//! Two tiers, matching how failures propagate:
//! - `ExtractError`: recoverable per-extraction failures. The normalizer
//!   swallows these, logs a warning, and counts them in the run report.
//! - `RunError`: fatal to the whole provider run. Propagates to the caller;
//!   readings already durably written stay valid.

use lavina_store::{ProviderId, StoreError};
use thiserror::Error;

/// Recoverable failure for a single extraction. Skip and continue.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No configured alias matches the raw zone label.
    #[error("Unknown zone label '{label}' for provider '{provider}'")]
    UnknownZone { label: String, provider: ProviderId },

    /// The token is not in the provider's danger-level vocabulary.
    #[error("Unknown danger level token '{token}' for provider '{provider}'")]
    UnknownLevelToken { token: String, provider: ProviderId },
}

/// Fatal failure for the whole provider run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The bulletin's publication date could not be determined. Without it
    /// no reading can be attributed correctly.
    #[error("Could not resolve bulletin date: {reason}")]
    DateResolution { reason: String },

    /// The provider's document could not be fetched.
    #[error("Source unavailable for provider '{provider}': {reason}")]
    SourceUnavailable { provider: ProviderId, reason: String },

    /// The document is structurally unusable (not text, no parseable
    /// sections at all).
    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: String },

    /// Registry or provider configuration is inconsistent.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Store-level failure during ingestion.
    #[error(transparent)]
    Store(#[from] StoreError),
}
