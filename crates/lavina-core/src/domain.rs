//! Transient value types produced while processing one bulletin document.

use lavina_store::ProviderId;
use serde::{Deserialize, Serialize};

use crate::error::RunError;

/// Structural kind of a provider's bulletin document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Tabular HTML where the level is encoded in an icon filename.
    IconHtml,
    /// Text layer of a PDF bulletin, pages separated by form-feed.
    PdfText,
    /// CAAML-style XML with explicit region and dangerRating nodes.
    CaamlXml,
}

/// A raw bulletin document as delivered by the `SourceFetcher`.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, format: DocumentFormat) -> Self {
        RawDocument {
            bytes: bytes.into(),
            format,
        }
    }

    /// The document's text. All supported formats carry their content as
    /// UTF-8; anything else is malformed.
    pub fn text(&self) -> Result<&str, RunError> {
        std::str::from_utf8(&self.bytes).map_err(|e| RunError::MalformedDocument {
            reason: format!("document is not valid UTF-8: {e}"),
        })
    }
}

/// One `(zone label, level tokens)` pair as found in a document section,
/// before any zone or vocabulary resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtraction {
    /// Zone label exactly as the document spells it.
    pub zone_label: String,
    /// Level tokens in document order. More than one occurs when a zone
    /// straddles two risk levels; reduced by maximum downstream.
    pub level_tokens: Vec<String>,
    /// Provider this extraction came from.
    pub provider: ProviderId,
}

impl RawExtraction {
    pub fn new(
        zone_label: impl Into<String>,
        level_tokens: Vec<String>,
        provider: ProviderId,
    ) -> Self {
        RawExtraction {
            zone_label: zone_label.into(),
            level_tokens,
            provider,
        }
    }
}
