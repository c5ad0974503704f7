//! Format-specific document extraction.
//!
//! One `DocumentParser` capability with a strategy per document kind, so
//! error handling and fixtures stay uniform across providers. Each strategy
//! produces raw `(zone label, level tokens)` pairs; zone and vocabulary
//! resolution happen downstream in the normalizer.
//!
//! Partial-result policy: a section that cannot be read produces a warning
//! and is skipped; the remaining sections still extract.

mod caaml;
mod icon_html;
mod pdf_text;

use crate::domain::{DocumentFormat, RawDocument, RawExtraction};
use crate::error::RunError;
use crate::provider::ProviderConfig;
use crate::vocab::LevelVocabulary;

/// Extraction strategy for one document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentParser {
    IconTable,
    PdfText,
    Caaml,
}

impl DocumentParser {
    pub fn for_format(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::IconHtml => DocumentParser::IconTable,
            DocumentFormat::PdfText => DocumentParser::PdfText,
            DocumentFormat::CaamlXml => DocumentParser::Caaml,
        }
    }

    /// Extract raw `(zone label, level tokens)` pairs in document order.
    pub fn extract(
        &self,
        doc: &RawDocument,
        config: &ProviderConfig,
        vocab: &LevelVocabulary,
    ) -> Result<Vec<RawExtraction>, RunError> {
        let text = doc.text()?;
        match self {
            DocumentParser::IconTable => icon_html::extract(text, config),
            DocumentParser::PdfText => pdf_text::extract(text, config, vocab),
            DocumentParser::Caaml => caaml::extract(text, config),
        }
    }
}
