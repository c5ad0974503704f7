//! PDF text-layout extraction.
//!
//! The document arrives as its extracted text layer: an ordered sequence of
//! lines, pages separated by form-feed. A zone is recognized when a line's
//! whitespace-normalized text exactly matches a configured zone label; the
//! following lines are searched for a known level token. The search window
//! is bounded by the next zone label and the end of the page, so levels
//! never bleed across zones or pages.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::RawExtraction;
use crate::error::RunError;
use crate::provider::ProviderConfig;
use crate::registry::normalize_label;
use crate::vocab::LevelVocabulary;

const PAGE_SEPARATOR: char = '\u{c}';

pub(super) fn extract(
    text: &str,
    config: &ProviderConfig,
    vocab: &LevelVocabulary,
) -> Result<Vec<RawExtraction>, RunError> {
    if config.pdf_zone_labels.is_empty() {
        return Err(RunError::InvalidConfig {
            reason: format!("provider '{}' has no PDF zone labels", config.id),
        });
    }

    // normalized label → label as printed
    let labels: HashMap<String, &str> = config
        .pdf_zone_labels
        .iter()
        .map(|l| (normalize_label(l), l.as_str()))
        .collect();

    let mut extractions = Vec::new();
    for page in text.split(PAGE_SEPARATOR) {
        let lines: Vec<&str> = page.lines().collect();
        let mut i = 0;
        while i < lines.len() {
            let Some(label) = labels.get(&normalize_label(lines[i])) else {
                i += 1;
                continue;
            };

            // Window: following lines up to the next zone label or page end.
            let mut tokens = Vec::new();
            let mut j = i + 1;
            while j < lines.len() && !labels.contains_key(&normalize_label(lines[j])) {
                tokens.extend(vocab.tokens_in_line(lines[j]));
                j += 1;
            }

            if tokens.is_empty() {
                warn!(provider = %config.id, zone = %label,
                      "no danger level token near zone label, skipping");
            } else {
                extractions.push(RawExtraction::new(
                    label.to_string(),
                    tokens,
                    config.id.clone(),
                ));
            }
            i = j;
        }
    }
    Ok(extractions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderCatalog;
    use lavina_store::ProviderId;

    fn setup(provider: &str) -> (ProviderConfig, LevelVocabulary) {
        let config = ProviderCatalog::builtin()
            .provider(&ProviderId::new(provider))
            .unwrap()
            .clone();
        let vocab = LevelVocabulary::from_config(&config).unwrap();
        (config, vocab)
    }

    #[test]
    fn zone_followed_by_level_line() {
        let (config, vocab) = setup("aragon-navarra");
        let text = "Sobrarbe\nNotable\n";
        let extractions = extract(text, &config, &vocab).unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].zone_label, "Sobrarbe");
        assert_eq!(extractions[0].level_tokens, ["Notable"]);
    }

    #[test]
    fn window_stops_at_next_zone_label() {
        let (config, vocab) = setup("aragon-navarra");
        let text = "Navarra\nLimitado\nJacetania\nFuerte\n";
        let extractions = extract(text, &config, &vocab).unwrap();
        assert_eq!(extractions.len(), 2);
        assert_eq!(extractions[0].zone_label, "Navarra");
        assert_eq!(extractions[0].level_tokens, ["Limitado"]);
        assert_eq!(extractions[1].zone_label, "Jacetania");
        assert_eq!(extractions[1].level_tokens, ["Fuerte"]);
    }

    #[test]
    fn window_stops_at_page_boundary() {
        let (config, vocab) = setup("aragon-navarra");
        // Level for Ribagorza sits on the next page: out of the window.
        let text = "Ribagorza\nsin datos\u{c}Notable\n";
        let extractions = extract(text, &config, &vocab).unwrap();
        assert!(extractions.is_empty());
    }

    #[test]
    fn zone_label_match_normalizes_whitespace() {
        let (config, vocab) = setup("icgc");
        let text = "Perafita  -   Puigpedrós\nPerill MARCAT en general\n";
        let extractions = extract(text, &config, &vocab).unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].zone_label, "Perafita - Puigpedrós");
        assert_eq!(extractions[0].level_tokens, ["MARCAT"]);
    }

    #[test]
    fn collects_multiple_tokens_in_window() {
        let (config, vocab) = setup("icgc");
        let text = "Pallaresa\nMODERAT al matí\npujant a MARCAT\n";
        let extractions = extract(text, &config, &vocab).unwrap();
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].level_tokens, ["MODERAT", "MARCAT"]);
    }

    #[test]
    fn unrelated_pages_extract_nothing() {
        let (config, vocab) = setup("icgc");
        let text = "Butlletí de perill d'allaus\nInformació general\n";
        assert!(extract(text, &config, &vocab).unwrap().is_empty());
    }
}
