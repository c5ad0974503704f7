//! Per-provider danger-level vocabulary.
//!
//! Every provider encodes the same 1..=5 scale in its own words or codes:
//! Spanish ("Notable"), Catalan ("MARCAT"), CAAML rating words
//! ("considerable"), or numeric icon-filename codes ("4"). Each provider
//! owns an independent token table.

use std::collections::HashMap;

use lavina_store::{DangerLevel, ProviderId};

use crate::error::{ExtractError, RunError};
use crate::provider::ProviderConfig;
use crate::registry::normalize_label;

/// Token table for one provider.
#[derive(Debug, Clone)]
pub struct LevelVocabulary {
    provider: ProviderId,
    /// normalized token → level
    index: HashMap<String, DangerLevel>,
    /// (display token, normalized token), longest first for line scanning
    tokens: Vec<(String, String)>,
}

impl LevelVocabulary {
    /// Build the vocabulary from provider configuration, validating that
    /// every mapped value is on the 1..=5 scale.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, RunError> {
        let mut index = HashMap::new();
        let mut tokens = Vec::new();
        for (token, value) in &config.vocabulary {
            let level = DangerLevel::new(*value).map_err(|_| RunError::InvalidConfig {
                reason: format!(
                    "provider '{}': token '{token}' maps to invalid level {value}",
                    config.id
                ),
            })?;
            let key = normalize_label(token);
            if key.is_empty() {
                return Err(RunError::InvalidConfig {
                    reason: format!("provider '{}': empty vocabulary token", config.id),
                });
            }
            index.insert(key.clone(), level);
            tokens.push((token.clone(), key));
        }
        // Longest first so "MOLT FORT" is preferred over "FORT" when scanning.
        tokens.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.1.cmp(&b.1)));
        Ok(LevelVocabulary {
            provider: config.id.clone(),
            index,
            tokens,
        })
    }

    /// Map a token to its danger level. Case-insensitive, whitespace
    /// normalized, and tolerant of a trailing numeric annotation
    /// ("Fuerte (4)" resolves like "Fuerte").
    pub fn to_level(&self, token: &str) -> Result<DangerLevel, ExtractError> {
        let key = normalize_label(token);
        if let Some(level) = self.index.get(&key) {
            return Ok(*level);
        }
        if let Some(stripped) = strip_numeric_annotation(&key) {
            if let Some(level) = self.index.get(stripped) {
                return Ok(*level);
            }
        }
        Err(ExtractError::UnknownLevelToken {
            token: token.to_string(),
            provider: self.provider.clone(),
        })
    }

    /// All vocabulary tokens appearing as whole words in a line of text,
    /// in table order (longest first). Used by the PDF scanner to spot
    /// level words. Word-exact: "confort" never matches "FORT", and words
    /// claimed by "MOLT FORT" are not matched again as "FORT".
    pub fn tokens_in_line(&self, line: &str) -> Vec<String> {
        let haystack = normalize_label(line);
        let words: Vec<&str> = haystack
            .split(' ')
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut claimed = vec![false; words.len()];
        let mut found = Vec::new();
        for (display, key) in &self.tokens {
            let needle: Vec<&str> = key.split(' ').collect();
            let mut i = 0;
            while i + needle.len() <= words.len() {
                let span = i..i + needle.len();
                if !claimed[span.clone()].iter().any(|c| *c)
                    && words[span.clone()] == needle[..]
                {
                    claimed[span].iter_mut().for_each(|c| *c = true);
                    found.push(display.clone());
                    i += needle.len();
                } else {
                    i += 1;
                }
            }
        }
        found
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }
}

/// Drop a trailing numeric annotation like " (4)" or " 4", keeping the
/// token itself. Returns `None` when nothing would remain.
fn strip_numeric_annotation(key: &str) -> Option<&str> {
    let trimmed = key.trim_end();
    let trimmed = trimmed.strip_suffix(')').unwrap_or(trimmed);
    let without_digits = trimmed.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == trimmed.len() {
        return None;
    }
    let cleaned = without_digits
        .trim_end_matches('(')
        .trim_end_matches([' ', '-']);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderCatalog;

    fn vocab(provider: &str) -> LevelVocabulary {
        let catalog = ProviderCatalog::builtin();
        let config = catalog
            .provider(&ProviderId::new(provider))
            .unwrap()
            .clone();
        LevelVocabulary::from_config(&config).unwrap()
    }

    #[test]
    fn resolves_spanish_tokens_case_insensitively() {
        let v = vocab("aragon-navarra");
        assert_eq!(v.to_level("Notable").unwrap().get(), 3);
        assert_eq!(v.to_level("NOTABLE").unwrap().get(), 3);
        assert_eq!(v.to_level("muy  fuerte").unwrap().get(), 5);
    }

    #[test]
    fn resolves_numeric_codes() {
        let v = vocab("andorra");
        assert_eq!(v.to_level("4").unwrap().get(), 4);
        assert!(v.to_level("7").is_err());
    }

    #[test]
    fn tolerates_trailing_numeric_annotation() {
        let v = vocab("icgc");
        assert_eq!(v.to_level("FORT (4)").unwrap().get(), 4);
        assert_eq!(v.to_level("MARCAT 3").unwrap().get(), 3);
    }

    #[test]
    fn unknown_token_is_recoverable_error() {
        let v = vocab("icgc");
        let err = v.to_level("EXTREM").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownLevelToken { .. }));
    }

    #[test]
    fn line_scan_prefers_longest_token() {
        let v = vocab("icgc");
        // The words of "MOLT FORT" must not be re-matched as a bare "FORT".
        let tokens = v.tokens_in_line("Perill MOLT FORT a la tarda");
        assert_eq!(tokens, ["MOLT FORT"]);
    }

    #[test]
    fn line_scan_finds_nothing_in_plain_text() {
        let v = vocab("aragon-navarra");
        assert!(v.tokens_in_line("Sin cambios significativos").is_empty());
    }

    #[test]
    fn line_scan_matches_whole_words_only() {
        let v = vocab("icgc");
        // "confort" contains "fort" but is not a danger level
        assert!(v.tokens_in_line("Situació de confort a les pistes").is_empty());
        assert_eq!(v.tokens_in_line("Perill FORT al vessant nord"), ["FORT"]);
    }

    #[test]
    fn line_scan_ignores_adjacent_punctuation() {
        let v = vocab("icgc");
        assert_eq!(v.tokens_in_line("perill: MARCAT."), ["MARCAT"]);
    }
}
