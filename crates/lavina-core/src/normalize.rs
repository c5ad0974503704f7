//! Normalization of raw extractions into canonical readings.
//!
//! Resolution order per extraction: zone (registry), then level tokens
//! (vocabulary), then reduction of multiple tokens by maximum. Recoverable
//! failures are swallowed here and surfaced as warnings plus counters;
//! nothing is silently dropped.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use lavina_store::{BulletinReading, DangerLevel, ZoneId};
use tracing::warn;

use crate::domain::RawExtraction;
use crate::provider::ProviderConfig;
use crate::registry::ZoneRegistry;
use crate::vocab::LevelVocabulary;

/// Readings plus diagnostics for one normalization call.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub readings: Vec<BulletinReading>,
    /// Extractions dropped because no alias matched the zone label.
    pub skipped_unknown_zone: usize,
    /// Extractions dropped because no token resolved to a level.
    pub skipped_unknown_level: usize,
    /// Same-zone extractions overwritten by a later one (last wins).
    pub duplicate_overwrites: usize,
}

/// Orchestrates registry and vocabulary resolution for one provider run.
pub struct BulletinNormalizer<'a> {
    registry: &'a ZoneRegistry,
    vocab: &'a LevelVocabulary,
    config: &'a ProviderConfig,
}

impl<'a> BulletinNormalizer<'a> {
    pub fn new(
        registry: &'a ZoneRegistry,
        vocab: &'a LevelVocabulary,
        config: &'a ProviderConfig,
    ) -> Self {
        BulletinNormalizer {
            registry,
            vocab,
            config,
        }
    }

    /// Produce one reading per successfully resolved extraction.
    ///
    /// The output never contains two disagreeing readings for one zone:
    /// when a provider renders the same zone in two map sectors, the later
    /// extraction overwrites the earlier one with a warning.
    pub fn normalize(
        &self,
        extractions: Vec<RawExtraction>,
        bulletin_date: NaiveDate,
    ) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();
        let mut by_zone: HashMap<ZoneId, usize> = HashMap::new();

        for extraction in extractions {
            let zone_id = match self.registry.resolve(&extraction.zone_label, self.config) {
                Ok(id) => id,
                Err(err) => {
                    warn!(provider = %self.config.id, error = %err, "skipping extraction");
                    outcome.skipped_unknown_zone += 1;
                    continue;
                }
            };

            let Some(level) = self.reduce_tokens(&extraction) else {
                outcome.skipped_unknown_level += 1;
                continue;
            };

            let reading = BulletinReading {
                zone_id: zone_id.clone(),
                bulletin_date,
                danger_level: level,
                provider: self.config.id.clone(),
                extracted_at: Utc::now(),
            };

            match by_zone.get(&zone_id) {
                Some(&index) => {
                    warn!(provider = %self.config.id, zone = %zone_id,
                          previous = %outcome.readings[index].danger_level,
                          new = %level,
                          "zone extracted twice, last extraction wins");
                    outcome.readings[index] = reading;
                    outcome.duplicate_overwrites += 1;
                }
                None => {
                    by_zone.insert(zone_id, outcome.readings.len());
                    outcome.readings.push(reading);
                }
            }
        }
        outcome
    }

    /// Maximum of the resolvable tokens. Unknown tokens are warned about
    /// individually; the extraction only drops when none resolve.
    fn reduce_tokens(&self, extraction: &RawExtraction) -> Option<DangerLevel> {
        let mut best: Option<DangerLevel> = None;
        for token in &extraction.level_tokens {
            match self.vocab.to_level(token) {
                Ok(level) => best = Some(best.map_or(level, |b| b.max(level))),
                Err(err) => {
                    warn!(provider = %self.config.id, zone = %extraction.zone_label,
                          error = %err, "ignoring unresolvable level token");
                }
            }
        }
        if best.is_none() {
            warn!(provider = %self.config.id, zone = %extraction.zone_label,
                  "no level token resolved, skipping extraction");
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderCatalog;
    use lavina_store::ProviderId;

    struct Fixture {
        registry: ZoneRegistry,
        vocab: LevelVocabulary,
        config: ProviderConfig,
    }

    fn fixture(provider: &str) -> Fixture {
        let catalog = ProviderCatalog::builtin();
        let config = catalog
            .provider(&ProviderId::new(provider))
            .unwrap()
            .clone();
        Fixture {
            registry: ZoneRegistry::load(catalog.zones).unwrap(),
            vocab: LevelVocabulary::from_config(&config).unwrap(),
            config,
        }
    }

    fn extraction(f: &Fixture, label: &str, tokens: &[&str]) -> RawExtraction {
        RawExtraction::new(
            label,
            tokens.iter().map(|t| t.to_string()).collect(),
            f.config.id.clone(),
        )
    }

    fn date() -> NaiveDate {
        "2024-01-10".parse().unwrap()
    }

    #[test]
    fn resolves_single_token() {
        let f = fixture("aragon-navarra");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(vec![extraction(&f, "Sobrarbe", &["Notable"])], date());

        assert_eq!(out.readings.len(), 1);
        assert_eq!(out.readings[0].zone_id, ZoneId::new("sobrarbe"));
        assert_eq!(out.readings[0].danger_level.get(), 3);
        assert_eq!(out.skipped_unknown_zone, 0);
    }

    #[test]
    fn multiple_tokens_reduce_by_maximum() {
        let f = fixture("andorra");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(vec![extraction(&f, "Andorra nord", &["2", "4"])], date());

        assert_eq!(out.readings[0].danger_level.get(), 4);
    }

    #[test]
    fn unknown_zone_skipped_and_counted() {
        let f = fixture("aragon-navarra");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(
            vec![
                extraction(&f, "Atlantis", &["Notable"]),
                extraction(&f, "Navarra", &["Limitado"]),
            ],
            date(),
        );

        assert_eq!(out.readings.len(), 1);
        assert_eq!(out.skipped_unknown_zone, 1);
    }

    #[test]
    fn extraction_drops_only_when_no_token_resolves() {
        let f = fixture("andorra");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(
            vec![
                // stray non-level code alongside a real one: reading survives
                extraction(&f, "Andorra nord", &["2", "70"]),
                extraction(&f, "Andorra sud", &["70"]),
            ],
            date(),
        );

        assert_eq!(out.readings.len(), 1);
        assert_eq!(out.readings[0].danger_level.get(), 2);
        assert_eq!(out.skipped_unknown_level, 1);
    }

    #[test]
    fn duplicate_zone_last_wins_with_count() {
        let f = fixture("aran");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(
            vec![
                extraction(&f, "Norte y centro de Aran", &["moderate"]),
                extraction(&f, "Límite sur de Aran", &["considerable"]),
            ],
            date(),
        );

        // Both aliases resolve to the same canonical zone: one reading,
        // the later extraction's level.
        assert_eq!(out.readings.len(), 1);
        assert_eq!(out.readings[0].zone_id, ZoneId::new("aran"));
        assert_eq!(out.readings[0].danger_level.get(), 3);
        assert_eq!(out.duplicate_overwrites, 1);
    }

    #[test]
    fn duplicate_zone_with_same_level_still_counts_overwrite() {
        let f = fixture("aran");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(
            vec![
                extraction(&f, "Norte y centro de Aran", &["moderate"]),
                extraction(&f, "Límite sur de Aran", &["moderate"]),
            ],
            date(),
        );

        assert_eq!(out.readings.len(), 1);
        assert_eq!(out.readings[0].danger_level.get(), 2);
        assert_eq!(out.duplicate_overwrites, 1);
    }

    #[test]
    fn empty_extractions_produce_empty_outcome() {
        let f = fixture("icgc");
        let n = BulletinNormalizer::new(&f.registry, &f.vocab, &f.config);
        let out = n.normalize(Vec::new(), date());
        assert!(out.readings.is_empty());
    }
}
