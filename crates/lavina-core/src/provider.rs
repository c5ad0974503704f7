//! Per-provider configuration: data, not code.
//!
//! Everything a provider run needs to know about its source — document
//! format, vocabulary, label rewrites, icon-table mapping, URL template,
//! date rule — lives here as declarative, serde-loadable configuration.
//! The built-in catalog covers the known Pyrenees authorities; deployments
//! can load their own catalog from JSON instead.

use std::collections::BTreeMap;

use lavina_store::ProviderId;
use serde::{Deserialize, Serialize};

use crate::domain::DocumentFormat;
use crate::error::RunError;
use crate::registry::Zone;

// ---------------------------------------------------------------------------
// Rewrites
// ---------------------------------------------------------------------------

/// A declarative label rewrite applied before registry lookup.
///
/// These replace inline conditionals keyed on literal zone names: when a
/// provider renames a sub-zone or drops a connective word, the fix is a
/// config entry on that provider, not registry logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LabelRewrite {
    /// Drop a leading prefix (`"Aran - Franja Nord"` → `"Franja Nord"`).
    StripPrefix { prefix: String },
    /// Insert a word at a position, only for one specific label
    /// (`"Vessant Nord Cadí"` → `"Vessant Nord del Cadí"`).
    InsertWord {
        label: String,
        index: usize,
        word: String,
    },
}

impl LabelRewrite {
    pub fn apply(&self, label: &str) -> String {
        match self {
            LabelRewrite::StripPrefix { prefix } => label
                .strip_prefix(prefix.as_str())
                .unwrap_or(label)
                .to_string(),
            LabelRewrite::InsertWord {
                label: target,
                index,
                word,
            } => {
                if label.trim() != target.trim() {
                    return label.to_string();
                }
                let mut words: Vec<&str> = label.split_whitespace().collect();
                if *index <= words.len() {
                    words.insert(*index, word);
                }
                words.join(" ")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Locale and date rules
// ---------------------------------------------------------------------------

/// Language of a provider's free-text dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    Spanish,
    Catalan,
    French,
}

/// How the bulletin's authoritative date is found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DateRule {
    /// Free-text long date with a locale month name, possibly carrying a
    /// correction/reissue annotation ("lunes, 4 de diciembre de 2021
    /// (corrección)").
    LocaleLongDate,
    /// `dd/mm/yyyy` dates on the section marked by a phrase; the earliest
    /// one is the publication date.
    SlashDateNearMarker { marker: String },
    /// ISO timestamp in a `publicationTime` node (CAAML).
    PublicationTime,
}

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Complete configuration for one bulletin provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub display_name: String,
    pub format: DocumentFormat,
    pub locale: Locale,

    /// Fetch URL with an optional `{date}` placeholder (YYYY-MM-DD).
    #[serde(default)]
    pub url_template: Option<String>,

    /// Danger-level token → 1..=5. Independent per provider: same scale,
    /// different source words or codes.
    pub vocabulary: BTreeMap<String, u8>,

    /// Label rewrites applied before registry lookup, in order.
    #[serde(default)]
    pub rewrites: Vec<LabelRewrite>,

    /// Icon-table HTML only: container class → zone label.
    #[serde(default)]
    pub icon_zones: BTreeMap<String, String>,

    /// Icon-table HTML only: substring marking the danger-level icon `src`.
    #[serde(default)]
    pub icon_src_hint: Option<String>,

    /// PDF text only: zone labels exactly as the document prints them.
    #[serde(default)]
    pub pdf_zone_labels: Vec<String>,

    pub date_rule: DateRule,
}

impl ProviderConfig {
    /// Expand the URL template for a bulletin date.
    pub fn url_for(&self, date: chrono::NaiveDate) -> Option<String> {
        self.url_template
            .as_ref()
            .map(|t| t.replace("{date}", &date.format("%Y-%m-%d").to_string()))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Zone catalog plus provider configurations, loaded once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCatalog {
    pub zones: Vec<Zone>,
    pub providers: Vec<ProviderConfig>,
}

impl ProviderCatalog {
    pub fn from_json(json: &str) -> Result<Self, RunError> {
        serde_json::from_str(json).map_err(|e| RunError::InvalidConfig {
            reason: format!("catalog JSON: {e}"),
        })
    }

    pub fn provider(&self, id: &ProviderId) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == *id)
    }

    /// Built-in catalog of the known Pyrenees authorities.
    pub fn builtin() -> Self {
        ProviderCatalog {
            zones: builtin_zones(),
            providers: vec![
                andorra(),
                aran(),
                icgc(),
                aragon_navarra(),
                meteofrance(),
            ],
        }
    }
}

fn zone(id: &str, name: &str, aliases: &[&str]) -> Zone {
    Zone::new(id, name, aliases.iter().copied())
}

fn builtin_zones() -> Vec<Zone> {
    vec![
        // Andorra
        zone("andorra-nord", "Andorra nord", &[]),
        zone("andorra-centre", "Andorra centre", &[]),
        zone("andorra-sud", "Andorra sud", &[]),
        // Aran (the CAAML bulletin splits it into three map sectors)
        zone(
            "aran",
            "Aran",
            &[
                "Norte y centro de Aran",
                "Límite sur de Aran",
                "Vertiente sur de Aran",
            ],
        ),
        // ICGC - Catalunya
        zone("franja-nord-pallaresa", "Franja Nord Pallaresa", &[]),
        zone("ribagorcana-vall-fosca", "Ribagorçana - Vall Fosca", &[]),
        zone("pallaresa", "Pallaresa", &[]),
        zone("perafita-puigpedros", "Perafita - Puigpedrós", &[]),
        zone(
            "vessant-nord-cadi-moixero",
            "Vessant Nord del Cadí - Moixeró",
            &[],
        ),
        zone("prepirineu", "Prepirineu", &[]),
        zone("ter-freser", "Ter - Freser", &[]),
        // AEMET - Aragon & Navarra
        zone("navarra", "Navarra", &[]),
        zone("jacetania", "Jacetania", &[]),
        zone("gallego", "Gállego", &[]),
        zone("sobrarbe", "Sobrarbe", &[]),
        zone("ribagorza", "Ribagorza", &[]),
        // MeteoFrance - Pyrénées
        zone("pays-basque", "Pays Basque", &[]),
        zone("aspe-ossau", "Aspe-Ossau", &[]),
        zone("haute-bigorre", "Haute-Bigorre", &[]),
        zone("aure-louron", "Aure-Louron", &[]),
        zone("luchonnais", "Luchonnais", &[]),
        zone("couserans", "Couserans", &[]),
        zone("haute-ariege", "Haute-Ariege", &[]),
        zone("orlu-st-barthelemy", "Orlu St Barthelemy", &[]),
        zone("capcir-puymorens", "Capcir-Puymorens", &[]),
        zone("cerdagne-canigou", "Cerdagne-Canigou", &[]),
    ]
}

fn numeric_vocabulary() -> BTreeMap<String, u8> {
    (1..=5).map(|n| (n.to_string(), n)).collect()
}

fn vocabulary(pairs: &[(&str, u8)]) -> BTreeMap<String, u8> {
    pairs
        .iter()
        .map(|(token, level)| (token.to_string(), *level))
        .collect()
}

fn andorra() -> ProviderConfig {
    ProviderConfig {
        id: ProviderId::new("andorra"),
        display_name: "Andorra National Weather Service".to_string(),
        format: DocumentFormat::IconHtml,
        locale: Locale::Catalan,
        url_template: Some("http://www.meteo.ad/estatneu".to_string()),
        vocabulary: numeric_vocabulary(),
        rewrites: Vec::new(),
        icon_zones: [
            ("iconos1", "Andorra nord"),
            ("iconos2", "Andorra centre"),
            ("iconos3", "Andorra sud"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        icon_src_hint: Some("ico-risque".to_string()),
        pdf_zone_labels: Vec::new(),
        date_rule: DateRule::SlashDateNearMarker {
            marker: "Elaborat el".to_string(),
        },
    }
}

fn aran() -> ProviderConfig {
    ProviderConfig {
        id: ProviderId::new("aran"),
        display_name: "Lauegi - Conselh d'Aran".to_string(),
        format: DocumentFormat::CaamlXml,
        locale: Locale::Spanish,
        url_template: Some(
            "https://conselharan2.cyberneticos.net/albina_files_local/{date}/{date}_es_CAAMLv6.xml"
                .to_string(),
        ),
        vocabulary: vocabulary(&[
            ("low", 1),
            ("moderate", 2),
            ("considerable", 3),
            ("high", 4),
            ("very_high", 5),
        ]),
        rewrites: Vec::new(),
        icon_zones: BTreeMap::new(),
        icon_src_hint: None,
        pdf_zone_labels: Vec::new(),
        date_rule: DateRule::PublicationTime,
    }
}

fn icgc() -> ProviderConfig {
    ProviderConfig {
        id: ProviderId::new("icgc"),
        display_name: "ICGC - Catalunya".to_string(),
        format: DocumentFormat::PdfText,
        locale: Locale::Catalan,
        url_template: Some(
            "https://bpa.icgc.cat/butlletigenerator/bpadoc/bpa_{date}_cat.pdf".to_string(),
        ),
        vocabulary: vocabulary(&[
            ("FEBLE", 1),
            ("MODERAT", 2),
            ("MARCAT", 3),
            ("FORT", 4),
            ("MOLT FORT", 5),
        ]),
        // The Aran strip of the ICGC bulletin belongs to the Lauegi zone
        // catalog; the Cadí label is printed without its connective word.
        rewrites: vec![
            LabelRewrite::StripPrefix {
                prefix: "Aran - ".to_string(),
            },
            LabelRewrite::InsertWord {
                label: "Vessant Nord Cadí - Moixeró".to_string(),
                index: 2,
                word: "del".to_string(),
            },
        ],
        icon_zones: BTreeMap::new(),
        icon_src_hint: None,
        pdf_zone_labels: vec![
            "Aran - Franja Nord Pallaresa".to_string(),
            "Ribagorçana - Vall Fosca".to_string(),
            "Pallaresa".to_string(),
            "Perafita - Puigpedrós".to_string(),
            "Vessant Nord Cadí - Moixeró".to_string(),
            "Prepirineu".to_string(),
            "Ter - Freser".to_string(),
        ],
        date_rule: DateRule::LocaleLongDate,
    }
}

fn aragon_navarra() -> ProviderConfig {
    ProviderConfig {
        id: ProviderId::new("aragon-navarra"),
        display_name: "AEMET - Aragon & Navarra".to_string(),
        format: DocumentFormat::PdfText,
        locale: Locale::Spanish,
        url_template: Some(
            "https://www.aemet.es/documentos/es/eltiempo/prediccion/montana/boletin_peligro_aludes/BPA_Pirineo_Aragones_Navarro.pdf"
                .to_string(),
        ),
        vocabulary: vocabulary(&[
            ("Débil", 1),
            ("Limitado", 2),
            ("Notable", 3),
            ("Fuerte", 4),
            ("Muy Fuerte", 5),
        ]),
        rewrites: Vec::new(),
        icon_zones: BTreeMap::new(),
        icon_src_hint: None,
        pdf_zone_labels: vec![
            "Navarra".to_string(),
            "Jacetania".to_string(),
            "Gállego".to_string(),
            "Sobrarbe".to_string(),
            "Ribagorza".to_string(),
        ],
        date_rule: DateRule::LocaleLongDate,
    }
}

fn meteofrance() -> ProviderConfig {
    ProviderConfig {
        id: ProviderId::new("meteofrance"),
        display_name: "MeteoFrance - Pyrénées".to_string(),
        format: DocumentFormat::IconHtml,
        locale: Locale::French,
        url_template: Some(
            "https://meteofrance.com/meteo-montagne/pyrenees/risques-avalanche".to_string(),
        ),
        vocabulary: numeric_vocabulary(),
        rewrites: Vec::new(),
        icon_zones: [
            ("massif-pays-basque", "Pays Basque"),
            ("massif-aspe-ossau", "Aspe-Ossau"),
            ("massif-haute-bigorre", "Haute-Bigorre"),
            ("massif-aure-louron", "Aure-Louron"),
            ("massif-luchonnais", "Luchonnais"),
            ("massif-couserans", "Couserans"),
            ("massif-haute-ariege", "Haute-Ariege"),
            ("massif-orlu-st-barthelemy", "Orlu St Barthelemy"),
            ("massif-capcir-puymorens", "Capcir-Puymorens"),
            ("massif-cerdagne-canigou", "Cerdagne-Canigou"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        icon_src_hint: Some("iconMap".to_string()),
        pdf_zone_labels: Vec::new(),
        date_rule: DateRule::LocaleLongDate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_rewrite() {
        let rw = LabelRewrite::StripPrefix {
            prefix: "Aran - ".to_string(),
        };
        assert_eq!(rw.apply("Aran - Franja Nord Pallaresa"), "Franja Nord Pallaresa");
        assert_eq!(rw.apply("Pallaresa"), "Pallaresa");
    }

    #[test]
    fn insert_word_rewrite_only_matches_target() {
        let rw = LabelRewrite::InsertWord {
            label: "Vessant Nord Cadí - Moixeró".to_string(),
            index: 2,
            word: "del".to_string(),
        };
        assert_eq!(
            rw.apply("Vessant Nord Cadí - Moixeró"),
            "Vessant Nord del Cadí - Moixeró"
        );
        assert_eq!(rw.apply("Prepirineu"), "Prepirineu");
    }

    #[test]
    fn builtin_catalog_has_five_providers() {
        let catalog = ProviderCatalog::builtin();
        assert_eq!(catalog.providers.len(), 5);
        assert!(catalog.provider(&ProviderId::new("icgc")).is_some());
        assert!(catalog.provider(&ProviderId::new("atlantis")).is_none());
    }

    #[test]
    fn url_template_expands_date() {
        let catalog = ProviderCatalog::builtin();
        let icgc = catalog.provider(&ProviderId::new("icgc")).unwrap();
        let url = icgc.url_for("2024-01-10".parse().unwrap()).unwrap();
        assert!(url.contains("bpa_2024-01-10_cat.pdf"));
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = ProviderCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let reloaded = ProviderCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.providers.len(), catalog.providers.len());
        assert_eq!(reloaded.zones.len(), catalog.zones.len());
    }
}
