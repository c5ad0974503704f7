//! Canonical zone catalog and alias resolution.
//!
//! The registry is an explicit value loaded once per pipeline run and
//! immutable afterwards, so concurrent runs stay safe and tests stay
//! deterministic. Resolution is a pure lookup: provider-specific label
//! rewrites come from the provider's configuration, never from logic here.

use std::collections::{BTreeSet, HashMap};

use lavina_store::ZoneId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtractError, RunError};
use crate::provider::ProviderConfig;

/// A named avalanche-risk zone with a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub canonical_id: ZoneId,
    pub canonical_name: String,
    /// Alternative spellings seen in provider documents. Each alias maps to
    /// exactly one zone across the whole catalog.
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl Zone {
    pub fn new<'a>(
        id: impl AsRef<str>,
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Zone {
            canonical_id: ZoneId::new(id),
            canonical_name: name.into(),
            aliases: aliases.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Collapse whitespace runs, trim, and lowercase for alias comparison.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Read-only zone catalog with an alias index.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: HashMap<ZoneId, Zone>,
    alias_index: HashMap<String, ZoneId>,
}

impl ZoneRegistry {
    /// Build the registry, indexing canonical names and aliases.
    ///
    /// Fails when a zone id repeats or an alias would map to two zones.
    pub fn load(catalog: Vec<Zone>) -> Result<Self, RunError> {
        let mut zones = HashMap::new();
        let mut alias_index: HashMap<String, ZoneId> = HashMap::new();

        for zone in catalog {
            let id = zone.canonical_id.clone();
            for label in std::iter::once(zone.canonical_name.as_str())
                .chain(zone.aliases.iter().map(String::as_str))
            {
                let key = normalize_label(label);
                if key.is_empty() {
                    return Err(RunError::InvalidConfig {
                        reason: format!("zone '{id}' has an empty label"),
                    });
                }
                if let Some(existing) = alias_index.insert(key.clone(), id.clone()) {
                    if existing != id {
                        return Err(RunError::InvalidConfig {
                            reason: format!(
                                "alias '{label}' maps to both '{existing}' and '{id}'"
                            ),
                        });
                    }
                }
            }
            if zones.insert(id.clone(), zone).is_some() {
                return Err(RunError::InvalidConfig {
                    reason: format!("duplicate zone id '{id}'"),
                });
            }
        }

        debug!(zones = zones.len(), "zone registry loaded");
        Ok(ZoneRegistry { zones, alias_index })
    }

    /// Resolve a raw document label to a canonical zone id.
    ///
    /// The provider's label rewrites run first, then the normalized label is
    /// matched against the alias index. Failure is recoverable: the caller
    /// skips that extraction and continues.
    pub fn resolve(
        &self,
        raw_label: &str,
        config: &ProviderConfig,
    ) -> Result<ZoneId, ExtractError> {
        let mut label = raw_label.to_string();
        for rewrite in &config.rewrites {
            label = rewrite.apply(&label);
        }
        let key = normalize_label(&label);
        if key.is_empty() {
            return Err(ExtractError::UnknownZone {
                label: raw_label.to_string(),
                provider: config.id.clone(),
            });
        }
        self.alias_index
            .get(&key)
            .cloned()
            .ok_or_else(|| ExtractError::UnknownZone {
                label: raw_label.to_string(),
                provider: config.id.clone(),
            })
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
