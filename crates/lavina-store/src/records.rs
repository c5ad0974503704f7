//! Record types crossing the store boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Canonical identifier of an avalanche-risk zone.
///
/// The inner field is private so an id is always in canonical form
/// (trimmed, lowercase) regardless of how the source document spelled it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl AsRef<str>) -> Self {
        ZoneId(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a bulletin provider (regional authority).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl AsRef<str>) -> Self {
        ProviderId(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DangerLevel
// ---------------------------------------------------------------------------

/// Avalanche danger level on the European 1..=5 scale.
///
/// Construction is validated; a `DangerLevel` in hand is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DangerLevel(u8);

impl DangerLevel {
    pub fn new(value: u8) -> Result<Self, StoreError> {
        if (1..=5).contains(&value) {
            Ok(DangerLevel(value))
        } else {
            Err(StoreError::InvalidDangerLevel { value })
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DangerLevel {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DangerLevel::new(value)
    }
}

impl From<DangerLevel> for u8 {
    fn from(level: DangerLevel) -> u8 {
        level.0
    }
}

impl std::fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A fully resolved `(zone, date, level)` fact, ready for persistence.
/// Immutable once produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinReading {
    pub zone_id: ZoneId,
    pub bulletin_date: NaiveDate,
    pub danger_level: DangerLevel,
    pub provider: ProviderId,
    pub extracted_at: DateTime<Utc>,
}

/// Latest known level per zone, overwritten on each accepted reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentZoneState {
    pub zone_id: ZoneId,
    pub danger_level: DangerLevel,
    pub updated_at: DateTime<Utc>,
}

/// Append-only mirror of an accepted reading. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub zone_id: ZoneId,
    pub bulletin_date: NaiveDate,
    pub danger_level: DangerLevel,
    pub provider: ProviderId,
    pub extracted_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_reading(reading: &BulletinReading, recorded_at: DateTime<Utc>) -> Self {
        HistoryEntry {
            zone_id: reading.zone_id.clone(),
            bulletin_date: reading.bulletin_date,
            danger_level: reading.danger_level,
            provider: reading.provider.clone(),
            extracted_at: reading.extracted_at,
            recorded_at,
        }
    }
}

/// Outcome of an atomic upsert against the `(zone_id, bulletin_date)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
    /// The reading was stored and is now part of history.
    Written,
    /// A reading for this `(zone_id, bulletin_date)` already exists.
    AlreadyExists,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danger_level_accepts_scale_bounds() {
        assert!(DangerLevel::new(1).is_ok());
        assert!(DangerLevel::new(5).is_ok());
    }

    #[test]
    fn danger_level_rejects_out_of_range() {
        assert!(matches!(
            DangerLevel::new(0),
            Err(StoreError::InvalidDangerLevel { value: 0 })
        ));
        assert!(matches!(
            DangerLevel::new(6),
            Err(StoreError::InvalidDangerLevel { value: 6 })
        ));
    }

    #[test]
    fn danger_level_orders_by_severity() {
        let two = DangerLevel::new(2).unwrap();
        let four = DangerLevel::new(4).unwrap();
        assert!(four > two);
        assert_eq!(two.max(four), four);
    }

    #[test]
    fn zone_id_canonicalizes() {
        assert_eq!(ZoneId::new("  North ").as_str(), "north");
        assert_eq!(ZoneId::new("Sobrarbe"), ZoneId::new("sobrarbe"));
    }
}
