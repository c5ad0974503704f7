//! Storage trait for normalized bulletin readings.
//!
//! The trait is async and backend-agnostic. An in-memory implementation
//! is provided for testing via the `memory` module.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::records::{
    BulletinReading, CurrentZoneState, DangerLevel, HistoryEntry, WriteOutcome, ZoneId,
};
use crate::StoreResult;

/// Store for per-zone, per-date danger level readings.
///
/// Guarantees:
/// - `upsert_atomic` enforces at most one history entry per
///   `(zone_id, bulletin_date)` pair, as a single atomic operation.
///   Two concurrent upserts for the same key resolve to exactly one
///   `Written` and one `AlreadyExists`; callers must never reimplement
///   this as a separate exists-check followed by an insert.
/// - History is append-only: entries are never mutated or deleted.
/// - Current zone state is a plain overwrite slot with no date ordering;
///   the most recent *write* wins.
#[async_trait]
pub trait BulletinStore: Send + Sync {
    /// Insert the reading into history unless one already exists for its
    /// `(zone_id, bulletin_date)` key. Atomic check-and-insert.
    async fn upsert_atomic(&self, reading: &BulletinReading) -> StoreResult<WriteOutcome>;

    /// Whether a reading exists for the given zone and bulletin date.
    /// Diagnostic read; never part of a write decision.
    async fn exists(&self, zone_id: &ZoneId, bulletin_date: NaiveDate) -> StoreResult<bool>;

    /// Latest known state for a zone, if any reading was ever accepted.
    async fn current_state(&self, zone_id: &ZoneId) -> StoreResult<Option<CurrentZoneState>>;

    /// Overwrite the current state slot for a zone.
    async fn set_current_state(
        &self,
        zone_id: &ZoneId,
        danger_level: DangerLevel,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// All history entries for a zone, oldest first.
    async fn history(&self, zone_id: &ZoneId) -> StoreResult<Vec<HistoryEntry>>;
}
