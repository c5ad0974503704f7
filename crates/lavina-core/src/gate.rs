//! Ingestion gate: at-most-once hand-off to the store.
//!
//! The gate never checks-then-inserts: the store's `upsert_atomic` is the
//! single decision point, so two concurrent runs for the same
//! `(zone, date)` resolve to exactly one write. On a write the gate also
//! overwrites the zone's current state; the most recent write wins even
//! when a provider reprocesses an older date.

use std::sync::Arc;

use chrono::Utc;
use lavina_store::{BulletinReading, BulletinStore, WriteOutcome};
use tracing::{debug, info};

use crate::error::RunError;

/// Result of offering one reading to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Stored; history grew and current state was refreshed.
    Written,
    /// A reading for this `(zone, date)` already exists; nothing changed.
    SkippedExisting,
}

/// Idempotency gate in front of a `BulletinStore`.
pub struct IngestionGate {
    store: Arc<dyn BulletinStore>,
}

impl IngestionGate {
    pub fn new(store: Arc<dyn BulletinStore>) -> Self {
        IngestionGate { store }
    }

    pub async fn accept(&self, reading: &BulletinReading) -> Result<GateOutcome, RunError> {
        match self.store.upsert_atomic(reading).await? {
            WriteOutcome::Written => {
                self.store
                    .set_current_state(&reading.zone_id, reading.danger_level, Utc::now())
                    .await?;
                info!(zone = %reading.zone_id, date = %reading.bulletin_date,
                      level = %reading.danger_level, "reading written");
                Ok(GateOutcome::Written)
            }
            WriteOutcome::AlreadyExists => {
                debug!(zone = %reading.zone_id, date = %reading.bulletin_date,
                       "reading already recorded, skipping");
                Ok(GateOutcome::SkippedExisting)
            }
        }
    }
}
