//! In-memory store implementation (testing and local runs)
//!
//! `MemoryBulletinStore` satisfies the `BulletinStore` contract without any
//! external dependencies. A single mutex guards both the history index and
//! the current-state map, so `upsert_atomic` really is atomic with respect
//! to concurrent callers.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::records::{
    BulletinReading, CurrentZoneState, DangerLevel, HistoryEntry, WriteOutcome, ZoneId,
};
use crate::store::BulletinStore;
use crate::StoreResult;

#[derive(Debug, Default)]
struct Inner {
    history: Vec<HistoryEntry>,
    index: HashSet<(String, NaiveDate)>,
    current: HashMap<String, CurrentZoneState>,
}

/// In-memory bulletin store backed by a mutex-guarded index.
#[derive(Debug, Default)]
pub struct MemoryBulletinStore {
    inner: Mutex<Inner>,
}

impl MemoryBulletinStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of history entries across all zones.
    pub fn history_len(&self) -> usize {
        self.inner.lock().unwrap().history.len()
    }
}

#[async_trait]
impl BulletinStore for MemoryBulletinStore {
    async fn upsert_atomic(&self, reading: &BulletinReading) -> StoreResult<WriteOutcome> {
        let key = (reading.zone_id.as_str().to_string(), reading.bulletin_date);
        let mut inner = self.inner.lock().unwrap();
        if !inner.index.insert(key) {
            return Ok(WriteOutcome::AlreadyExists);
        }
        let entry = HistoryEntry::from_reading(reading, Utc::now());
        inner.history.push(entry);
        debug!(zone = %reading.zone_id, date = %reading.bulletin_date, "history entry written");
        Ok(WriteOutcome::Written)
    }

    async fn exists(&self, zone_id: &ZoneId, bulletin_date: NaiveDate) -> StoreResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .index
            .contains(&(zone_id.as_str().to_string(), bulletin_date)))
    }

    async fn current_state(&self, zone_id: &ZoneId) -> StoreResult<Option<CurrentZoneState>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.current.get(zone_id.as_str()).cloned())
    }

    async fn set_current_state(
        &self,
        zone_id: &ZoneId,
        danger_level: DangerLevel,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.current.insert(
            zone_id.as_str().to_string(),
            CurrentZoneState {
                zone_id: zone_id.clone(),
                danger_level,
                updated_at,
            },
        );
        Ok(())
    }

    async fn history(&self, zone_id: &ZoneId) -> StoreResult<Vec<HistoryEntry>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .history
            .iter()
            .filter(|e| e.zone_id == *zone_id)
            .cloned()
            .collect())
    }
}
