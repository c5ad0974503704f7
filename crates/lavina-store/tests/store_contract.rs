//! Behavioral contract tests for `BulletinStore`.
//!
//! These verify the guarantees the ingestion pipeline depends on, using the
//! in-memory implementation. Any conforming backend must pass these.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use lavina_store::memory::MemoryBulletinStore;
use lavina_store::{BulletinReading, BulletinStore, DangerLevel, ProviderId, WriteOutcome, ZoneId};

fn reading(zone: &str, date: &str, level: u8) -> BulletinReading {
    BulletinReading {
        zone_id: ZoneId::new(zone),
        bulletin_date: date.parse().unwrap(),
        danger_level: DangerLevel::new(level).unwrap(),
        provider: ProviderId::new("contract"),
        extracted_at: Utc::now(),
    }
}

// ===========================================================================
// Idempotence
// ===========================================================================

#[tokio::test]
async fn upsert_same_reading_twice_yields_one_history_entry() {
    let store = MemoryBulletinStore::new();
    let r = reading("sobrarbe", "2024-01-10", 3);

    assert_eq!(store.upsert_atomic(&r).await.unwrap(), WriteOutcome::Written);
    assert_eq!(
        store.upsert_atomic(&r).await.unwrap(),
        WriteOutcome::AlreadyExists
    );

    let history = store.history(&ZoneId::new("sobrarbe")).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].danger_level.get(), 3);
}

#[tokio::test]
async fn concurrent_upserts_resolve_to_single_write() {
    // A scheduled run and a manual backfill racing on the same key:
    // exactly one of them wins.
    let store = Arc::new(MemoryBulletinStore::new());
    let r = reading("jacetania", "2024-02-01", 4);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        let r = r.clone();
        handles.push(tokio::spawn(
            async move { store.upsert_atomic(&r).await.unwrap() },
        ));
    }

    let mut written = 0;
    for handle in handles {
        if handle.await.unwrap() == WriteOutcome::Written {
            written += 1;
        }
    }

    assert_eq!(written, 1);
    assert_eq!(store.history_len(), 1);
}

// ===========================================================================
// History
// ===========================================================================

#[tokio::test]
async fn history_is_append_only_and_ordered() {
    let store = MemoryBulletinStore::new();
    for (date, level) in [("2024-01-10", 2), ("2024-01-11", 3), ("2024-01-12", 4)] {
        store
            .upsert_atomic(&reading("pallaresa", date, level))
            .await
            .unwrap();
    }

    let history = store.history(&ZoneId::new("pallaresa")).await.unwrap();
    assert_eq!(history.len(), 3);
    let dates: Vec<NaiveDate> = history.iter().map(|e| e.bulletin_date).collect();
    assert_eq!(
        dates,
        vec![
            "2024-01-10".parse::<NaiveDate>().unwrap(),
            "2024-01-11".parse().unwrap(),
            "2024-01-12".parse().unwrap(),
        ]
    );
}

#[tokio::test]
async fn history_is_scoped_per_zone() {
    let store = MemoryBulletinStore::new();
    store
        .upsert_atomic(&reading("navarra", "2024-01-10", 1))
        .await
        .unwrap();
    store
        .upsert_atomic(&reading("ribagorza", "2024-01-10", 5))
        .await
        .unwrap();

    assert_eq!(store.history(&ZoneId::new("navarra")).await.unwrap().len(), 1);
    assert_eq!(
        store.history(&ZoneId::new("ribagorza")).await.unwrap().len(),
        1
    );
    assert!(store.history(&ZoneId::new("atlantis")).await.unwrap().is_empty());
}

// ===========================================================================
// Current state
// ===========================================================================

#[tokio::test]
async fn current_state_last_write_wins_regardless_of_date() {
    // Providers occasionally reprocess past dates; the current slot always
    // reflects the most recent write, not the newest bulletin date.
    let store = MemoryBulletinStore::new();
    let zone = ZoneId::new("aran");

    store
        .set_current_state(&zone, DangerLevel::new(4).unwrap(), Utc::now())
        .await
        .unwrap();
    store
        .set_current_state(&zone, DangerLevel::new(2).unwrap(), Utc::now())
        .await
        .unwrap();

    let state = store.current_state(&zone).await.unwrap().unwrap();
    assert_eq!(state.danger_level.get(), 2);
}

#[tokio::test]
async fn current_state_absent_for_unknown_zone() {
    let store = MemoryBulletinStore::new();
    assert!(store
        .current_state(&ZoneId::new("atlantis"))
        .await
        .unwrap()
        .is_none());
}
