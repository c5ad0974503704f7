//! Lavina-Store: persistence contract for normalized bulletin readings
//!
//! This crate defines the storage abstraction the ingestion pipeline writes
//! through, and the record types that cross that boundary.
//!
//! ## Key Components
//!
//! - `BulletinStore`: the backend-agnostic store trait. Its central guarantee
//!   is `upsert_atomic`: at most one stored reading per
//!   `(zone_id, bulletin_date)`, enforced in a single operation.
//! - `MemoryBulletinStore`: in-memory implementation satisfying the full
//!   trait contract, used by tests and local runs.

mod error;
pub mod memory;
mod records;
mod store;

pub use error::StoreError;
pub use records::{
    BulletinReading, CurrentZoneState, DangerLevel, HistoryEntry, ProviderId, WriteOutcome, ZoneId,
};
pub use store::BulletinStore;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
