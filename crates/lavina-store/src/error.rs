//! Error types for lavina-store

use thiserror::Error;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend connection error
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// Backend query/write error
    #[error("Store operation failed: {0}")]
    Backend(String),

    /// Danger level outside the 1..=5 scale
    #[error("Invalid danger level: {value} (expected 1..=5)")]
    InvalidDangerLevel { value: u8 },

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
