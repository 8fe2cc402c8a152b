//! Error types for the Cell Store.

use thiserror::Error;

use super::entities::OrganId;

/// Errors raised by the raw key-value backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl From<std::io::Error> for KVStoreError {
    fn from(e: std::io::Error) -> Self {
        KVStoreError::IOError {
            message: e.to_string(),
        }
    }
}

/// Errors surfaced by `CellStore` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] KVStoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Two different raw hashes mapped to the same organ id.
    #[error("organ id {id} already bound to 0x{existing}, refusing 0x{incoming}")]
    OrganConflict {
        id: OrganId,
        existing: String,
        incoming: String,
    },
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
