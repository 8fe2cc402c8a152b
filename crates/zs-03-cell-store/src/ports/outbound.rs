//! # Outbound Port
//!
//! Raw key-value backend used by `KvCellStore`.
//!
//! Testing: `InMemoryKVStore`. Durable: `FileBackedKVStore`.

use crate::domain::KVStoreError;

/// Key-value pairs returned by a prefix scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Pairs whose key starts with `prefix`, ordered by key.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;

    /// Persist buffered writes. No-op for volatile backends.
    fn flush(&mut self) -> Result<(), KVStoreError> {
        Ok(())
    }
}
