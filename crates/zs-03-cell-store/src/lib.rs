//! # Cell Store
//!
//! Persistent keyed storage for the mirrored survey matrix: themes,
//! statements, organs and the two cell kinds. Every write is an upsert keyed
//! by natural identity, so repeated synchronization never duplicates rows.
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────────────────┐
//! Synchronizer │ CellStore (inbound)  │ data_points()
//!      ───────→│                      │←──────── readers
//!              └──────────┬───────────┘
//!            ┌────────────┴─────────────┐
//!   InMemoryCellStore          KvCellStore<K: KeyValueStore>
//!                               ├── InMemoryKVStore
//!                               └── FileBackedKVStore
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod query;

use std::sync::Arc;

pub use adapters::{FileBackedKVStore, InMemoryCellStore, InMemoryKVStore, KvCellStore};
pub use domain::{
    CategoricalCell, CellKey, KVStoreError, NumericalCell, Organ, OrganId, Statement, StoreConfig,
    StoreCounts, StoreError, Theme,
};
pub use ports::{CellStore, KeyValueStore};
pub use query::{data_points, DataPoint, DataValues};

/// Open the store selected by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn CellStore>, StoreError> {
    match &config.path {
        Some(path) => Ok(Arc::new(KvCellStore::new(FileBackedKVStore::open(path)?))),
        None => Ok(Arc::new(InMemoryCellStore::new())),
    }
}
