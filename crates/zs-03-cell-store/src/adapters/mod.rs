//! Adapters layer for the Cell Store.

pub mod kv;
pub mod kv_cell_store;
pub mod memory;

pub use kv::{FileBackedKVStore, InMemoryKVStore};
pub use kv_cell_store::KvCellStore;
pub use memory::InMemoryCellStore;
