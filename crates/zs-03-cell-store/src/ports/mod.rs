//! Ports layer for the Cell Store.

pub mod inbound;
pub mod outbound;

pub use inbound::CellStore;
pub use outbound::{KeyValueStore, ScanResult};
