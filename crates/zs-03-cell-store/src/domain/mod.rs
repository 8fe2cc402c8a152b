//! Domain layer for the Cell Store.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::StoreConfig;
pub use entities::{
    CategoricalCell, CellKey, NumericalCell, Organ, OrganId, Statement, StoreCounts, Theme,
};
pub use errors::{KVStoreError, StoreError};
