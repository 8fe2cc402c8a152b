//! Domain layer for the Synchronizer.

pub mod config;
pub mod decimal;
pub mod errors;
pub mod report;

pub use config::{CellFailurePolicy, SyncConfig, SyncConfigError};
pub use decimal::convert_to_decimal;
pub use errors::SyncError;
pub use report::{SyncOutcome, SyncReport};
