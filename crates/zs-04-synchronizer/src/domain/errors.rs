//! Error types for the Synchronizer.

use thiserror::Error;
use zs_01_contract_reader::ContractError;
use zs_03_cell_store::StoreError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("contract call failed: {0}")]
    Contract(#[from] ContractError),

    #[error("store write failed: {0}")]
    Store(#[from] StoreError),

    #[error("failed to get category name for x={x}, y={y}, categoryId={category_id}: {source}")]
    Category {
        x: u64,
        y: u64,
        category_id: u64,
        #[source]
        source: ContractError,
    },

    /// Declared sample count does not fit the history query.
    #[error("cell ({x}, {y}) reports an unusable sample count: {count}")]
    SampleCount { x: u64, y: u64, count: String },
}

impl SyncError {
    /// Whether the failure is confined to the cell being synced.
    ///
    /// Unreachable or failing nodes and store write failures are not: every
    /// later cell would hit them too.
    pub fn is_cell_local(&self) -> bool {
        match self {
            SyncError::Category { source, .. } => !matches!(source, ContractError::Transport(_)),
            SyncError::SampleCount { .. } => true,
            SyncError::Contract(e) => e.is_decode_error(),
            SyncError::Store(StoreError::OrganConflict { .. }) => true,
            SyncError::Store(_) => false,
        }
    }
}
