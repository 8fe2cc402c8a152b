//! # Inbound Port
//!
//! The storage capability the synchronizer writes into and readers query.
//! Implementations use interior mutability so a single store can be shared
//! behind an `Arc` by concurrent cell probes.

use crate::domain::{
    CategoricalCell, NumericalCell, Organ, OrganId, Statement, StoreCounts, StoreError, Theme,
};

pub trait CellStore: Send + Sync {
    // =========================================================================
    // Upserts (keyed by natural identity, last writer wins)
    // =========================================================================

    fn upsert_theme(&self, theme: Theme) -> Result<(), StoreError>;

    fn upsert_statement(&self, statement: Statement) -> Result<(), StoreError>;

    fn upsert_numerical_cell(&self, cell: NumericalCell) -> Result<(), StoreError>;

    fn upsert_categorical_cell(&self, cell: CategoricalCell) -> Result<(), StoreError>;

    // =========================================================================
    // Organs
    // =========================================================================

    fn organ(&self, id: OrganId) -> Result<Option<Organ>, StoreError>;

    /// Insert `organ` unless its id is already present, returning the stored row.
    ///
    /// Fails with `StoreError::OrganConflict` if the id is bound to a
    /// different raw hash.
    fn insert_organ_if_absent(&self, organ: Organ) -> Result<Organ, StoreError>;

    // =========================================================================
    // Keyed lookups
    // =========================================================================

    fn theme(&self, x_index: u64, is_categorical: bool) -> Result<Option<Theme>, StoreError>;

    fn statement(&self, y_index: u64, is_categorical: bool) -> Result<Option<Statement>, StoreError>;

    fn numerical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<NumericalCell>, StoreError>;

    fn categorical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<CategoricalCell>, StoreError>;

    // =========================================================================
    // Full scans, ordered by key
    // =========================================================================

    fn themes(&self) -> Result<Vec<Theme>, StoreError>;

    fn statements(&self) -> Result<Vec<Statement>, StoreError>;

    fn organs(&self) -> Result<Vec<Organ>, StoreError>;

    fn numerical_cells(&self) -> Result<Vec<NumericalCell>, StoreError>;

    fn categorical_cells(&self) -> Result<Vec<CategoricalCell>, StoreError>;

    /// Make every write so far durable. No-op for volatile stores.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn counts(&self) -> Result<StoreCounts, StoreError> {
        Ok(StoreCounts {
            themes: self.themes()?.len(),
            statements: self.statements()?.len(),
            organs: self.organs()?.len(),
            numerical_cells: self.numerical_cells()?.len(),
            categorical_cells: self.categorical_cells()?.len(),
        })
    }
}

/// Shared organ-insert rule: keep the existing row, reject a hash mismatch.
pub(crate) fn reconcile_organ(existing: Option<Organ>, incoming: Organ) -> Result<(Organ, bool), StoreError> {
    match existing {
        Some(stored) if stored.raw_hash == incoming.raw_hash => Ok((stored, false)),
        Some(stored) => Err(StoreError::OrganConflict {
            id: stored.id,
            existing: hex::encode(stored.raw_hash.as_bytes()),
            incoming: hex::encode(incoming.raw_hash.as_bytes()),
        }),
        None => Ok((incoming, true)),
    }
}

