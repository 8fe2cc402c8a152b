//! In-memory `CellStore` over ordered maps.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::{
    CategoricalCell, CellKey, NumericalCell, Organ, OrganId, Statement, StoreCounts, StoreError, Theme,
};
use crate::ports::inbound::{reconcile_organ, CellStore};

#[derive(Default)]
struct Tables {
    themes: BTreeMap<(bool, u64), Theme>,
    statements: BTreeMap<(bool, u64), Statement>,
    organs: BTreeMap<OrganId, Organ>,
    numerical: BTreeMap<CellKey, NumericalCell>,
    categorical: BTreeMap<CellKey, CategoricalCell>,
}

/// Volatile store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryCellStore {
    tables: RwLock<Tables>,
}

impl InMemoryCellStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CellStore for InMemoryCellStore {
    fn upsert_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.tables
            .write()
            .themes
            .insert((theme.is_categorical, theme.x_index), theme);
        Ok(())
    }

    fn upsert_statement(&self, statement: Statement) -> Result<(), StoreError> {
        self.tables
            .write()
            .statements
            .insert((statement.is_categorical, statement.y_index), statement);
        Ok(())
    }

    fn upsert_numerical_cell(&self, cell: NumericalCell) -> Result<(), StoreError> {
        self.tables.write().numerical.insert(cell.key(), cell);
        Ok(())
    }

    fn upsert_categorical_cell(&self, cell: CategoricalCell) -> Result<(), StoreError> {
        self.tables.write().categorical.insert(cell.key(), cell);
        Ok(())
    }

    fn organ(&self, id: OrganId) -> Result<Option<Organ>, StoreError> {
        Ok(self.tables.read().organs.get(&id).cloned())
    }

    fn insert_organ_if_absent(&self, organ: Organ) -> Result<Organ, StoreError> {
        let mut tables = self.tables.write();
        let existing = tables.organs.get(&organ.id).cloned();
        let (stored, inserted) = reconcile_organ(existing, organ)?;
        if inserted {
            tables.organs.insert(stored.id, stored.clone());
        }
        Ok(stored)
    }

    fn theme(&self, x_index: u64, is_categorical: bool) -> Result<Option<Theme>, StoreError> {
        Ok(self.tables.read().themes.get(&(is_categorical, x_index)).cloned())
    }

    fn statement(&self, y_index: u64, is_categorical: bool) -> Result<Option<Statement>, StoreError> {
        Ok(self
            .tables
            .read()
            .statements
            .get(&(is_categorical, y_index))
            .cloned())
    }

    fn numerical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<NumericalCell>, StoreError> {
        Ok(self
            .tables
            .read()
            .numerical
            .get(&CellKey::new(x_index, y_index))
            .cloned())
    }

    fn categorical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<CategoricalCell>, StoreError> {
        Ok(self
            .tables
            .read()
            .categorical
            .get(&CellKey::new(x_index, y_index))
            .cloned())
    }

    fn themes(&self) -> Result<Vec<Theme>, StoreError> {
        Ok(self.tables.read().themes.values().cloned().collect())
    }

    fn statements(&self) -> Result<Vec<Statement>, StoreError> {
        Ok(self.tables.read().statements.values().cloned().collect())
    }

    fn organs(&self) -> Result<Vec<Organ>, StoreError> {
        Ok(self.tables.read().organs.values().cloned().collect())
    }

    fn numerical_cells(&self) -> Result<Vec<NumericalCell>, StoreError> {
        Ok(self.tables.read().numerical.values().cloned().collect())
    }

    fn categorical_cells(&self) -> Result<Vec<CategoricalCell>, StoreError> {
        Ok(self.tables.read().categorical.values().cloned().collect())
    }

    fn counts(&self) -> Result<StoreCounts, StoreError> {
        let tables = self.tables.read();
        Ok(StoreCounts {
            themes: tables.themes.len(),
            statements: tables.statements.len(),
            organs: tables.organs.len(),
            numerical_cells: tables.numerical.len(),
            categorical_cells: tables.categorical.len(),
        })
    }
}
