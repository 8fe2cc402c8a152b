//! `CellStore` over any `KeyValueStore`.
//!
//! Entities are bincode-encoded under prefixed big-endian keys so prefix
//! scans come back in key order:
//!
//! ```text
//! theme/  [flag][x:u64]      → Theme
//! stmt/   [flag][y:u64]      → Statement
//! organ/  [id:u64]           → Organ
//! ncell/  [x:u64][y:u64]     → NumericalCell
//! ccell/  [x:u64][y:u64]     → CategoricalCell
//! ```

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    CategoricalCell, NumericalCell, Organ, OrganId, Statement, StoreError, Theme,
};
use crate::ports::inbound::{reconcile_organ, CellStore};
use crate::ports::outbound::KeyValueStore;

const THEME: &[u8] = b"theme/";
const STATEMENT: &[u8] = b"stmt/";
const ORGAN: &[u8] = b"organ/";
const NUMERICAL: &[u8] = b"ncell/";
const CATEGORICAL: &[u8] = b"ccell/";

fn flagged_key(prefix: &[u8], flag: bool, index: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 9);
    key.extend_from_slice(prefix);
    key.push(flag as u8);
    key.extend_from_slice(&index.to_be_bytes());
    key
}

fn cell_key(prefix: &[u8], x: u64, y: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 16);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&x.to_be_bytes());
    key.extend_from_slice(&y.to_be_bytes());
    key
}

fn organ_key(id: OrganId) -> Vec<u8> {
    let mut key = ORGAN.to_vec();
    key.extend_from_slice(&id.0.to_be_bytes());
    key
}

pub struct KvCellStore<K: KeyValueStore> {
    kv: RwLock<K>,
}

impl<K: KeyValueStore> KvCellStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv: RwLock::new(kv) }
    }

    fn put<T: Serialize>(&self, key: Vec<u8>, value: &T) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value)?;
        self.kv.write().put(&key, &bytes)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StoreError> {
        match self.kv.read().get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>, StoreError> {
        self.kv
            .read()
            .prefix_scan(prefix)?
            .into_iter()
            .map(|(_, bytes)| bincode::deserialize(&bytes).map_err(StoreError::from))
            .collect()
    }
}

impl<K: KeyValueStore> CellStore for KvCellStore<K> {
    fn upsert_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.put(flagged_key(THEME, theme.is_categorical, theme.x_index), &theme)
    }

    fn upsert_statement(&self, statement: Statement) -> Result<(), StoreError> {
        self.put(
            flagged_key(STATEMENT, statement.is_categorical, statement.y_index),
            &statement,
        )
    }

    fn upsert_numerical_cell(&self, cell: NumericalCell) -> Result<(), StoreError> {
        self.put(cell_key(NUMERICAL, cell.x_index, cell.y_index), &cell)
    }

    fn upsert_categorical_cell(&self, cell: CategoricalCell) -> Result<(), StoreError> {
        self.put(cell_key(CATEGORICAL, cell.x_index, cell.y_index), &cell)
    }

    fn organ(&self, id: OrganId) -> Result<Option<Organ>, StoreError> {
        self.get(&organ_key(id))
    }

    fn insert_organ_if_absent(&self, organ: Organ) -> Result<Organ, StoreError> {
        let key = organ_key(organ.id);
        let mut kv = self.kv.write();

        let existing = match kv.get(&key)? {
            Some(bytes) => Some(bincode::deserialize::<Organ>(&bytes)?),
            None => None,
        };
        let (stored, inserted) = reconcile_organ(existing, organ)?;
        if inserted {
            kv.put(&key, &bincode::serialize(&stored)?)?;
        }
        Ok(stored)
    }

    fn theme(&self, x_index: u64, is_categorical: bool) -> Result<Option<Theme>, StoreError> {
        self.get(&flagged_key(THEME, is_categorical, x_index))
    }

    fn statement(&self, y_index: u64, is_categorical: bool) -> Result<Option<Statement>, StoreError> {
        self.get(&flagged_key(STATEMENT, is_categorical, y_index))
    }

    fn numerical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<NumericalCell>, StoreError> {
        self.get(&cell_key(NUMERICAL, x_index, y_index))
    }

    fn categorical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<CategoricalCell>, StoreError> {
        self.get(&cell_key(CATEGORICAL, x_index, y_index))
    }

    fn themes(&self) -> Result<Vec<Theme>, StoreError> {
        self.scan(THEME)
    }

    fn statements(&self) -> Result<Vec<Statement>, StoreError> {
        self.scan(STATEMENT)
    }

    fn organs(&self) -> Result<Vec<Organ>, StoreError> {
        self.scan(ORGAN)
    }

    fn numerical_cells(&self) -> Result<Vec<NumericalCell>, StoreError> {
        self.scan(NUMERICAL)
    }

    fn categorical_cells(&self) -> Result<Vec<CategoricalCell>, StoreError> {
        self.scan(CATEGORICAL)
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.kv.write().flush()?;
        Ok(())
    }
}
