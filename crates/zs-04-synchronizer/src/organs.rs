//! Organ Resolution
//!
//! Maps a raw organ hash to a stored `Organ`, decoding the name at most once
//! per id. Later sightings of the same hash reuse the stored row.

use std::sync::Arc;

use primitive_types::H256;
use tracing::debug;
use zs_03_cell_store::{CellStore, Organ, OrganId, StoreError};

use crate::ports::OrganNames;

#[derive(Clone)]
pub struct OrganResolver {
    store: Arc<dyn CellStore>,
    names: Arc<dyn OrganNames>,
}

impl OrganResolver {
    pub fn new(store: Arc<dyn CellStore>, names: Arc<dyn OrganNames>) -> Self {
        Self { store, names }
    }

    pub fn get_or_create_organ(&self, raw_hash: &H256) -> Result<Organ, StoreError> {
        let id = OrganId::from_raw_hash(raw_hash);
        if let Some(organ) = self.store.organ(id)? {
            if organ.raw_hash == *raw_hash {
                return Ok(organ);
            }
        }

        let name = self.names.organ_name(raw_hash);
        debug!(organ_id = %id, name = %name, "Resolved new organ");
        self.store.insert_organ_if_absent(Organ {
            id,
            raw_hash: *raw_hash,
            name,
        })
    }
}
