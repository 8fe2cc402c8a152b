//! # Outbound Ports
//!
//! The synchronizer reads through `zs_01_contract_reader::ZaryaContract` and
//! writes through `zs_03_cell_store::CellStore`. The one port it owns is
//! organ naming.

use primitive_types::H256;

/// Maps a raw on-chain organ hash to a display name. Total: never fails.
pub trait OrganNames: Send + Sync {
    fn organ_name(&self, raw_hash: &H256) -> String;
}
