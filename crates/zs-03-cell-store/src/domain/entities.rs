//! # Store Entities
//!
//! Every entity is keyed by its natural identity so writes are upserts:
//!
//! | Entity | Key |
//! |--------|-----|
//! | `Theme` | `(x_index, is_categorical)` |
//! | `Statement` | `(y_index, is_categorical)` |
//! | `Organ` | `OrganId` (content-derived) |
//! | `NumericalCell` | `(x_index, y_index)` |
//! | `CategoricalCell` | `(x_index, y_index)` |
//!
//! Cells reference their organ by id; there are no back-pointers.

use std::fmt;

use primitive_types::H256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Column header of the survey matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub x_index: u64,
    pub is_categorical: bool,
    pub text: String,
}

/// Row header of the survey matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub y_index: u64,
    pub is_categorical: bool,
    pub text: String,
}

/// Stable organ identifier derived from the raw on-chain hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganId(pub u64);

impl OrganId {
    /// First 8 bytes (big-endian) of keccak-256 over the raw 32-byte hash.
    pub fn from_raw_hash(raw_hash: &H256) -> Self {
        let digest = Keccak256::digest(raw_hash.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        OrganId(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for OrganId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Party organ owning one or more cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organ {
    pub id: OrganId,
    pub raw_hash: H256,
    pub name: String,
}

impl Organ {
    pub fn new(raw_hash: H256, name: impl Into<String>) -> Self {
        Self {
            id: OrganId::from_raw_hash(&raw_hash),
            raw_hash,
            name: name.into(),
        }
    }
}

/// Matrix coordinate of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub x_index: u64,
    pub y_index: u64,
}

impl CellKey {
    pub fn new(x_index: u64, y_index: u64) -> Self {
        Self { x_index, y_index }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x_index, self.y_index)
    }
}

/// Cell of a numerical theme/statement pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalCell {
    pub x_index: u64,
    pub y_index: u64,
    /// Decimal-converted samples in on-chain order.
    pub values: Vec<f64>,
    pub organ_id: OrganId,
}

impl NumericalCell {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.x_index, self.y_index)
    }
}

/// Cell of a categorical theme/statement pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalCell {
    pub x_index: u64,
    pub y_index: u64,
    /// Resolved category name of every sample, in on-chain order.
    pub categories: Vec<String>,
    /// Resolved names of the categories the cell accepts.
    pub allowed_categories: Vec<String>,
    pub organ_id: OrganId,
}

impl CategoricalCell {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.x_index, self.y_index)
    }
}

/// Row counts per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub themes: usize,
    pub statements: usize,
    pub organs: usize,
    pub numerical_cells: usize,
    pub categorical_cells: usize,
}
