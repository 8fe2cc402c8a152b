//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Selects the store backend.
///
/// `path: None` keeps everything in memory; a path persists to that file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }
}
