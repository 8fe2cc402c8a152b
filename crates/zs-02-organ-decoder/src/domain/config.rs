//! Decoder configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for local organ numbers accepted by `validate`.
pub const MAX_SCAN_ORGAN_SIZE: u32 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Local organ numbers are enumerated in `[0, scan_organ_size)`.
    pub scan_organ_size: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            scan_organ_size: 1000,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), DecoderConfigError> {
        if self.scan_organ_size > MAX_SCAN_ORGAN_SIZE {
            return Err(DecoderConfigError::ScanTooLarge {
                size: self.scan_organ_size,
                max: MAX_SCAN_ORGAN_SIZE,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecoderConfigError {
    #[error("scan_organ_size too large: {size} > {max}")]
    ScanTooLarge { size: u32, max: u32 },
}
