//! Organ Decoder
//!
//! Recovers organ identifiers from their keccak-256 digests by exhaustive
//! pre-image search over the finite identifier grammar. The reverse index is
//! built once in `OrganDecoder::build` and never mutated afterwards; share it
//! behind an `Arc`.

use std::collections::HashMap;
use std::time::Instant;

use primitive_types::H256;
use sha3::{Digest, Keccak256};
use tracing::info;

use crate::domain::grammar::{enumerate, grammar_size, legacy_federal_spellings};
use crate::domain::{DecoderConfig, DecoderConfigError};

/// Keccak-256 of the identifier's UTF-8 bytes.
pub fn organ_hash(identifier: &str) -> H256 {
    H256::from_slice(&Keccak256::digest(identifier.as_bytes()))
}

/// Placeholder name for digests outside the enumerated space.
pub fn unknown_organ(hex_digits: &str) -> String {
    format!("Unknown Organ (0x{})", hex_digits)
}

/// Immutable digest → identifier index.
///
/// The identifier → digest direction is `organ_hash`.
pub struct OrganDecoder {
    by_hash: HashMap<H256, String>,
    scan_organ_size: u32,
}

impl OrganDecoder {
    /// Hash every candidate identifier and build the reverse index.
    pub fn build(config: &DecoderConfig) -> Result<Self, DecoderConfigError> {
        config.validate()?;
        let started = Instant::now();

        let mut by_hash = HashMap::with_capacity(grammar_size(config.scan_organ_size) + 6);
        for identifier in enumerate(config.scan_organ_size) {
            let identifier = identifier.to_string();
            by_hash.insert(organ_hash(&identifier), identifier);
        }
        for spelling in legacy_federal_spellings() {
            by_hash.insert(organ_hash(&spelling), spelling);
        }

        info!(
            identifiers = by_hash.len(),
            scan_organ_size = config.scan_organ_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Organ reverse index built"
        );

        Ok(Self {
            by_hash,
            scan_organ_size: config.scan_organ_size,
        })
    }

    /// Decode a raw digest. Never fails: misses yield the placeholder name.
    pub fn decode(&self, digest: &H256) -> String {
        self.by_hash
            .get(digest)
            .cloned()
            .unwrap_or_else(|| unknown_organ(&hex::encode(digest.as_bytes())))
    }

    /// Decode a raw digest given as bytes of any length.
    pub fn decode_bytes(&self, bytes: &[u8]) -> String {
        if bytes.len() == 32 {
            self.decode(&H256::from_slice(bytes))
        } else {
            unknown_organ(&hex::encode(bytes))
        }
    }

    /// Decode a hex digest. Case-insensitive; a leading `0x` is optional.
    pub fn decode_hex(&self, digest: &str) -> String {
        let trimmed = digest.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed)
            .to_ascii_lowercase();

        match hex::decode(&digits) {
            Ok(bytes) if bytes.len() == 32 => self.decode(&H256::from_slice(&bytes)),
            _ => unknown_organ(&digits),
        }
    }

    /// Whether `digest` is in the index.
    pub fn contains(&self, digest: &H256) -> bool {
        self.by_hash.contains_key(digest)
    }

    /// Number of indexed identifiers.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn scan_organ_size(&self) -> u32 {
        self.scan_organ_size
    }
}
