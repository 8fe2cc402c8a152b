//! # Organ Decoder
//!
//! Translates the 32-byte organ hashes stored on-chain back into readable
//! organ identifiers such as `77.КОН` or `05.12.СОВ`.
//!
//! The contract only keeps `keccak256(identifier)`. Identifiers follow a small
//! grammar (see [`domain::grammar`]), so the decoder hashes every candidate once
//! at startup and answers lookups from an in-memory index afterwards.
//!
//! ```text
//! ┌────────────────────┐  build()   ┌────────────────────────┐
//! │ grammar::enumerate │ ─────────→ │ HashMap<H256, String>  │
//! └────────────────────┘  keccak    └───────────┬────────────┘
//!                                               │ decode / decode_hex
//!                                               ↓
//!                                 "77.КОН" | "Unknown Organ (0x…)"
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod decoder;
pub mod domain;

pub use decoder::{organ_hash, unknown_organ, OrganDecoder};
pub use domain::{DecoderConfig, DecoderConfigError, OrganIdentifier, Postfix};
