//! Domain layer for the Organ Decoder: the identifier grammar and config.

pub mod config;
pub mod grammar;

pub use config::{DecoderConfig, DecoderConfigError};
pub use grammar::{enumerate, legacy_federal_spellings, OrganIdentifier, Postfix, REGION_CODES};
