//! Domain layer for the Contract Reader.
//!
//! Pure ABI encoding/decoding and configuration; no I/O.

pub mod abi;
pub mod config;
pub mod errors;

pub use abi::{AbiType, AbiValue};
pub use config::{parse_address, ConfigError, ContractConfig, DEFAULT_RPC_URL};
pub use errors::{AbiError, ContractError};
