//! Contract Reader configuration.

use std::time::Duration;

use primitive_types::H160;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::ContractError;

/// Default JSON-RPC endpoint of the node.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Connection settings for the contract being mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// JSON-RPC endpoint (default: http://localhost:8545)
    pub rpc_url: String,
    /// Address of the Zarya contract, 0x-prefixed hex
    pub contract_address: String,
    /// Upper bound for one eth_call round trip
    pub request_timeout: Duration,
    /// Upper bound for establishing the TCP connection
    pub connect_timeout: Duration,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: format!("0x{}", "00".repeat(20)),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ContractConfig {
    /// Parse the configured contract address.
    pub fn address(&self) -> Result<H160, ContractError> {
        parse_address(&self.contract_address)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::InvalidRpcUrl("rpc_url cannot be empty".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("request_timeout cannot be 0".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("connect_timeout cannot be 0".into()));
        }
        match self.address() {
            Ok(_) => Ok(()),
            Err(ContractError::InvalidAddress(reason)) => Err(ConfigError::InvalidAddress(reason)),
            Err(other) => Err(ConfigError::InvalidAddress(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrl(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid contract address: {0}")]
    InvalidAddress(String),
}

/// Parse a 20-byte hex address with optional `0x` prefix.
pub fn parse_address(raw: &str) -> Result<H160, ContractError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| ContractError::InvalidAddress(format!("{}: {}", raw, e)))?;
    if bytes.len() != 20 {
        return Err(ContractError::InvalidAddress(format!(
            "{}: expected 20 bytes, got {}",
            raw,
            bytes.len()
        )));
    }
    Ok(H160::from_slice(&bytes))
}
