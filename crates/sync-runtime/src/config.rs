//! # Runtime Configuration
//!
//! Unified configuration for all subsystems. Defaults come from each
//! subsystem's config type; environment variables override them:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ZARYA_RPC_URL` | contract `rpc_url` and proxy `upstream_url` |
//! | `ZARYA_CONTRACT_ADDRESS` | contract `contract_address` |
//! | `ZARYA_SCAN_CELLS_SIZE` | sync `max_scan_size` |
//! | `ZARYA_SCAN_ORGANS_SIZE` | decoder `scan_organ_size` |
//! | `ZARYA_SYNC_PERIOD_SECS` | sync `period` |
//! | `ZARYA_CELL_CONCURRENCY` | sync `cell_concurrency` |
//! | `ZARYA_PROXY_ADDR` | proxy `bind_addr` |
//! | `ZARYA_STORE_PATH` | store `path` (empty keeps the store in memory) |
//! | `ZARYA_LOG_JSON` | JSON log output |
//!
//! A malformed value is logged and the default kept. The rate limit is not
//! configurable from the environment.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zs_01_contract_reader::ContractConfig;
use zs_02_organ_decoder::DecoderConfig;
use zs_03_cell_store::StoreConfig;
use zs_04_synchronizer::SyncConfig;
use zs_05_rpc_proxy::ProxyConfig;

pub const ENV_RPC_URL: &str = "ZARYA_RPC_URL";
pub const ENV_CONTRACT_ADDRESS: &str = "ZARYA_CONTRACT_ADDRESS";
pub const ENV_SCAN_CELLS_SIZE: &str = "ZARYA_SCAN_CELLS_SIZE";
pub const ENV_SCAN_ORGANS_SIZE: &str = "ZARYA_SCAN_ORGANS_SIZE";
pub const ENV_SYNC_PERIOD_SECS: &str = "ZARYA_SYNC_PERIOD_SECS";
pub const ENV_CELL_CONCURRENCY: &str = "ZARYA_CELL_CONCURRENCY";
pub const ENV_PROXY_ADDR: &str = "ZARYA_PROXY_ADDR";
pub const ENV_STORE_PATH: &str = "ZARYA_STORE_PATH";
pub const ENV_LOG_JSON: &str = "ZARYA_LOG_JSON";

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub contract: ContractConfig,
    pub decoder: DecoderConfig,
    pub sync: SyncConfig,
    pub proxy: ProxyConfig,
    pub store: StoreConfig,
}

impl RuntimeConfig {
    /// Validate every subsystem section.
    pub fn validate(&self) -> Result<()> {
        self.contract.validate().context("invalid contract configuration")?;
        self.decoder.validate().context("invalid decoder configuration")?;
        self.sync.validate().context("invalid sync configuration")?;
        self.proxy.validate().context("invalid proxy configuration")?;
        Ok(())
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> RuntimeConfig {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration, reading variables through `lookup`.
pub fn load_config_from<F>(lookup: F) -> RuntimeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RuntimeConfig::default();

    if let Some(url) = non_empty(&lookup, ENV_RPC_URL) {
        config.contract.rpc_url = url.clone();
        config.proxy.upstream_url = url;
    }
    if let Some(address) = non_empty(&lookup, ENV_CONTRACT_ADDRESS) {
        config.contract.contract_address = address;
    }
    if let Some(size) = parse_var(&lookup, ENV_SCAN_CELLS_SIZE) {
        config.sync.max_scan_size = size;
    }
    if let Some(size) = parse_var(&lookup, ENV_SCAN_ORGANS_SIZE) {
        config.decoder.scan_organ_size = size;
    }
    if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_SYNC_PERIOD_SECS) {
        config.sync.period = Duration::from_secs(secs);
    }
    if let Some(concurrency) = parse_var(&lookup, ENV_CELL_CONCURRENCY) {
        config.sync.cell_concurrency = concurrency;
    }
    if let Some(addr) = parse_var(&lookup, ENV_PROXY_ADDR) {
        config.proxy.bind_addr = addr;
    }
    if let Some(path) = lookup(ENV_STORE_PATH) {
        let path = path.trim();
        config.store.path = (!path.is_empty()).then(|| PathBuf::from(path));
    }

    info!(
        rpc_url = %config.contract.rpc_url,
        contract = %config.contract.contract_address,
        max_scan_size = config.sync.max_scan_size,
        scan_organ_size = config.decoder.scan_organ_size,
        period_secs = config.sync.period.as_secs(),
        proxy_addr = %config.proxy.bind_addr,
        persistent_store = config.store.is_persistent(),
        "Configuration loaded"
    );
    config
}

/// Whether `ZARYA_LOG_JSON` asks for JSON log lines.
pub fn log_json<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LOG_JSON)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(variable = key, value = %raw, error = %e, "Ignoring malformed environment value");
            None
        }
    }
}
