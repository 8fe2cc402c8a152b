//! Proxy configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upstream node.
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8545";

/// Requests allowed per client per window.
pub const MAX_REQUESTS_PER_MINUTE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listen address (default: 0.0.0.0:8080)
    pub bind_addr: SocketAddr,
    /// JSON-RPC endpoint requests are forwarded to
    pub upstream_url: String,
    /// Upper bound for one upstream round trip
    pub request_timeout: Duration,
    pub rate_limit: RateLimitConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ProxyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_url.trim().is_empty() {
            return Err(ConfigError::InvalidUpstream("upstream_url cannot be empty".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("request_timeout cannot be 0".into()));
        }
        self.rate_limit.validate()
    }
}

/// Fixed-window request cap per client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests_per_window: u32,
    /// Counters are cleared once per window.
    pub window: Duration,
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: MAX_REQUESTS_PER_MINUTE,
            window: Duration::from_secs(60),
            enabled: true,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests_per_window == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "max_requests_per_window cannot be 0".into(),
            ));
        }
        if self.window.is_zero() {
            return Err(ConfigError::InvalidRateLimit("window cannot be 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid upstream: {0}")]
    InvalidUpstream(String),
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
