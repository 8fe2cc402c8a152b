//! Domain layer for the RPC Proxy.

pub mod config;
pub mod error;

pub use config::{ConfigError, ProxyConfig, RateLimitConfig, DEFAULT_UPSTREAM_URL, MAX_REQUESTS_PER_MINUTE};
pub use error::{codes, ApiError, ProxyError};
