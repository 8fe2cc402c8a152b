//! # RPC Proxy (Subsystem 5)
//!
//! Rate-limited JSON-RPC pass-through to the blockchain node backing the
//! Zarya contract, so browser clients never talk to the node directly.
//!
//! ```text
//! client ──POST /auth/rpc──→ [RateLimit] ──→ proxy_rpc ──→ Upstream (node)
//!                               │ 503                         │ status + body
//!                               ↓                             ↓
//!                        {"error": "..."}              relayed unchanged
//! ```
//!
//! - Each client (first `X-Forwarded-For` entry, else peer IP) gets
//!   100 requests per window; every counter is cleared when the window ends.
//! - Upstream transport failures answer `502` with JSON-RPC code `-32603`.
//! - With a cell store attached (`RpcProxy::with_cells`), `GET /data` lists
//!   every mirrored cell joined with its headers and organ.
//!
//! ## Usage
//!
//! ```ignore
//! let proxy = RpcProxy::from_config(ProxyConfig::default())?;
//! proxy.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;

pub use adapters::HttpUpstream;
pub use domain::{
    codes, ApiError, ConfigError, ProxyConfig, ProxyError, RateLimitConfig, DEFAULT_UPSTREAM_URL,
    MAX_REQUESTS_PER_MINUTE,
};
pub use middleware::{extract_client_id, reset_task, RateLimitLayer, RateLimitState};
pub use ports::{Upstream, UpstreamReply};
pub use service::{router, serve, ProxyState, RpcProxy};
