//! Outbound ports for the RPC Proxy.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::ProxyError;

/// Upstream answer: status code and JSON body, relayed unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

/// The node requests are forwarded to.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, request: &Map<String, Value>) -> Result<UpstreamReply, ProxyError>;
}
