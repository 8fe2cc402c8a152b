//! Upstream node over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{ProxyConfig, ProxyError};
use crate::ports::{Upstream, UpstreamReply};

pub struct HttpUpstream {
    client: Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            url: config.upstream_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn forward(&self, request: &Map<String, Value>) -> Result<UpstreamReply, ProxyError> {
        debug!(method = ?request.get("method"), "Proxying RPC call to node");

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| ProxyError::InvalidUpstreamBody(e.to_string()))?;

        debug!(status, "Received response from node");
        Ok(UpstreamReply { status, body })
    }
}
