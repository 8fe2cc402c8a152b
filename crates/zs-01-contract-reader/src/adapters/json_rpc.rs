//! JSON-RPC `eth_call` transport over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use primitive_types::H160;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ContractConfig, ContractError};
use crate::ports::RpcTransport;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Transaction object for `eth_call`.
#[derive(Debug, Serialize)]
struct CallObject {
    to: String,
    data: String,
}

/// HTTP transport with a pooled client and bounded timeouts.
pub struct JsonRpcTransport {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl JsonRpcTransport {
    /// Create a transport for the configured node.
    pub fn new(config: &ContractConfig) -> Result<Self, ContractError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl RpcTransport for JsonRpcTransport {
    async fn eth_call(&self, to: H160, data: Vec<u8>) -> Result<Vec<u8>, ContractError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_call",
            params: (
                CallObject {
                    to: format!("0x{}", hex::encode(to.as_bytes())),
                    data: format!("0x{}", hex::encode(&data)),
                },
                "latest",
            ),
            id: self.next_id(),
        };

        let response: JsonRpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ContractError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| ContractError::MalformedResponse("missing result".into()))?;
        debug!(id = request.id, bytes = result.len(), "eth_call returned");

        decode_hex_result(&result)
    }
}

fn decode_hex_result(result: &str) -> Result<Vec<u8>, ContractError> {
    let digits = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(digits).map_err(|e| ContractError::MalformedResponse(format!("result is not hex: {}", e)))
}
