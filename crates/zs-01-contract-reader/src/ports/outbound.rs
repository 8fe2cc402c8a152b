//! Outbound Ports (Driven Ports)
//!
//! Raw transport the contract reader needs from the host: one `eth_call`
//! against the latest block.

use async_trait::async_trait;
use primitive_types::H160;

use crate::domain::ContractError;

/// Executes `eth_call` and returns the raw return bytes.
///
/// Production: `JsonRpcTransport` (adapters/json_rpc.rs)
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn eth_call(&self, to: H160, data: Vec<u8>) -> Result<Vec<u8>, ContractError>;
}
