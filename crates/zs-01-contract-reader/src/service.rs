//! Contract Read Service
//!
//! Implements the `ContractReader` port on top of any `RpcTransport`:
//! encode → eth_call(latest) → decode.

use async_trait::async_trait;
use primitive_types::H160;
use tracing::trace;

use crate::adapters::JsonRpcTransport;
use crate::domain::abi::{decode_outputs, encode_call};
use crate::domain::{AbiType, AbiValue, ContractConfig, ContractError};
use crate::ports::{ContractReader, RpcTransport};

/// Stateless reader bound to one contract address.
pub struct ContractReadService<T: RpcTransport> {
    transport: T,
    contract: H160,
}

impl<T: RpcTransport> ContractReadService<T> {
    /// Create a reader for `contract` using the given transport.
    pub fn new(transport: T, contract: H160) -> Self {
        Self { transport, contract }
    }

    /// Address every call is sent to.
    pub fn contract_address(&self) -> H160 {
        self.contract
    }
}

impl ContractReadService<JsonRpcTransport> {
    /// Build a reader from configuration using the HTTP JSON-RPC transport.
    pub fn from_config(config: &ContractConfig) -> Result<Self, ContractError> {
        config.validate()?;
        let transport = JsonRpcTransport::new(config)?;
        Ok(Self::new(transport, config.address()?))
    }
}

#[async_trait]
impl<T: RpcTransport> ContractReader for ContractReadService<T> {
    async fn call(
        &self,
        function: &str,
        inputs: &[AbiValue],
        outputs: &[AbiType],
    ) -> Result<Vec<AbiValue>, ContractError> {
        let data = encode_call(function, inputs).map_err(|source| ContractError::Encode {
            function: function.to_owned(),
            source,
        })?;

        let raw = self.transport.eth_call(self.contract, data).await?;
        trace!(function, bytes = raw.len(), "decoding contract return data");

        decode_outputs(&raw, outputs).map_err(|source| ContractError::decode(function, source))
    }
}
