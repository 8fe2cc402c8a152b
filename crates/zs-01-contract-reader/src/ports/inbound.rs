//! Inbound Ports (Driving Ports)
//!
//! The contract-call capability. Core logic depends on this trait only, so a
//! test double can answer with canned, already-decoded values.

use async_trait::async_trait;

use crate::domain::{AbiError, AbiType, AbiValue, ContractError};

/// Read-only calls against the configured contract.
///
/// Calls are independent: no retry, no caching. Callers own the retry policy.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Call `function` with `inputs` against the latest block and decode the
    /// return data per `outputs`.
    async fn call(
        &self,
        function: &str,
        inputs: &[AbiValue],
        outputs: &[AbiType],
    ) -> Result<Vec<AbiValue>, ContractError>;

    /// Call a function returning a single `string`.
    async fn call_string(&self, function: &str, inputs: &[AbiValue]) -> Result<String, ContractError> {
        let values = self.call(function, inputs, &[AbiType::String]).await?;
        values
            .first()
            .and_then(AbiValue::as_str)
            .map(str::to_owned)
            .ok_or_else(|| shape_error(function, "string", &values))
    }
}

/// Build a decode error describing an unexpected output list.
pub fn shape_error(function: &str, expected: &str, found: &[AbiValue]) -> ContractError {
    let found = found
        .iter()
        .map(AbiValue::kind)
        .collect::<Vec<_>>()
        .join(",");
    ContractError::decode(
        function,
        AbiError::UnexpectedShape {
            expected: expected.to_owned(),
            found: format!("({})", found),
        },
    )
}
