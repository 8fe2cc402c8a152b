//! Error types for the Contract Reader.

use thiserror::Error;

use super::config::ConfigError;

/// Malformed or unexpected ABI data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("data too short: need {needed} bytes at offset {offset}, have {available}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("offset or length does not fit in memory")]
    OffsetOverflow,

    #[error("value does not fit in {bits} bits")]
    UintOverflow { bits: usize },

    #[error("bool word is neither 0 nor 1")]
    InvalidBool,

    #[error("address word has non-zero padding")]
    InvalidAddress,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("empty return data, expected {expected} output(s)")]
    EmptyReturnData { expected: usize },

    #[error("value does not match declared type: {0}")]
    TypeMismatch(String),

    #[error("unexpected output shape: expected {expected}, found {found}")]
    UnexpectedShape { expected: String, found: String },
}

/// Errors surfaced by contract calls.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node could not be reached or the request timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered, but not with a JSON-RPC envelope we understand.
    #[error("malformed RPC response: {0}")]
    MalformedResponse(String),

    #[error("failed to encode arguments for {function}: {source}")]
    Encode {
        function: String,
        #[source]
        source: AbiError,
    },

    #[error("failed to decode return data of {function}: {source}")]
    Decode {
        function: String,
        #[source]
        source: AbiError,
    },

    #[error("invalid contract address: {0}")]
    InvalidAddress(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ContractError {
    /// RPC-level or network failure (the `ContractCallError` class).
    pub fn is_call_error(&self) -> bool {
        matches!(
            self,
            ContractError::Rpc { .. } | ContractError::Transport(_) | ContractError::MalformedResponse(_)
        )
    }

    /// Return-shape failure (the `DecodeError` class).
    pub fn is_decode_error(&self) -> bool {
        matches!(self, ContractError::Decode { .. })
    }

    pub(crate) fn decode(function: &str, source: AbiError) -> Self {
        ContractError::Decode {
            function: function.to_owned(),
            source,
        }
    }
}

impl From<reqwest::Error> for ContractError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ContractError::MalformedResponse(e.to_string())
        } else {
            ContractError::Transport(e.to_string())
        }
    }
}
