//! Adapters for the Contract Reader.

pub mod json_rpc;

pub use json_rpc::JsonRpcTransport;
