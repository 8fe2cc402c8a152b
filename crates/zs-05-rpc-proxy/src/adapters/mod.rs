//! Adapters layer for the RPC Proxy.

pub mod http_upstream;

pub use http_upstream::HttpUpstream;
