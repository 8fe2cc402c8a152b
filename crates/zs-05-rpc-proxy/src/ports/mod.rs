//! Ports layer for the RPC Proxy.

pub mod outbound;

pub use outbound::{Upstream, UpstreamReply};
