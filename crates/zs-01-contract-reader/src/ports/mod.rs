//! # Ports Layer
//!
//! - `inbound.rs` - Driving port (contract-call capability used by the Synchronizer)
//! - `outbound.rs` - Driven port (raw `eth_call` transport)

pub mod inbound;
pub mod outbound;

pub use inbound::ContractReader;
pub use outbound::RpcTransport;
