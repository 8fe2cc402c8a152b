//! # Contract Reader (zs-01)
//!
//! Read-only access to the Zarya survey contract over JSON-RPC.
//!
//! ## Architecture
//!
//! ```text
//! Synchronizer ──→ ZaryaContract (typed surface)
//!                       │
//!                       ▼
//!               ContractReader (port)
//!                       │
//!          ContractReadService<T: RpcTransport>
//!            encode_call ─→ eth_call(latest) ─→ decode_outputs
//!                       │
//!                       ▼
//!               JsonRpcTransport (reqwest)
//! ```
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - ABI codec, configuration, error types
//! - `ports/` - `ContractReader` (inbound), `RpcTransport` (outbound)
//! - `adapters/` - HTTP JSON-RPC transport
//! - `service.rs` - `ContractReadService`
//! - `surface.rs` - typed wrappers for the contract functions
//!
//! ## Failure Semantics
//!
//! No retry and no caching. RPC or network failures surface as
//! `ContractError::{Rpc, Transport, MalformedResponse}`; unexpected return
//! shapes as `ContractError::Decode`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod surface;

pub use adapters::JsonRpcTransport;
pub use domain::{
    parse_address, AbiError, AbiType, AbiValue, ConfigError, ContractConfig, ContractError,
};
pub use ports::{ContractReader, RpcTransport};
pub use service::ContractReadService;
pub use surface::{functions, CategoricalCellInfo, CellHistory, NumericalCellInfo, ZaryaContract};
