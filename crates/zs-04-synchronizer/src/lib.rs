//! # Synchronizer
//!
//! Mirrors the Zarya contract's survey matrix into a `CellStore`.
//!
//! ```text
//!   spawn_periodic ──tick──→ Synchronizer::run_once
//!                                 │
//!          ZaryaContract ←────────┤  getTheme / getStatement (both flags)
//!                                 │  get*CellInfo / get*History / getCategoryName
//!          OrganResolver ←────────┤  raw hash → OrganId → name (decoded once)
//!                                 ↓
//!                            CellStore (upserts)
//! ```
//!
//! ## Failure Semantics
//!
//! A run either completes or fails as a whole; failures are logged and the
//! next tick rescans from scratch. Individual cell failures follow
//! `CellFailurePolicy`. Overlapping triggers return `AlreadyRunning`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod organs;
pub mod ports;
pub mod scheduler;
pub mod service;

pub use domain::{
    convert_to_decimal, CellFailurePolicy, SyncConfig, SyncConfigError, SyncError, SyncOutcome,
    SyncReport,
};
pub use organs::OrganResolver;
pub use ports::OrganNames;
pub use scheduler::spawn_periodic;
pub use service::Synchronizer;
