//! Ports layer for the Synchronizer.

pub mod outbound;

pub use outbound::OrganNames;
