//! Core Kernel - Foundational types shared by the claims workflow crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for claims and documents
//! - Port abstractions for the hexagonal (ports and adapters) layout

pub mod identifiers;
pub mod ports;

pub use identifiers::{ClaimId, DocumentId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
