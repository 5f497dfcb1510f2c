//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! lecturer claims test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data and in-memory service wiring
//! - `builders`: Builder patterns for claims in any lifecycle state
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Custom assertion helpers for claim outcomes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
