//! Repository implementations
//!
//! Repositories encapsulate the SQL and map database rows to row structs.
//! Queries are checked at runtime, so the workspace builds without a live
//! database.

pub mod claims;

pub use claims::ClaimsRepository;
