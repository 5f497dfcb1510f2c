//! Domain Adapters
//!
//! Adapter implementations for domain ports, connecting domain interfaces
//! to the PostgreSQL database layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimAdapter;
//! use domain_claims::ClaimRepository;
//!
//! let adapter = PostgresClaimAdapter::new(pool);
//! let claim = adapter.find_claim(claim_id).await?;
//! ```

pub mod claims;

pub use claims::PostgresClaimAdapter;
