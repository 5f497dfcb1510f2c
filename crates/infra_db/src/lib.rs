//! Infrastructure Database Layer
//!
//! This crate provides the storage infrastructure for the lecturer claims
//! workflow: a PostgreSQL implementation of the `ClaimRepository` port using
//! SQLx, and a filesystem implementation of the `DocumentStore` port.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. [`repositories`] holds the SQL
//! and the row types; [`adapters`] translates between rows and domain types
//! and implements the domain ports on top of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresClaimAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let repository = PostgresClaimAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;
pub mod storage;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresClaimAdapter;
pub use storage::FileSystemDocumentStore;
