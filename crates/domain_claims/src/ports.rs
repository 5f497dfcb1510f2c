//! Claims Domain Ports
//!
//! Port interfaces the claims workflow needs from the outside world.
//!
//! - [`ClaimRepository`]: claims, their documents, and lecturer lookups
//! - [`DocumentStore`]: blob storage for uploaded supporting documents
//!
//! Adapters:
//!
//! - **PostgreSQL**: `infra_db::adapters::PostgresClaimAdapter`
//! - **Filesystem**: `infra_db::storage::FileSystemDocumentStore`
//! - **In-memory**: [`mock`], behind the `mock` feature
//!
//! # Concurrency
//!
//! `update_claim` is the synchronization point between callers racing on the
//! same claim. Implementations must write only when the stored version equals
//! the version carried by the claim being written, and report
//! `PortError::Conflict` otherwise.

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError};

use crate::claim::{Claim, ClaimStatus};
use crate::document::Document;
use crate::lecturer::Lecturer;

/// Query parameters for listing claims
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimQuery {
    /// Filter by owning lecturer, compared case-insensitively
    pub lecturer_id: Option<String>,
    /// Filter by status
    pub status: Option<ClaimStatus>,
    /// Limit results
    pub limit: Option<u32>,
}

impl ClaimQuery {
    /// Creates a query for one lecturer's claims
    pub fn by_lecturer(lecturer_id: impl Into<String>) -> Self {
        Self {
            lecturer_id: Some(lecturer_id.into()),
            ..Default::default()
        }
    }

    /// Creates a query for claims in one status
    pub fn by_status(status: ClaimStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Narrows the query to one status
    pub fn with_status(mut self, status: Option<ClaimStatus>) -> Self {
        self.status = status;
        self
    }

    /// Returns true if `claim` satisfies the filters
    pub fn matches(&self, claim: &Claim) -> bool {
        self.lecturer_id
            .as_ref()
            .map_or(true, |l| claim.lecturer_id.eq_ignore_ascii_case(l))
            && self.status.map_or(true, |s| claim.status == s)
    }
}

/// Persistence port for claims, documents and lecturers
#[async_trait]
pub trait ClaimRepository: DomainPort + HealthCheckable {
    /// Persists a new claim together with its document record, if any
    ///
    /// The claim and the document are written atomically: when either write
    /// fails, neither is stored. Returns `PortError::Conflict` if the
    /// identifier is already taken and `PortError::Validation` if the
    /// document belongs to another claim.
    async fn create_claim(
        &self,
        claim: &Claim,
        document: Option<&Document>,
    ) -> Result<ClaimId, PortError>;

    /// Retrieves a claim, or `PortError::NotFound`
    async fn find_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Writes `claim` over the stored record
    ///
    /// `claim.version` must be the version that was read. On success the
    /// stored record, with its version incremented, is returned.
    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError>;

    /// Lists claims matching `query`, newest first
    async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError>;

    /// Retrieves the document attached to a claim, or `PortError::NotFound`
    async fn find_document(&self, claim_id: ClaimId) -> Result<Document, PortError>;

    /// Retrieves a lecturer by email, or `PortError::NotFound`
    async fn find_lecturer(&self, email: &str) -> Result<Lecturer, PortError>;
}

/// Blob storage port for supporting documents
#[async_trait]
pub trait DocumentStore: DomainPort + HealthCheckable {
    /// Stores `content` under `file_name`, returning an opaque reference
    async fn store(&self, content: Vec<u8>, file_name: &str) -> Result<String, PortError>;
}

/// In-memory implementations of the claims ports
///
/// Useful for unit tests and for running the API without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{DocumentId, HealthCheckResult};

    /// In-memory claim repository
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryClaimRepository {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
        documents: Arc<RwLock<HashMap<ClaimId, Document>>>,
        lecturers: Arc<RwLock<HashMap<String, Lecturer>>>,
        fail_document_writes: Arc<AtomicBool>,
    }

    impl InMemoryClaimRepository {
        /// Creates an empty repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with lecturers for testing
        pub async fn with_lecturers(lecturers: impl IntoIterator<Item = Lecturer>) -> Self {
            let repository = Self::new();
            for lecturer in lecturers {
                repository.insert_lecturer(lecturer).await;
            }
            repository
        }

        /// Adds or replaces a lecturer
        pub async fn insert_lecturer(&self, lecturer: Lecturer) {
            self.lecturers
                .write()
                .await
                .insert(lecturer.email.to_ascii_lowercase(), lecturer);
        }

        /// Number of stored claims
        pub async fn claim_count(&self) -> usize {
            self.claims.read().await.len()
        }

        /// Makes every later document write fail, as a full disk would
        pub fn fail_document_writes(&self) {
            self.fail_document_writes.store(true, Ordering::SeqCst);
        }
    }

    impl DomainPort for InMemoryClaimRepository {}

    #[async_trait]
    impl HealthCheckable for InMemoryClaimRepository {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-claim-repository")
        }
    }

    #[async_trait]
    impl ClaimRepository for InMemoryClaimRepository {
        async fn create_claim(
            &self,
            claim: &Claim,
            document: Option<&Document>,
        ) -> Result<ClaimId, PortError> {
            // Both maps stay locked until the write is complete
            let mut claims = self.claims.write().await;
            let mut documents = self.documents.write().await;

            if claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!("claim {} already exists", claim.id)));
            }
            if let Some(document) = document {
                if document.claim_id != claim.id {
                    return Err(PortError::validation_field(
                        format!("document belongs to claim {}", document.claim_id),
                        "claim_id",
                    ));
                }
                if self.fail_document_writes.load(Ordering::SeqCst) {
                    return Err(PortError::internal("document write failed"));
                }
                documents.insert(claim.id, document.clone());
            }

            claims.insert(claim.id, claim.clone());
            Ok(claim.id)
        }

        async fn find_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
            let mut claims = self.claims.write().await;
            let stored = claims
                .get_mut(&claim.id)
                .ok_or_else(|| PortError::not_found("Claim", claim.id))?;

            if stored.version != claim.version {
                return Err(PortError::conflict(format!(
                    "claim {} is at version {}, update was based on version {}",
                    claim.id, stored.version, claim.version
                )));
            }

            let mut updated = claim.clone();
            updated.version += 1;
            *stored = updated.clone();
            Ok(updated)
        }

        async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError> {
            let claims = self.claims.read().await;
            let mut results: Vec<_> = claims.values().filter(|c| query.matches(c)).cloned().collect();
            results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.as_uuid().cmp(a.id.as_uuid())));

            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn find_document(&self, claim_id: ClaimId) -> Result<Document, PortError> {
            self.documents
                .read()
                .await
                .get(&claim_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Document", claim_id))
        }

        async fn find_lecturer(&self, email: &str) -> Result<Lecturer, PortError> {
            self.lecturers
                .read()
                .await
                .get(&email.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| PortError::not_found("Lecturer", email))
        }
    }

    /// In-memory document store
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryDocumentStore {
        blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    }

    impl InMemoryDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns the content stored under `reference`
        pub async fn get(&self, reference: &str) -> Option<Vec<u8>> {
            self.blobs.read().await.get(reference).cloned()
        }

        pub async fn len(&self) -> usize {
            self.blobs.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.blobs.read().await.is_empty()
        }
    }

    impl DomainPort for InMemoryDocumentStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryDocumentStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-document-store")
        }
    }

    #[async_trait]
    impl DocumentStore for InMemoryDocumentStore {
        async fn store(&self, content: Vec<u8>, file_name: &str) -> Result<String, PortError> {
            let reference = format!("memory://{}/{}", DocumentId::new_v7(), file_name);
            self.blobs.write().await.insert(reference.clone(), content);
            Ok(reference)
        }
    }
}
