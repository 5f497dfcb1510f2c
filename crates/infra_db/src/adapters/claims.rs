//! PostgreSQL Claim Adapter
//!
//! Implements the `ClaimRepository` port on top of [`ClaimsRepository`],
//! translating between domain types and row types and between
//! `DatabaseError` and `PortError`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ClaimId, DocumentId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_claims::{Claim, ClaimQuery, ClaimRepository, ClaimStatus, Document, Lecturer};

use crate::repositories::claims::{
    ClaimRow, ClaimStatus as DbClaimStatus, ClaimsRepository, DocumentRow, LecturerRow,
};

/// PostgreSQL-backed implementation of the `ClaimRepository` port
///
/// # Error Handling
///
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - `DatabaseError::DuplicateEntry` / `StaleVersion` -> `PortError::Conflict`
/// - Other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresClaimAdapter {
    repository: ClaimsRepository,
}

impl PostgresClaimAdapter {
    /// Creates a new PostgreSQL claim adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &ClaimsRepository {
        &self.repository
    }

    /// Inserts or updates a lecturer record
    ///
    /// Lecturers are maintained outside the claim workflow; this is used to
    /// seed data and in tests.
    pub async fn upsert_lecturer(&self, lecturer: &Lecturer) -> Result<(), PortError> {
        let row = LecturerRow {
            email: lecturer.email.clone(),
            name: lecturer.name.clone(),
            hourly_rate: lecturer.hourly_rate,
            phone: lecturer.phone.clone(),
        };
        self.repository.upsert_lecturer(&row).await.map_err(PortError::from)
    }
}

impl DomainPort for PostgresClaimAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClaimAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: "postgres-claim-adapter".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimRepository for PostgresClaimAdapter {
    #[instrument(skip(self, claim, document), fields(claim_id = %claim.id, with_document = document.is_some()))]
    async fn create_claim(
        &self,
        claim: &Claim,
        document: Option<&Document>,
    ) -> Result<ClaimId, PortError> {
        if let Some(document) = document {
            if document.claim_id != claim.id {
                return Err(PortError::validation_field(
                    format!("document belongs to claim {}", document.claim_id),
                    "claim_id",
                ));
            }
        }

        debug!("Inserting claim");
        let row = self
            .repository
            .insert(&claim_to_row(claim), document.map(document_to_row).as_ref())
            .await
            .map_err(PortError::from)?;
        Ok(ClaimId::from(row.claim_id))
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn find_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        debug!("Fetching claim");
        let row = self
            .repository
            .get_by_id(id.into())
            .await
            .map_err(PortError::from)?;
        Ok(row_to_claim(row))
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, version = claim.version))]
    async fn update_claim(&self, claim: &Claim) -> Result<Claim, PortError> {
        debug!("Updating claim");
        let row = self
            .repository
            .update_versioned(&claim_to_row(claim))
            .await
            .map_err(PortError::from)?;
        Ok(row_to_claim(row))
    }

    #[instrument(skip(self))]
    async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError> {
        let rows = self
            .repository
            .list(
                query.lecturer_id.as_deref(),
                query.status.map(domain_to_db_status),
                query.limit.map(i64::from),
            )
            .await
            .map_err(PortError::from)?;

        debug!(count = rows.len(), "Listed claims");
        Ok(rows.into_iter().map(row_to_claim).collect())
    }

    #[instrument(skip(self), fields(claim_id = %claim_id))]
    async fn find_document(&self, claim_id: ClaimId) -> Result<Document, PortError> {
        let row = self
            .repository
            .get_document(claim_id.into())
            .await
            .map_err(PortError::from)?;

        Ok(Document {
            id: DocumentId::from(row.document_id),
            claim_id: ClaimId::from(row.claim_id),
            file_name: row.file_name,
            storage_url: row.storage_url,
            uploaded_at: row.uploaded_at,
        })
    }

    #[instrument(skip(self))]
    async fn find_lecturer(&self, email: &str) -> Result<Lecturer, PortError> {
        let row = self
            .repository
            .get_lecturer(email)
            .await
            .map_err(PortError::from)?;
        Ok(Lecturer::new(row.email, row.name, row.hourly_rate, row.phone))
    }
}

fn claim_to_row(claim: &Claim) -> ClaimRow {
    ClaimRow {
        claim_id: claim.id.into(),
        lecturer_id: claim.lecturer_id.clone(),
        hours_worked: claim.hours_worked,
        hourly_rate: claim.hourly_rate,
        status: domain_to_db_status(claim.status),
        notes: claim.notes.clone(),
        coordinator_notes: claim.coordinator_notes.clone(),
        document_ref: claim.document_ref.clone(),
        version: claim.version,
        submitted_at: claim.submitted_at,
        updated_at: claim.updated_at,
    }
}

fn document_to_row(document: &Document) -> DocumentRow {
    DocumentRow {
        document_id: document.id.into(),
        claim_id: document.claim_id.into(),
        file_name: document.file_name.clone(),
        storage_url: document.storage_url.clone(),
        uploaded_at: document.uploaded_at,
    }
}

fn row_to_claim(row: ClaimRow) -> Claim {
    Claim {
        id: ClaimId::from(row.claim_id),
        lecturer_id: row.lecturer_id,
        hours_worked: row.hours_worked,
        hourly_rate: row.hourly_rate,
        status: db_to_domain_status(row.status),
        notes: row.notes,
        coordinator_notes: row.coordinator_notes,
        document_ref: row.document_ref,
        version: row.version,
        submitted_at: row.submitted_at,
        updated_at: row.updated_at,
    }
}

fn domain_to_db_status(status: ClaimStatus) -> DbClaimStatus {
    match status {
        ClaimStatus::Pending => DbClaimStatus::Pending,
        ClaimStatus::Verified => DbClaimStatus::Verified,
        ClaimStatus::Approved => DbClaimStatus::Approved,
        ClaimStatus::Rejected => DbClaimStatus::Rejected,
    }
}

fn db_to_domain_status(status: DbClaimStatus) -> ClaimStatus {
    match status {
        DbClaimStatus::Pending => ClaimStatus::Pending,
        DbClaimStatus::Verified => ClaimStatus::Verified,
        DbClaimStatus::Approved => ClaimStatus::Approved,
        DbClaimStatus::Rejected => ClaimStatus::Rejected,
    }
}
