//! Claims repository implementation
//!
//! Database access for lecturer claims, their supporting documents, and the
//! lecturer records consulted at submission.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = r#"
    claim_id, lecturer_id, hours_worked, hourly_rate, status,
    notes, coordinator_notes, document_ref, version, submitted_at, updated_at
"#;

/// Repository for managing claims data
///
/// Claim updates are optimistic: a write only lands when the stored version
/// still matches the version the caller read.
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a claim by its identifier
    pub async fn get_by_id(&self, claim_id: Uuid) -> Result<ClaimRow, DatabaseError> {
        let sql = format!("SELECT {} FROM claims WHERE claim_id = $1", CLAIM_COLUMNS);

        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    /// Lists claims, newest first
    ///
    /// # Arguments
    ///
    /// * `lecturer_id` - Restrict to one lecturer, compared case-insensitively
    /// * `status` - Restrict to one status
    /// * `limit` - Maximum number of rows; `None` returns all
    pub async fn list(
        &self,
        lecturer_id: Option<&str>,
        status: Option<ClaimStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<ClaimRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM claims
            WHERE ($1::text IS NULL OR lower(lecturer_id) = lower($1))
              AND ($2::claim_status IS NULL OR status = $2)
            ORDER BY submitted_at DESC, claim_id DESC
            LIMIT $3
            "#,
            CLAIM_COLUMNS
        );

        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(lecturer_id)
            .bind(status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Inserts a new claim and, if given, its document in one transaction
    ///
    /// Nothing is stored unless both inserts succeed.
    pub async fn insert(
        &self,
        claim: &ClaimRow,
        document: Option<&DocumentRow>,
    ) -> Result<ClaimRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO claims (
                claim_id, lecturer_id, hours_worked, hourly_rate, status,
                notes, coordinator_notes, document_ref, version, submitted_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            CLAIM_COLUMNS
        );

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim.claim_id)
            .bind(&claim.lecturer_id)
            .bind(claim.hours_worked)
            .bind(claim.hourly_rate)
            .bind(claim.status)
            .bind(&claim.notes)
            .bind(&claim.coordinator_notes)
            .bind(&claim.document_ref)
            .bind(claim.version)
            .bind(claim.submitted_at)
            .bind(claim.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(document) = document {
            sqlx::query(
                r#"
                INSERT INTO claim_documents (document_id, claim_id, file_name, storage_url, uploaded_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(document.document_id)
            .bind(document.claim_id)
            .bind(&document.file_name)
            .bind(&document.storage_url)
            .bind(document.uploaded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Writes the mutable fields of a claim if its stored version is `claim.version`
    ///
    /// The stored version is incremented on success.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` if the claim does not exist
    /// - `DatabaseError::StaleVersion` if another write got there first
    pub async fn update_versioned(&self, claim: &ClaimRow) -> Result<ClaimRow, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE claims
            SET status = $3, coordinator_notes = $4, updated_at = $5, version = version + 1
            WHERE claim_id = $1 AND version = $2
            RETURNING {}
            "#,
            CLAIM_COLUMNS
        );

        let updated = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim.claim_id)
            .bind(claim.version)
            .bind(claim.status)
            .bind(&claim.coordinator_notes)
            .bind(claim.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => {
                // Distinguish a missing claim from a lost race
                let stored: Option<i64> =
                    sqlx::query_scalar("SELECT version FROM claims WHERE claim_id = $1")
                        .bind(claim.claim_id)
                        .fetch_optional(&self.pool)
                        .await?;

                debug!(claim_id = %claim.claim_id, ?stored, expected = claim.version, "Versioned update missed");
                match stored {
                    Some(_) => Err(DatabaseError::StaleVersion {
                        entity: "Claim",
                        id: claim.claim_id.to_string(),
                        expected: claim.version,
                    }),
                    None => Err(DatabaseError::not_found("Claim", claim.claim_id)),
                }
            }
        }
    }

    /// Retrieves the document attached to a claim
    pub async fn get_document(&self, claim_id: Uuid) -> Result<DocumentRow, DatabaseError> {
        sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT document_id, claim_id, file_name, storage_url, uploaded_at
            FROM claim_documents
            WHERE claim_id = $1
            "#,
        )
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Document", claim_id))
    }

    /// Retrieves a lecturer by email, ignoring letter case
    pub async fn get_lecturer(&self, email: &str) -> Result<LecturerRow, DatabaseError> {
        sqlx::query_as::<_, LecturerRow>(
            r#"
            SELECT email, name, hourly_rate, phone
            FROM lecturers
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Lecturer", email))
    }

    /// Inserts a lecturer or updates the one with the same email
    pub async fn upsert_lecturer(&self, lecturer: &LecturerRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO lecturers (email, name, hourly_rate, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name, hourly_rate = EXCLUDED.hourly_rate, phone = EXCLUDED.phone
            "#,
        )
        .bind(&lecturer.email)
        .bind(&lecturer.name)
        .bind(lecturer.hourly_rate)
        .bind(&lecturer.phone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Checks connectivity with a trivial query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// Claim status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Verified,
    Approved,
    Rejected,
}

/// Database row for claim
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub lecturer_id: String,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub status: ClaimStatus,
    pub notes: Option<String>,
    pub coordinator_notes: Option<String>,
    pub document_ref: Option<String>,
    pub version: i64,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for claim document
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DocumentRow {
    pub document_id: Uuid,
    pub claim_id: Uuid,
    pub file_name: String,
    pub storage_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Database row for lecturer
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LecturerRow {
    pub email: String,
    pub name: String,
    pub hourly_rate: Decimal,
    pub phone: String,
}
