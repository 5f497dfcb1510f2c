//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_claims::{Claim, Document, SubmissionReceipt};

/// Upper bound on coordinator and manager notes
pub const MAX_NOTE_LEN: u64 = 2000;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct VerifyRequest {
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LEN))]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RejectRequest {
    #[serde(default)]
    #[validate(length(max = MAX_NOTE_LEN))]
    pub note: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: String,
    pub lecturer_id: String,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub total_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub coordinator_notes: Option<String>,
    pub document_ref: Option<String>,
    pub auto_rejected: bool,
    pub version: i64,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id.to_string(),
            total_amount: claim.total_amount(),
            auto_rejected: claim.is_auto_rejected(),
            status: claim.status.to_string(),
            lecturer_id: claim.lecturer_id,
            hours_worked: claim.hours_worked,
            hourly_rate: claim.hourly_rate,
            notes: claim.notes,
            coordinator_notes: claim.coordinator_notes,
            document_ref: claim.document_ref,
            version: claim.version,
            submitted_at: claim.submitted_at,
            updated_at: claim.updated_at,
        }
    }
}

/// Body returned by a submission
///
/// `hourly_rate` is the stored rate; `submitted_rate` echoes what the
/// lecturer sent so a corrected rate is visible.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitClaimResponse {
    pub id: String,
    pub status: String,
    pub hourly_rate: Decimal,
    pub submitted_rate: Decimal,
    pub coordinator_notes: Option<String>,
    pub auto_rejected: bool,
    pub document_ref: Option<String>,
}

impl From<SubmissionReceipt> for SubmitClaimResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            id: receipt.claim_id().to_string(),
            status: receipt.status().to_string(),
            auto_rejected: receipt.is_auto_rejected(),
            submitted_rate: receipt.rate_check.submitted_rate,
            hourly_rate: receipt.claim.hourly_rate,
            coordinator_notes: receipt.claim.coordinator_notes,
            document_ref: receipt.claim.document_ref,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub claim_id: String,
    pub file_name: String,
    pub storage_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id.to_string(),
            claim_id: document.claim_id.to_string(),
            file_name: document.file_name,
            storage_url: document.storage_url,
            uploaded_at: document.uploaded_at,
        }
    }
}
