//! Supporting documents attached to claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DocumentId};
use crate::error::ClaimError;

/// Maximum accepted file name length
pub const MAX_FILE_NAME_LEN: usize = 255;

/// A stored supporting document, linked to exactly one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub claim_id: ClaimId,
    pub file_name: String,
    pub storage_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Creates the record for a blob already written to the document store
    pub fn new(claim_id: ClaimId, file_name: impl Into<String>, storage_url: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new_v7(),
            claim_id,
            file_name: file_name.into(),
            storage_url: storage_url.into(),
            uploaded_at: Utc::now(),
        }
    }
}

/// A document uploaded alongside a submission, not yet stored
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl DocumentUpload {
    /// Creates an upload after checking the file name
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Result<Self, ClaimError> {
        let file_name = file_name.into();
        let trimmed = file_name.trim();
        if trimmed.is_empty() {
            return Err(ClaimError::invalid_input("document file name is empty"));
        }
        if trimmed.len() > MAX_FILE_NAME_LEN {
            return Err(ClaimError::invalid_input(format!(
                "document file name exceeds {} bytes",
                MAX_FILE_NAME_LEN
            )));
        }
        Ok(Self {
            file_name: trimmed.to_string(),
            content,
        })
    }

    /// Size of the upload in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true if the upload has no content
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
