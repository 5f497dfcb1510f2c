//! Claims domain errors

use core_kernel::PortError;
use thiserror::Error;

use crate::claim::ClaimStatus;
use crate::role::{Action, Role};

/// Errors that can occur in the claims domain
///
/// Every failing operation leaves the stored claim untouched; an
/// auto-rejected submission is a success, not one of these.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Lecturer not found: {0}")]
    LecturerNotFound(String),

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Role {role} is not permitted to {action}")]
    Unauthorized { role: Role, action: Action },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Claim {0} was modified concurrently")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(#[source] PortError),

    #[error("Document storage error: {0}")]
    Storage(#[source] PortError),
}

impl ClaimError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ClaimError::InvalidInput(message.into())
    }

    /// Returns true for errors caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ClaimError::Repository(_) | ClaimError::Storage(_))
    }
}
