//! Claim aggregate

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;
use crate::error::ClaimError;

/// Claim status
///
/// `Pending` is the initial state; `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Submitted, awaiting coordinator verification
    Pending,
    /// Verified by a coordinator, awaiting manager approval
    Verified,
    /// Approved by a manager
    Approved,
    /// Rejected by a coordinator, a manager, or rate validation
    Rejected,
}

impl ClaimStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [ClaimStatus; 4] = [
        ClaimStatus::Pending,
        ClaimStatus::Verified,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
    ];

    /// Returns true if no further transition is permitted
    pub fn is_terminal(self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected)
    }

    /// Returns the canonical name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Verified => "Verified",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ClaimError::invalid_input(format!("unknown claim status '{}'", s)))
    }
}

/// A lecturer's claim for payment of hours worked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Email of the submitting lecturer
    pub lecturer_id: String,
    /// Hours worked
    pub hours_worked: Decimal,
    /// Hourly rate, always the lecturer's authorized rate once submitted
    pub hourly_rate: Decimal,
    /// Status
    pub status: ClaimStatus,
    /// Notes supplied by the lecturer at submission
    pub notes: Option<String>,
    /// Notes written on verification or rejection
    pub coordinator_notes: Option<String>,
    /// Reference returned by the document store
    pub document_ref: Option<String>,
    /// Optimistic concurrency version
    pub version: i64,
    /// Submitted timestamp
    pub submitted_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Amount payable for the claim
    pub fn total_amount(&self) -> Decimal {
        self.hours_worked * self.hourly_rate
    }

    /// Returns true if this claim was rejected by rate validation
    pub fn is_auto_rejected(&self) -> bool {
        self.status == ClaimStatus::Rejected
            && self
                .coordinator_notes
                .as_deref()
                .is_some_and(crate::lifecycle::carries_auto_reject_marker)
    }

    /// Moves the claim to `target`, rejecting paths outside the lifecycle
    pub(crate) fn update_status(&mut self, target: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Pending, Verified) |
            (Pending, Rejected) |
            (Verified, Approved) |
            (Verified, Rejected)
        )
    }
}
