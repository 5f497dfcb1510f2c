//! Test Data Builders
//!
//! Builders for claims in any lifecycle state. Tests specify only the fields
//! they care about; everything else defaults to the standard fixtures.

use chrono::Utc;
use rust_decimal::Decimal;

use core_kernel::ClaimId;
use domain_claims::lifecycle::AUTO_REJECTED_MARKER;
use domain_claims::{Claim, ClaimStatus, ClaimSubmission};

use crate::fixtures::{DecimalFixtures, StringFixtures};

/// Builder for constructing stored claims directly
///
/// Bypasses the lifecycle engine, so it can produce any status. Use it to
/// seed repositories; use the engine itself when the transition is under test.
#[derive(Debug, Clone)]
pub struct TestClaimBuilder {
    status: ClaimStatus,
    coordinator_notes: Option<String>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a new builder for a pending claim of the standard lecturer
    pub fn new() -> Self {
        Self {
            status: ClaimStatus::Pending,
            coordinator_notes: None,
        }
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_coordinator_notes(mut self, notes: impl Into<String>) -> Self {
        self.coordinator_notes = Some(notes.into());
        self
    }

    /// Shortcut for a claim rejected by rate validation
    pub fn auto_rejected() -> Self {
        Self::new()
            .with_status(ClaimStatus::Rejected)
            .with_coordinator_notes(format!(
                "{}: submitted hourly rate {} does not match authorized rate {}",
                AUTO_REJECTED_MARKER,
                DecimalFixtures::mismatched_rate(),
                DecimalFixtures::authorized_rate()
            ))
    }

    /// Builds a fresh claim at version 1 with a new id
    pub fn build(self) -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId::new_v7(),
            lecturer_id: StringFixtures::lecturer_email().to_string(),
            hours_worked: DecimalFixtures::hours(),
            hourly_rate: DecimalFixtures::authorized_rate(),
            status: self.status,
            notes: None,
            coordinator_notes: self.coordinator_notes,
            document_ref: None,
            version: 1,
            submitted_at: now,
            updated_at: now,
        }
    }
}

/// Builder for submission payloads
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    hours_worked: Decimal,
    hourly_rate: Decimal,
    notes: Option<String>,
}

impl Default for SubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionBuilder {
    /// Creates a submission that matches the standard lecturer's rate
    pub fn new() -> Self {
        Self {
            hours_worked: DecimalFixtures::hours(),
            hourly_rate: DecimalFixtures::authorized_rate(),
            notes: None,
        }
    }

    /// Creates a submission whose rate will be auto-rejected
    pub fn mismatched() -> Self {
        Self::new().with_rate(DecimalFixtures::mismatched_rate())
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = rate;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> ClaimSubmission {
        let submission = ClaimSubmission::new(self.hours_worked, self.hourly_rate);
        match self.notes {
            Some(notes) => submission.with_notes(notes),
            None => submission,
        }
    }
}
