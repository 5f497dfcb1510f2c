//! Claim lifecycle engine
//!
//! Pure decision logic for every transition. Functions here take the current
//! claim (or the lecturer, for submission) plus the request payload and return
//! the next claim value; they never touch storage, so a refused transition
//! cannot leave anything half-applied.
//!
//! ```text
//!            verify              approve
//! Pending ──────────▶ Verified ──────────▶ Approved
//!    │                   │
//!    │ reject            │ reject
//!    ▼                   ▼
//! Rejected ◀─────────────┘
//! ```
//!
//! Submission enters at `Pending`, or directly at `Rejected` when the
//! submitted rate does not match the lecturer's authorized rate.

use chrono::Utc;
use rust_decimal::Decimal;

use core_kernel::ClaimId;
use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::lecturer::Lecturer;
use crate::rate::{self, RateCheck};
use crate::role::Action;

/// Tag carried by every system-generated rejection note
pub const AUTO_REJECTED_MARKER: &str = "AUTO-REJECTED";

/// Returns true if `note` carries the auto-rejection tag, in any letter case
pub fn carries_auto_reject_marker(note: &str) -> bool {
    note.to_ascii_uppercase().contains(AUTO_REJECTED_MARKER)
}

/// Builds the coordinator note recorded on an auto-rejected claim
pub fn auto_rejection_note(check: &RateCheck) -> String {
    format!(
        "{}: submitted hourly rate {} does not match authorized rate {}; rate corrected to {}",
        AUTO_REJECTED_MARKER, check.submitted_rate, check.corrected_rate, check.corrected_rate
    )
}

/// Payload of a new claim as entered by the lecturer
#[derive(Debug, Clone)]
pub struct ClaimSubmission {
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub notes: Option<String>,
}

impl ClaimSubmission {
    pub fn new(hours_worked: Decimal, hourly_rate: Decimal) -> Self {
        Self {
            hours_worked,
            hourly_rate,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The claim produced by a submission and the rate check behind it
#[derive(Debug, Clone)]
pub struct SubmissionDecision {
    pub claim: Claim,
    pub rate_check: RateCheck,
}

impl SubmissionDecision {
    pub fn is_auto_rejected(&self) -> bool {
        !self.rate_check.matched
    }

    /// Links the stored document to the new claim
    pub fn with_document_ref(mut self, reference: impl Into<String>) -> Self {
        self.claim.document_ref = Some(reference.into());
        self
    }
}

/// Decides the initial state of a claim submitted by `lecturer`
///
/// The stored rate is always the lecturer's authorized rate. A mismatch
/// rejects the claim immediately with an auto-rejection note; this is the
/// only path to `Rejected` without a human decision.
///
/// # Errors
///
/// `ClaimError::InvalidInput` for negative hours or rates.
pub fn submit(lecturer: &Lecturer, submission: ClaimSubmission) -> Result<SubmissionDecision, ClaimError> {
    if submission.hours_worked < Decimal::ZERO {
        return Err(ClaimError::invalid_input(format!(
            "hours worked {} is negative",
            submission.hours_worked
        )));
    }

    let rate_check = rate::validate(submission.hourly_rate, lecturer.hourly_rate)?;

    let (status, coordinator_notes) = if rate_check.matched {
        (ClaimStatus::Pending, None)
    } else {
        (ClaimStatus::Rejected, Some(auto_rejection_note(&rate_check)))
    };

    let now = Utc::now();
    let claim = Claim {
        id: ClaimId::new_v7(),
        lecturer_id: lecturer.email.clone(),
        hours_worked: submission.hours_worked,
        hourly_rate: rate_check.corrected_rate,
        status,
        notes: submission.notes.filter(|n| !n.trim().is_empty()),
        coordinator_notes,
        document_ref: None,
        version: 1,
        submitted_at: now,
        updated_at: now,
    };

    Ok(SubmissionDecision { claim, rate_check })
}

/// A human decision on an existing claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Coordinator verification; the note may be empty
    Verify { note: Option<String> },
    /// Manager approval
    Approve,
    /// Coordinator or manager rejection with a human-authored note
    Reject { note: String },
}

impl Command {
    /// The role-gated action this command performs
    pub fn action(&self) -> Action {
        match self {
            Command::Verify { .. } => Action::Verify,
            Command::Approve => Action::Approve,
            Command::Reject { .. } => Action::Reject,
        }
    }

    /// The status the claim ends up in
    pub fn target(&self) -> ClaimStatus {
        match self {
            Command::Verify { .. } => ClaimStatus::Verified,
            Command::Approve => ClaimStatus::Approved,
            Command::Reject { .. } => ClaimStatus::Rejected,
        }
    }

    /// Checks the payload independently of any claim
    pub fn validate(&self) -> Result<(), ClaimError> {
        match self {
            Command::Reject { note } if carries_auto_reject_marker(note) => Err(
                ClaimError::invalid_input(format!(
                    "rejection notes may not contain the {} marker",
                    AUTO_REJECTED_MARKER
                )),
            ),
            _ => Ok(()),
        }
    }
}

/// Applies `command` to `claim`, returning the next claim value
///
/// `claim` is not modified; on error the caller still holds the unchanged
/// pre-state. The version is left as read; the repository bumps it on write.
///
/// # Errors
///
/// - `ClaimError::InvalidInput` if the payload is invalid
/// - `ClaimError::InvalidTransition` if the claim is not in the required pre-state
pub fn apply(claim: &Claim, command: Command) -> Result<Claim, ClaimError> {
    command.validate()?;

    let mut next = claim.clone();
    next.update_status(command.target())?;

    match command {
        Command::Verify { note } => next.coordinator_notes = Some(note.unwrap_or_default()),
        Command::Approve => {}
        Command::Reject { note } => next.coordinator_notes = Some(note),
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lecturer() -> Lecturer {
        Lecturer::new("a@x.com", "Ada", dec!(500), "0820000000")
    }

    fn pending() -> Claim {
        submit(&lecturer(), ClaimSubmission::new(dec!(10), dec!(500)))
            .unwrap()
            .claim
    }

    fn verified() -> Claim {
        apply(&pending(), Command::Verify { note: None }).unwrap()
    }

    #[test]
    fn test_matching_rate_is_pending() {
        let decision = submit(&lecturer(), ClaimSubmission::new(dec!(10), dec!(500))).unwrap();

        assert!(!decision.is_auto_rejected());
        assert_eq!(decision.claim.status, ClaimStatus::Pending);
        assert_eq!(decision.claim.hourly_rate, dec!(500));
        assert_eq!(decision.claim.coordinator_notes, None);
        assert_eq!(decision.claim.lecturer_id, "a@x.com");
        assert_eq!(decision.claim.version, 1);
    }

    #[test]
    fn test_mismatched_rate_is_auto_rejected() {
        let decision = submit(&lecturer(), ClaimSubmission::new(dec!(10), dec!(999))).unwrap();

        assert!(decision.is_auto_rejected());
        let claim = decision.claim;
        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert_eq!(claim.hourly_rate, dec!(500));
        let notes = claim.coordinator_notes.as_deref().unwrap();
        assert!(notes.contains(AUTO_REJECTED_MARKER));
        assert!(notes.contains("999"));
        assert!(notes.contains("500"));
        assert!(claim.is_auto_rejected());
    }

    #[test]
    fn test_negative_hours_are_invalid() {
        let err = submit(&lecturer(), ClaimSubmission::new(dec!(-1), dec!(500))).unwrap_err();
        assert!(matches!(err, ClaimError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_lecturer_notes_are_dropped() {
        let submission = ClaimSubmission::new(dec!(1), dec!(500)).with_notes("   ");
        let claim = submit(&lecturer(), submission).unwrap().claim;
        assert_eq!(claim.notes, None);
    }

    #[test]
    fn test_verify_overwrites_notes() {
        let claim = apply(&pending(), Command::Verify { note: Some("Good work".into()) }).unwrap();
        assert_eq!(claim.status, ClaimStatus::Verified);
        assert_eq!(claim.coordinator_notes.as_deref(), Some("Good work"));
    }

    #[test]
    fn test_verify_without_note_stores_empty_note() {
        let claim = apply(&pending(), Command::Verify { note: None }).unwrap();
        assert_eq!(claim.coordinator_notes.as_deref(), Some(""));
    }

    #[test]
    fn test_approve_keeps_notes() {
        let verified = apply(&pending(), Command::Verify { note: Some("ok".into()) }).unwrap();
        let approved = apply(&verified, Command::Approve).unwrap();
        assert_eq!(approved.status, ClaimStatus::Approved);
        assert_eq!(approved.coordinator_notes.as_deref(), Some("ok"));
    }

    #[test]
    fn test_approve_requires_verified() {
        let claim = pending();
        let err = apply(&claim, Command::Approve).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::InvalidTransition { from: ClaimStatus::Pending, to: ClaimStatus::Approved }
        ));
    }

    #[test]
    fn test_reject_from_pending_and_verified() {
        for claim in [pending(), verified()] {
            let rejected = apply(&claim, Command::Reject { note: "Missing proof".into() }).unwrap();
            assert_eq!(rejected.status, ClaimStatus::Rejected);
            assert_eq!(rejected.coordinator_notes.as_deref(), Some("Missing proof"));
            assert!(!rejected.is_auto_rejected());
        }
    }

    #[test]
    fn test_reject_from_terminal_states_fails() {
        let approved = apply(&verified(), Command::Approve).unwrap();
        let rejected = apply(&pending(), Command::Reject { note: "no".into() }).unwrap();

        for claim in [approved, rejected] {
            let err = apply(&claim, Command::Reject { note: "again".into() }).unwrap_err();
            assert!(matches!(err, ClaimError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn test_reject_note_may_not_carry_marker() {
        let err = apply(&pending(), Command::Reject { note: "auto-rejected by hand".into() }).unwrap_err();
        assert!(matches!(err, ClaimError::InvalidInput(_)));
    }

    #[test]
    fn test_apply_does_not_touch_input() {
        let claim = pending();
        let before = claim.clone();
        let _ = apply(&claim, Command::Verify { note: Some("x".into()) }).unwrap();
        assert_eq!(claim, before);
    }

    #[test]
    fn test_document_ref_is_linked() {
        let decision = submit(&lecturer(), ClaimSubmission::new(dec!(2), dec!(500)))
            .unwrap()
            .with_document_ref("memory://doc/timesheet.pdf");
        assert_eq!(decision.claim.document_ref.as_deref(), Some("memory://doc/timesheet.pdf"));
    }

    #[test]
    fn test_command_actions() {
        assert_eq!(Command::Verify { note: None }.action(), Action::Verify);
        assert_eq!(Command::Approve.action(), Action::Approve);
        assert_eq!(Command::Reject { note: String::new() }.action(), Action::Reject);
    }
}
