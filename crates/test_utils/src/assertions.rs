//! Custom Test Assertions
//!
//! Assertion helpers for claim outcomes that give more meaningful failure
//! messages than a bare `matches!`.

use domain_claims::lifecycle::AUTO_REJECTED_MARKER;
use domain_claims::{Action, Claim, ClaimError, ClaimStatus, Role};
use rust_decimal::Decimal;

/// Asserts that a claim is in the expected status
pub fn assert_claim_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} is {}, expected {}",
        claim.id, claim.status, expected
    );
}

/// Asserts that a claim was accepted for review at the authorized rate
pub fn assert_pending_at_rate(claim: &Claim, authorized_rate: Decimal) {
    assert_claim_status(claim, ClaimStatus::Pending);
    assert_eq!(
        claim.hourly_rate, authorized_rate,
        "Pending claim stored rate {}, expected authorized rate {}",
        claim.hourly_rate, authorized_rate
    );
    assert!(
        claim.coordinator_notes.is_none(),
        "Pending claim has coordinator notes: {:?}",
        claim.coordinator_notes
    );
}

/// Asserts that a claim was rejected by rate validation and corrected
pub fn assert_auto_rejected(claim: &Claim, authorized_rate: Decimal) {
    assert_claim_status(claim, ClaimStatus::Rejected);
    assert_eq!(
        claim.hourly_rate, authorized_rate,
        "Auto-rejected claim stored rate {}, expected corrected rate {}",
        claim.hourly_rate, authorized_rate
    );
    let notes = claim.coordinator_notes.as_deref().unwrap_or_default();
    assert!(
        notes.contains(AUTO_REJECTED_MARKER),
        "Expected notes to contain {}, got {:?}",
        AUTO_REJECTED_MARKER,
        notes
    );
}

/// Asserts that an operation was refused by the role gate
pub fn assert_unauthorized<T: std::fmt::Debug>(
    result: &Result<T, ClaimError>,
    role: Role,
    action: Action,
) {
    match result {
        Err(ClaimError::Unauthorized { role: r, action: a }) => {
            assert_eq!((*r, *a), (role, action), "Unauthorized for the wrong role/action");
        }
        other => panic!("Expected Unauthorized({}, {}), got {:?}", role, action, other),
    }
}

/// Asserts that an operation was refused as an invalid transition from `from`
pub fn assert_invalid_transition<T: std::fmt::Debug>(result: &Result<T, ClaimError>, from: ClaimStatus) {
    match result {
        Err(ClaimError::InvalidTransition { from: f, .. }) => {
            assert_eq!(*f, from, "InvalidTransition from the wrong status");
        }
        other => panic!("Expected InvalidTransition from {}, got {:?}", from, other),
    }
}

/// Asserts that a refused operation left the stored claim exactly as it was
pub fn assert_claim_unchanged(before: &Claim, after: &Claim) {
    assert_eq!(before.status, after.status, "Status changed");
    assert_eq!(before.coordinator_notes, after.coordinator_notes, "Coordinator notes changed");
    assert_eq!(before.hourly_rate, after.hourly_rate, "Rate changed");
    assert_eq!(before.version, after.version, "Version changed");
}
